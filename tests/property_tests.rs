//! Algebraic properties of clause orientation and limit estimates.

mod common;

use common::*;
use proptest::prelude::*;
use relplan::{Expr, OperatorId, Plan, PlanNode, RelId, RestrictInfo};
use relplan_planner::builders::make_limit;
use relplan_planner::clauses::{commute_clause, get_switched_clauses};

fn arb_operand() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (1u32..4, 1i32..6).prop_map(|(r, a)| col(r, a)),
        (-1000i64..1000).prop_map(Expr::int4),
    ]
}

fn arb_operator() -> impl Strategy<Value = OperatorId> {
    prop_oneof![Just(INT4_EQ), Just(INT4_LT), Just(INT4_GT)]
}

fn arb_clause() -> impl Strategy<Value = Expr> {
    (arb_operator(), arb_operand(), arb_operand()).prop_map(|(op, l, r)| Expr::op(op, l, r))
}

fn input(rows: f64, total: f64) -> Plan {
    let mut p = Plan::new(
        PlanNode::SeqScan {
            scanrelid: RelId::new(1),
        },
        vec![],
    );
    p.total_cost = total;
    p.plan_rows = rows;
    p
}

proptest! {
    #[test]
    fn commuting_twice_restores_clause(clause in arb_clause()) {
        let cat = catalog();
        let original = clause.as_op().cloned().expect("op clause");
        let mut op = original.clone();
        commute_clause(&mut op, &cat).expect("first commute");
        commute_clause(&mut op, &cat).expect("second commute");
        prop_assert_eq!(op, original);
    }

    #[test]
    fn switched_clauses_put_outer_operand_left(
        clauses in prop::collection::vec(arb_clause(), 1..6),
        outer in 1u32..4,
    ) {
        let cat = catalog();
        let rinfos: Vec<RestrictInfo> = clauses.into_iter().map(RestrictInfo::new).collect();
        let snapshot = rinfos.clone();
        let outer_relids = relids(&[outer]);

        let switched = get_switched_clauses(&rinfos, &outer_relids, &cat).expect("switch");

        prop_assert_eq!(&rinfos, &snapshot);
        prop_assert_eq!(switched.len(), rinfos.len());
        for (ri, out) in rinfos.iter().zip(&switched) {
            let op = out.as_op().expect("op clause");
            if ri.right_relids.is_subset(&outer_relids) {
                prop_assert!(op.args[0].pull_varnos().is_subset(&outer_relids));
                prop_assert_eq!(op.args[1].pull_varnos(), ri.left_relids.clone());
            } else {
                prop_assert_eq!(out, &ri.clause);
            }
        }
    }

    #[test]
    fn limit_never_estimates_below_one_row(
        rows in 0.0f64..10_000.0,
        total in 0.0f64..1_000.0,
        offset in prop::option::of(-5i64..20_000),
        count in prop::option::of(-5i64..20_000),
    ) {
        let plan = make_limit(
            vec![],
            input(rows, total),
            offset.map(Expr::int4),
            count.map(Expr::int4),
        );
        if offset.map_or(false, |o| o > 0) || count.map_or(false, |c| c >= 0) {
            prop_assert!(plan.plan_rows >= 1.0);
        }
        prop_assert!(plan.startup_cost <= plan.total_cost + 1e-9);
    }
}

