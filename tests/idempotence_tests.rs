//! Translating the same path twice gives equal, independent plans.

mod common;

use common::*;
use relplan::{
    BoolOp, CostModel, Expr, JoinMethod, JoinType, Plan, PlanId, PlanNode, Planner,
    RestrictInfo, SubPlanExpr,
};
use relplan_core::expr::{make_orclause, BOOL_TYPE};

fn correlated_subplan() -> Expr {
    let mut inner = Plan::new(
        PlanNode::SeqScan {
            scanrelid: relplan::RelId::new(9),
        },
        vec![],
    );
    inner.total_cost = 3.0;
    Expr::SubPlan(SubPlanExpr {
        plan_id: PlanId::new(1),
        args: vec![col(1, 1)],
        result_type: BOOL_TYPE,
        plan: Box::new(inner),
    })
}

fn sample_path() -> relplan::Path {
    let a = eq(col(1, 1), Expr::int4(1));
    let b = eq(col(1, 2), correlated_subplan());
    let or = make_orclause(vec![a.clone(), b.clone()]);
    let outer = indexscan(
        1,
        vec![or, lt(col(1, 2), Expr::int4(9))],
        vec![btree(20, &[1]), btree(21, &[2])],
        vec![vec![a], vec![b]],
        5.0,
    );
    let key = RestrictInfo::new(eq(col(2, 1), col(1, 1)));
    join(
        JoinType::Inner,
        outer,
        seqscan(2, 100.0, vec![]),
        vec![key.clone()],
        JoinMethod::HashJoin {
            hashclauses: vec![key],
        },
    )
}

#[test]
fn test_repeat_translation_is_structurally_equal() {
    let cat = catalog().with_lossy(INT4_EQ, BTREE_INT4_OPS);
    let planner = Planner::new(&cat, CostModel::default()).with_sublinks(true);
    let path = sample_path();

    let first = planner.create_plan(&path).expect("first");
    let second = planner.create_plan(&path).expect("second");

    assert_eq!(first, second);
    assert_eq!(
        first.fingerprint().expect("hash"),
        second.fingerprint().expect("hash")
    );
}

#[test]
fn test_translation_leaves_path_untouched() {
    let cat = catalog().with_lossy(INT4_EQ, BTREE_INT4_OPS);
    let planner = Planner::new(&cat, CostModel::default());
    let path = sample_path();
    let before = path.clone();
    let _ = planner.create_plan(&path).expect("translate");
    assert_eq!(path, before);
}

#[test]
fn test_plans_do_not_share_subplans() {
    let cat = catalog().with_lossy(INT4_EQ, BTREE_INT4_OPS);
    let planner = Planner::new(&cat, CostModel::default()).with_sublinks(true);
    let path = sample_path();
    let mut first = planner.create_plan(&path).expect("first");
    let second = planner.create_plan(&path).expect("second");

    // Rewriting one plan's rechecked OR clause must not show through in the
    // other plan.
    let scan = first.lefttree.as_mut().expect("outer scan");
    let rechecked = scan
        .qual
        .iter_mut()
        .find(|q| matches!(q, Expr::Bool { op: BoolOp::Or, .. }))
        .expect("rechecked OR clause");
    *rechecked = Expr::bool_const(false);

    assert_ne!(first, second);
    let untouched = second.lefttree.as_ref().expect("outer scan");
    assert!(untouched
        .qual
        .iter()
        .any(|q| matches!(q, Expr::Bool { op: BoolOp::Or, .. })));
}
