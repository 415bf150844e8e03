//! Join translation: clause partitioning, orientation, inserted nodes.

mod common;

use common::*;
use relplan::{
    CostModel, Error, Expr, JoinMethod, JoinType, PathKeyItem, PlanNode, Planner, RestrictInfo,
};

fn translate(path: &relplan::Path) -> relplan::Result<relplan::Plan> {
    let cat = catalog();
    Planner::new(&cat, CostModel::default()).create_plan(path)
}

#[test]
fn test_inner_join_clause_sets_are_preserved() {
    let key = RestrictInfo::new(eq(col(2, 1), col(1, 1)));
    let extra = RestrictInfo::new(lt(col(1, 2), col(2, 2)));
    let path = join(
        JoinType::Inner,
        seqscan(1, 100.0, vec![]),
        seqscan(2, 200.0, vec![]),
        vec![key.clone(), extra.clone()],
        JoinMethod::HashJoin {
            hashclauses: vec![key.clone()],
        },
    );

    let plan = translate(&path).expect("translate");
    match &plan.node {
        PlanNode::HashJoin { join, hashclauses } => {
            // Remaining join qual plus keys covers the original set, and the
            // key appears only in its oriented form.
            assert_eq!(join.joinqual, vec![extra.clause.clone()]);
            assert!(!join.joinqual.contains(&key.clause));
            assert_eq!(hashclauses, &vec![eq(col(1, 1), col(2, 1))]);
        }
        other => panic!("expected hash join, got {other:?}"),
    }
    assert!(plan.qual.is_empty());
    // Join estimates come from the path, not the inputs.
    assert_eq!(plan.plan_rows, 500.0);
    assert_eq!(plan.plan_width, 16);
}

#[test]
fn test_full_join_keeps_pushed_down_clause_as_filter() {
    let key = RestrictInfo::new(eq(col(1, 1), col(2, 1)));
    let pushed = RestrictInfo::new(lt(col(1, 2), col(2, 2))).pushed_down();
    let path = join(
        JoinType::Full,
        seqscan(1, 100.0, vec![]),
        seqscan(2, 200.0, vec![]),
        vec![key.clone(), pushed.clone()],
        JoinMethod::MergeJoin {
            mergeclauses: vec![key.clone()],
            outer_sort_keys: vec![],
            inner_sort_keys: vec![],
        },
    );

    let plan = translate(&path).expect("translate");
    let info = plan.join_info().expect("join node");
    assert_eq!(info.jointype, JoinType::Full);
    assert!(info.joinqual.is_empty());
    assert_eq!(plan.qual, vec![pushed.clause]);
}

#[test]
fn test_mergejoin_sorts_inner_on_expression() {
    let key = RestrictInfo::new(eq(col(1, 1), Expr::op(INT4_PLUS, col(2, 1), col(2, 2))));
    let inner_key = Expr::op(INT4_PLUS, col(2, 1), col(2, 2));
    let path = join(
        JoinType::Inner,
        seqscan(1, 100.0, vec![]),
        seqscan(2, 200.0, vec![]),
        vec![key.clone()],
        JoinMethod::MergeJoin {
            mergeclauses: vec![key],
            outer_sort_keys: vec![vec![PathKeyItem {
                key: col(1, 1),
                sortop: INT4_LT,
            }]],
            inner_sort_keys: vec![vec![PathKeyItem {
                key: inner_key.clone(),
                sortop: INT4_LT,
            }]],
        },
    );

    let plan = translate(&path).expect("translate");
    let inner = plan.righttree.as_ref().expect("inner");
    match &inner.node {
        PlanNode::Sort { keycount } => assert_eq!(*keycount, 1),
        other => panic!("expected sort, got {other:?}"),
    }
    let sort_key = inner.targetlist.last().expect("junk column");
    assert!(sort_key.resjunk);
    assert_eq!(sort_key.expr, inner_key);
    assert_eq!(sort_key.reskey, 1);
    let scan = inner.lefttree.as_ref().expect("scan");
    assert_eq!(scan.targetlist.len(), 3);
}

#[test]
fn test_nestloop_over_parameterized_index_drops_join_clause() {
    let jc = eq(col(2, 1), col(1, 1));
    let inner = indexscan(2, vec![], vec![btree(30, &[1])], vec![vec![jc.clone()]], 1.0);
    let residual = RestrictInfo::new(lt(col(1, 2), col(2, 2)));
    let path = join(
        JoinType::Inner,
        seqscan(1, 100.0, vec![]),
        inner,
        vec![RestrictInfo::new(jc), residual.clone()],
        JoinMethod::NestLoop,
    );

    let plan = translate(&path).expect("translate");
    assert_eq!(plan.join_info().expect("join").joinqual, vec![residual.clause]);
}

#[test]
fn test_nested_join_tree() {
    let j12 = join(
        JoinType::Inner,
        seqscan(1, 100.0, vec![]),
        seqscan(2, 100.0, vec![]),
        vec![RestrictInfo::new(eq(col(1, 1), col(2, 1)))],
        JoinMethod::NestLoop,
    );
    let key = RestrictInfo::new(eq(col(3, 1), col(2, 2)));
    let path = join(
        JoinType::Left,
        j12,
        seqscan(3, 100.0, vec![]),
        vec![key.clone()],
        JoinMethod::HashJoin {
            hashclauses: vec![key],
        },
    );

    let plan = translate(&path).expect("translate");
    match &plan.node {
        PlanNode::HashJoin { hashclauses, .. } => {
            assert_eq!(hashclauses, &vec![eq(col(2, 2), col(3, 1))]);
        }
        other => panic!("expected hash join, got {other:?}"),
    }
    let outer = plan.lefttree.as_ref().expect("outer");
    assert!(matches!(outer.node, PlanNode::NestLoop { .. }));
}

#[test]
fn test_missing_sort_key_aborts_translation() {
    let key = RestrictInfo::new(eq(col(1, 1), col(2, 1)));
    let path = join(
        JoinType::Inner,
        seqscan(1, 100.0, vec![]),
        seqscan(2, 200.0, vec![]),
        vec![key.clone()],
        JoinMethod::MergeJoin {
            mergeclauses: vec![key],
            outer_sort_keys: vec![vec![PathKeyItem {
                key: col(9, 1),
                sortop: INT4_LT,
            }]],
            inner_sort_keys: vec![],
        },
    );
    assert!(matches!(translate(&path), Err(Error::PathKeyNotFound)));
}
