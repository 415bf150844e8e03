//! Constructors for plan nodes that have no strategy of their own.
//!
//! The translator uses a few of these (sort, hash, result, append); the rest
//! are for callers building the upper part of a plan (grouping, distinct,
//! set operations, limit) on top of a translated tree. Each builder takes
//! ownership of its input and computes its own estimates.

use relplan_core::error::{Error, Result};
use relplan_core::expr::{Expr, Relids};
use relplan_core::id::AttrNumber;
use relplan_core::path::PathKey;
use relplan_core::plan::{
    get_sortgroupclause_tle, new_unsorted_tlist, tlist_member, AggStrategy, Plan, PlanNode,
    SetOpCmd, SortClause, TargetEntry,
};

use crate::cost::CostModel;

/// Concatenate the outputs of several plans.
///
/// Starts when the first member starts; everything else adds up, and the
/// widest member sets the width.
pub fn make_append(appendplans: Vec<Plan>, is_target: bool, tlist: Vec<TargetEntry>) -> Plan {
    let mut plan = Plan::new(PlanNode::default(), tlist);
    if let Some(first) = appendplans.first() {
        plan.startup_cost = first.startup_cost;
    }
    for sub in &appendplans {
        plan.total_cost += sub.total_cost;
        plan.plan_rows += sub.plan_rows;
        plan.plan_width = plan.plan_width.max(sub.plan_width);
    }
    plan.node = PlanNode::Append {
        appendplans,
        is_target,
    };
    plan
}

/// Projection and/or one-time filter, optionally over a child.
///
/// The constant qual is evaluated once, so its full cost lands on startup.
pub fn make_result(
    cost: &CostModel,
    tlist: Vec<TargetEntry>,
    resconstantqual: Vec<Expr>,
    subplan: Option<Plan>,
) -> Plan {
    let mut plan = Plan::new(PlanNode::default(), tlist);
    match &subplan {
        Some(child) => plan.copy_costsize_from(child),
        None => {
            plan.startup_cost = 0.0;
            plan.total_cost = cost.config().cpu_tuple_cost;
            plan.plan_rows = 1.0;
            plan.plan_width = 0;
        }
    }
    if !resconstantqual.is_empty() {
        let qc = cost.cost_qual_eval(&resconstantqual);
        plan.startup_cost += qc.startup + qc.per_tuple;
        plan.total_cost += qc.startup + qc.per_tuple;
    }
    plan.node = PlanNode::Result { resconstantqual };
    plan.with_children(subplan, None)
}

/// Buffer the child's output. Estimates are left to the caller.
pub fn make_material(tlist: Vec<TargetEntry>, child: Plan) -> Plan {
    Plan::new(PlanNode::Material, tlist).with_children(Some(child), None)
}

/// Sort over a target list whose entries already carry `reskey` ranks
/// `1..=keycount`.
pub fn make_sort(cost: &CostModel, tlist: Vec<TargetEntry>, child: Plan, keycount: u32) -> Plan {
    let mut plan = Plan::new(PlanNode::Sort { keycount }, tlist);
    plan.copy_costsize_from(&child);
    let (startup, total) = cost.cost_sort(child.total_cost, child.plan_rows, child.plan_width);
    plan.startup_cost = startup;
    plan.total_cost = total;
    plan.with_children(Some(child), None)
}

/// Sort `child` into the order described by `pathkeys`.
///
/// Each pathkey lists interchangeable sort expressions. The first one
/// already produced by the child is used; failing that, the first one
/// computable from `relids` is added to the child's output as a junk
/// column. A child that cannot project gets a Result node to compute it.
pub fn make_sort_from_pathkeys(
    cost: &CostModel,
    mut child: Plan,
    relids: &Relids,
    pathkeys: &[PathKey],
) -> Result<Plan> {
    let mut sort_tlist = new_unsorted_tlist(&child.targetlist);
    let mut numsortkeys = 0u32;

    for keysublist in pathkeys {
        let found = keysublist
            .iter()
            .find_map(|item| tlist_member(&item.key, &sort_tlist).map(|pos| (pos, item)));

        let (pos, item) = match found {
            Some(hit) => hit,
            None => {
                let item = keysublist
                    .iter()
                    .find(|item| item.key.pull_varnos().is_subset(relids))
                    .ok_or(Error::PathKeyNotFound)?;

                if !child.can_project() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        node = child.node_name(),
                        "inserting Result to compute sort expression"
                    );
                    let tlist = new_unsorted_tlist(&child.targetlist);
                    child = make_result(cost, tlist, Vec::new(), Some(child));
                }

                let resno = child.targetlist.len() as AttrNumber + 1;
                child
                    .targetlist
                    .push(TargetEntry::junk(resno, item.key.clone()));

                let resno = sort_tlist.len() as AttrNumber + 1;
                sort_tlist.push(TargetEntry::junk(resno, item.key.clone()));
                (sort_tlist.len() - 1, item)
            }
        };

        // A repeated key adds nothing: rows equal on it are already grouped.
        let tle = &mut sort_tlist[pos];
        if tle.reskey == 0 {
            numsortkeys += 1;
            tle.reskey = numsortkeys;
            tle.reskeyop = Some(item.sortop);
        }
    }

    if numsortkeys == 0 {
        return Err(Error::EmptySortKeys);
    }
    Ok(make_sort(cost, sort_tlist, child, numsortkeys))
}

/// Hash table build over the inner input of a hash join.
pub fn make_hash(tlist: Vec<TargetEntry>, hashkeys: Vec<Expr>, child: Plan) -> Plan {
    let mut plan = Plan::new(PlanNode::Hash { hashkeys }, tlist);
    plan.copy_costsize_from(&child);
    // Nothing comes out until the whole input is consumed.
    plan.startup_cost = plan.total_cost;
    plan.with_children(Some(child), None)
}

/// Aggregation, optionally grouped, with an optional HAVING qual.
#[allow(clippy::too_many_arguments)]
pub fn make_agg(
    cost: &CostModel,
    tlist: Vec<TargetEntry>,
    qual: Vec<Expr>,
    strategy: AggStrategy,
    grp_col_idx: Vec<AttrNumber>,
    num_groups: u64,
    num_aggs: usize,
    child: Plan,
) -> Plan {
    let (startup, total) = cost.cost_agg(
        strategy,
        num_aggs,
        grp_col_idx.len(),
        num_groups as f64,
        child.startup_cost,
        child.total_cost,
        child.plan_rows,
    );

    let mut plan = Plan::new(
        PlanNode::Agg {
            strategy,
            grp_col_idx,
            num_groups,
        },
        tlist,
    );
    plan.copy_costsize_from(&child);
    plan.startup_cost = startup;
    plan.total_cost = total;
    plan.plan_rows = match strategy {
        AggStrategy::Plain => 1.0,
        AggStrategy::Sorted | AggStrategy::Hashed => num_groups as f64,
    };

    if !qual.is_empty() {
        let qc = cost.cost_qual_eval(&qual);
        plan.startup_cost += qc.startup;
        plan.total_cost += qc.startup + qc.per_tuple * plan.plan_rows;
    }
    let tc = cost.cost_tlist_eval(&plan.targetlist);
    plan.startup_cost += tc.startup;
    plan.total_cost += tc.startup + tc.per_tuple * plan.plan_rows;

    plan.qual = qual;
    plan.with_children(Some(child), None)
}

/// Grouping of sorted input without aggregation.
pub fn make_group(
    cost: &CostModel,
    tlist: Vec<TargetEntry>,
    grp_col_idx: Vec<AttrNumber>,
    num_groups: f64,
    child: Plan,
) -> Plan {
    let (startup, total) = cost.cost_group(
        grp_col_idx.len(),
        num_groups,
        child.startup_cost,
        child.total_cost,
        child.plan_rows,
    );

    let mut plan = Plan::new(PlanNode::Group { grp_col_idx }, tlist);
    plan.copy_costsize_from(&child);
    plan.startup_cost = startup;
    plan.total_cost = total;
    plan.plan_rows = num_groups;

    let tc = cost.cost_tlist_eval(&plan.targetlist);
    plan.startup_cost += tc.startup;
    plan.total_cost += tc.startup + tc.per_tuple * plan.plan_rows;

    plan.with_children(Some(child), None)
}

/// Output column numbers of the entries named by `clauses`.
fn sortgroup_columns(clauses: &[SortClause], tlist: &[TargetEntry]) -> Result<Vec<AttrNumber>> {
    if clauses.is_empty() {
        return Err(Error::Invariant(
            "duplicate elimination needs at least one column".into(),
        ));
    }
    clauses
        .iter()
        .map(|cl| get_sortgroupclause_tle(cl, tlist).map(|tle| tle.resno))
        .collect()
}

/// Drop adjacent duplicates of sorted input.
///
/// Row estimate is left as the input's; callers that know better adjust it.
pub fn make_unique(
    cost: &CostModel,
    tlist: Vec<TargetEntry>,
    child: Plan,
    distinct: &[SortClause],
) -> Result<Plan> {
    let uniq_col_idx = sortgroup_columns(distinct, &tlist)?;

    let mut plan = Plan::new(PlanNode::default(), tlist);
    plan.copy_costsize_from(&child);
    plan.total_cost +=
        cost.config().cpu_operator_cost * plan.plan_rows * uniq_col_idx.len() as f64;
    plan.node = PlanNode::Unique { uniq_col_idx };
    Ok(plan.with_children(Some(child), None))
}

/// INTERSECT / EXCEPT over sorted, flagged input.
pub fn make_setop(
    cost: &CostModel,
    cmd: SetOpCmd,
    tlist: Vec<TargetEntry>,
    child: Plan,
    distinct: &[SortClause],
    flag_col_idx: AttrNumber,
) -> Result<Plan> {
    let dup_col_idx = sortgroup_columns(distinct, &tlist)?;

    let mut plan = Plan::new(PlanNode::default(), tlist);
    plan.copy_costsize_from(&child);
    plan.total_cost +=
        cost.config().cpu_operator_cost * plan.plan_rows * dup_col_idx.len() as f64;
    plan.plan_rows = (plan.plan_rows * cost.config().setop_output_fraction).max(1.0);
    plan.node = PlanNode::SetOp {
        cmd,
        dup_col_idx,
        flag_col_idx,
    };
    Ok(plan.with_children(Some(child), None))
}

/// OFFSET / LIMIT over a child.
///
/// Only literal integer bounds refine the estimates; anything else (params,
/// expressions, NULL) leaves the child's numbers in place.
pub fn make_limit(
    tlist: Vec<TargetEntry>,
    child: Plan,
    limit_offset: Option<Expr>,
    limit_count: Option<Expr>,
) -> Plan {
    let mut plan = Plan::new(PlanNode::default(), tlist);
    plan.copy_costsize_from(&child);

    if let Some(offset) = limit_offset.as_ref().and_then(Expr::as_int_const) {
        if offset > 0 {
            let offset = (offset as f64).min(plan.plan_rows.trunc());
            if plan.plan_rows > 0.0 {
                plan.startup_cost +=
                    (plan.total_cost - plan.startup_cost) * offset / plan.plan_rows;
            }
            plan.plan_rows = (plan.plan_rows - offset).max(1.0);
        }
    }
    if let Some(count) = limit_count.as_ref().and_then(Expr::as_int_const) {
        if count >= 0 {
            let count = (count as f64).min(plan.plan_rows.trunc());
            if plan.plan_rows > 0.0 {
                plan.total_cost = plan.startup_cost
                    + (plan.total_cost - plan.startup_cost) * count / plan.plan_rows;
            }
            plan.plan_rows = count.max(1.0);
        }
    }

    plan.node = PlanNode::Limit {
        limit_offset,
        limit_count,
    };
    plan.with_children(Some(child), None)
}
