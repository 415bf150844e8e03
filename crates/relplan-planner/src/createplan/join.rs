//! Join node construction.

use relplan_core::error::{Error, Result};
use relplan_core::expr::{num_relids, Expr};
use relplan_core::path::{JoinMethod, JoinPath, Path, PathKey, RestrictInfo};
use relplan_core::plan::{JoinInfo, Plan, PlanNode, TargetEntry};

use super::Planner;
use crate::builders::{make_hash, make_sort_from_pathkeys};
use crate::clauses::{
    get_actual_clauses, get_actual_join_clauses, get_switched_clauses, set_difference,
};
use crate::cost::copy_path_costsize;

/// Pieces shared by every join method once both inputs are built.
struct JoinParts {
    tlist: Vec<TargetEntry>,
    joinclauses: Vec<Expr>,
    otherclauses: Vec<Expr>,
    outer: Plan,
    inner: Plan,
}

impl Planner<'_> {
    pub(super) fn create_join_plan(&self, path: &Path, join: &JoinPath) -> Result<Plan> {
        let tlist = path.parent()?.targetlist.clone();
        let outer = self.create_plan(&join.outer)?;
        let inner = self.create_plan(&join.inner)?;

        // Outer joins must keep clauses pushed down from above out of the
        // match decision; inner joins can treat every clause alike.
        let (joinclauses, otherclauses) = if join.jointype.is_outer() {
            get_actual_join_clauses(&join.join_restrict_info)
        } else {
            (get_actual_clauses(&join.join_restrict_info), Vec::new())
        };

        let parts = JoinParts {
            tlist,
            joinclauses,
            otherclauses,
            outer,
            inner,
        };

        let mut plan = match &join.method {
            JoinMethod::NestLoop => self.create_nestloop_plan(join, parts),
            JoinMethod::MergeJoin {
                mergeclauses,
                outer_sort_keys,
                inner_sort_keys,
            } => self.create_mergejoin_plan(
                join,
                parts,
                mergeclauses,
                outer_sort_keys,
                inner_sort_keys,
            )?,
            JoinMethod::HashJoin { hashclauses } => {
                self.create_hashjoin_plan(join, parts, hashclauses)?
            }
        };
        copy_path_costsize(&mut plan, path)?;
        Ok(plan)
    }

    /// An inner index scan driven by values from the outer side already
    /// enforces the clauses it was built from, so the join need not repeat
    /// them. Only done for a single index: with several ORed indexes no one
    /// group is known to hold for a returned row.
    fn create_nestloop_plan(&self, join: &JoinPath, parts: JoinParts) -> Plan {
        let JoinParts {
            tlist,
            mut joinclauses,
            otherclauses,
            outer,
            inner,
        } = parts;

        if let PlanNode::IndexScan { indxqualorig, .. } = &inner.node {
            if let [group] = indxqualorig.as_slice() {
                if num_relids(group) > 1 {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        clauses = group.len(),
                        "join clauses enforced by inner index scan"
                    );
                    joinclauses = set_difference(joinclauses, group);
                }
            }
        }

        let mut plan = Plan::new(
            PlanNode::NestLoop {
                join: JoinInfo {
                    jointype: join.jointype,
                    joinqual: joinclauses,
                },
            },
            tlist,
        );
        plan.qual = otherclauses;
        plan.with_children(Some(outer), Some(inner))
    }

    /// Merge clauses leave the join qual and filter, and come back oriented
    /// outer-first.
    /// Inputs not already in merge order get a Sort; its cost is already part
    /// of the path's estimate.
    fn create_mergejoin_plan(
        &self,
        join: &JoinPath,
        parts: JoinParts,
        mergeclauses: &[RestrictInfo],
        outer_sort_keys: &[PathKey],
        inner_sort_keys: &[PathKey],
    ) -> Result<Plan> {
        let JoinParts {
            tlist,
            joinclauses,
            otherclauses,
            mut outer,
            mut inner,
        } = parts;

        let keys = get_actual_clauses(mergeclauses);
        let joinclauses = set_difference(joinclauses, &keys);
        let otherclauses = set_difference(otherclauses, &keys);
        let outer_relids = &join.outer.parent()?.relids;
        let mergeclauses = get_switched_clauses(mergeclauses, outer_relids, self.catalog)?;

        if !outer_sort_keys.is_empty() {
            outer = make_sort_from_pathkeys(&self.cost, outer, outer_relids, outer_sort_keys)?;
        }
        if !inner_sort_keys.is_empty() {
            let inner_relids = &join.inner.parent()?.relids;
            inner = make_sort_from_pathkeys(&self.cost, inner, inner_relids, inner_sort_keys)?;
        }

        let mut plan = Plan::new(
            PlanNode::MergeJoin {
                join: JoinInfo {
                    jointype: join.jointype,
                    joinqual: joinclauses,
                },
                mergeclauses,
            },
            tlist,
        );
        plan.qual = otherclauses;
        Ok(plan.with_children(Some(outer), Some(inner)))
    }

    /// The inner input is wrapped in a Hash node keyed on the inner operand
    /// of each oriented hash clause.
    fn create_hashjoin_plan(
        &self,
        join: &JoinPath,
        parts: JoinParts,
        hashclauses: &[RestrictInfo],
    ) -> Result<Plan> {
        let JoinParts {
            tlist,
            joinclauses,
            otherclauses,
            outer,
            inner,
        } = parts;

        // A key never stays behind as a residual filter, pushed down or not.
        let keys = get_actual_clauses(hashclauses);
        let joinclauses = set_difference(joinclauses, &keys);
        let otherclauses = set_difference(otherclauses, &keys);
        let outer_relids = &join.outer.parent()?.relids;
        let hashclauses = get_switched_clauses(hashclauses, outer_relids, self.catalog)?;

        let innerhashkeys = hashclauses
            .iter()
            .map(|c| {
                c.as_op()
                    .and_then(|op| op.right())
                    .cloned()
                    .ok_or(Error::NotBinaryOpClause)
            })
            .collect::<Result<Vec<_>>>()?;

        let hash_tlist = inner.targetlist.clone();
        let hash = make_hash(hash_tlist, innerhashkeys, inner);

        let mut plan = Plan::new(
            PlanNode::HashJoin {
                join: JoinInfo {
                    jointype: join.jointype,
                    joinqual: joinclauses,
                },
                hashclauses,
            },
            tlist,
        );
        plan.qual = otherclauses;
        Ok(plan.with_children(Some(outer), Some(hash)))
    }
}
