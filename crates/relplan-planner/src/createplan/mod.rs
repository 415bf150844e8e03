//! Translation of a chosen strategy tree into an executable plan tree.
//!
//! `Planner::create_plan` walks the `Path` top-down and builds the matching
//! `Plan` bottom-up. The input is never modified; every clause that ends up
//! in the output is an owned copy, so two translations of the same path share
//! nothing.

mod join;
mod scan;

use relplan_core::catalog::Catalog;
use relplan_core::error::Result;
use relplan_core::expr::Expr;
use relplan_core::path::{Path, PathKind};
use relplan_core::plan::Plan;

use crate::builders::{make_append, make_material, make_result};
use crate::clauses::order_qual_clauses;
use crate::cost::{copy_path_costsize, CostModel};

/// Translation context for one query level.
pub struct Planner<'a> {
    catalog: &'a dyn Catalog,
    cost: CostModel,
    /// The query has sub-selects, so clause lists may carry per-row
    /// sub-plans that should run last.
    has_sublinks: bool,
}

impl<'a> Planner<'a> {
    pub fn new(catalog: &'a dyn Catalog, cost: CostModel) -> Self {
        Self {
            catalog,
            cost,
            has_sublinks: false,
        }
    }

    pub fn with_sublinks(mut self, has_sublinks: bool) -> Self {
        self.has_sublinks = has_sublinks;
        self
    }

    /// Build the plan tree for `path`.
    ///
    /// Any error means the path broke a structural contract; nothing partial
    /// is returned.
    pub fn create_plan(&self, path: &Path) -> Result<Plan> {
        let plan = match &path.kind {
            PathKind::Scan(scan) => self.create_scan_plan(path, scan)?,
            PathKind::Join(join) => self.create_join_plan(path, join)?,
            PathKind::Append { subpaths } => self.create_append_plan(path, subpaths)?,
            PathKind::Result {
                subpath,
                constant_qual,
            } => self.create_result_plan(path, subpath.as_deref(), constant_qual)?,
            PathKind::Material { subpath } => self.create_material_plan(path, subpath)?,
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            path = path.kind_name(),
            node = plan.node_name(),
            rows = plan.plan_rows,
            total_cost = plan.total_cost,
            "plan node built"
        );

        Ok(plan)
    }

    fn order_quals(&self, clauses: Vec<Expr>) -> Vec<Expr> {
        order_qual_clauses(self.has_sublinks, clauses)
    }

    /// Each member is translated on its own; the estimates are recomputed
    /// from the members rather than taken from the path.
    fn create_append_plan(&self, path: &Path, subpaths: &[Path]) -> Result<Plan> {
        let tlist = path.parent()?.targetlist.clone();
        let subplans = subpaths
            .iter()
            .map(|sub| self.create_plan(sub))
            .collect::<Result<Vec<_>>>()?;
        Ok(make_append(subplans, false, tlist))
    }

    fn create_result_plan(
        &self,
        path: &Path,
        subpath: Option<&Path>,
        constant_qual: &[Expr],
    ) -> Result<Plan> {
        let tlist = path
            .parent
            .as_ref()
            .map(|rel| rel.targetlist.clone())
            .unwrap_or_default();
        let subplan = subpath.map(|sub| self.create_plan(sub)).transpose()?;
        let quals = self.order_quals(constant_qual.to_vec());
        Ok(make_result(&self.cost, tlist, quals, subplan))
    }

    /// The wrapper's own estimate already includes the buffering cost, so it
    /// replaces whatever the child reported.
    fn create_material_plan(&self, path: &Path, subpath: &Path) -> Result<Plan> {
        let tlist = path.parent()?.targetlist.clone();
        let subplan = self.create_plan(subpath)?;
        let mut plan = make_material(tlist, subplan);
        copy_path_costsize(&mut plan, path)?;
        Ok(plan)
    }
}
