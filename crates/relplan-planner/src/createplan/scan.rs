//! Scan node construction.

use relplan_core::error::{Error, Result};
use relplan_core::expr::{make_ands_explicit, make_orclause, Expr};
use relplan_core::id::RelId;
use relplan_core::path::{IndexPath, Path, RelOptInfo, RteKind, ScanPath};
use relplan_core::plan::{Plan, PlanNode, TargetEntry};

use super::Planner;
use crate::clauses::{get_actual_clauses, set_difference};
use crate::cost::copy_path_costsize;
use crate::indexqual::fix_indxqual_references;

/// The single base relation of a scan, checked against the kind of source
/// the scan expects.
fn scan_relid(rel: &RelOptInfo, expected: &'static str) -> Result<RelId> {
    let relid = rel.single_relid()?;
    let found = rel.rtekind.name();
    if found != expected {
        return Err(Error::WrongRelKind { expected, found });
    }
    Ok(relid)
}

impl Planner<'_> {
    pub(super) fn create_scan_plan(&self, path: &Path, scan: &ScanPath) -> Result<Plan> {
        let rel = path.parent()?;
        let tlist = rel.targetlist.clone();
        let scan_clauses = self.order_quals(get_actual_clauses(&rel.base_restrict_info));

        let plan = match scan {
            ScanPath::SeqScan => self.create_seqscan_plan(path, rel, tlist, scan_clauses)?,
            ScanPath::IndexScan(ipath) => {
                self.create_indexscan_plan(path, ipath, rel, tlist, scan_clauses)?
            }
            ScanPath::TidScan { tideval } => {
                let scanrelid = scan_relid(rel, "relation")?;
                let mut plan = Plan::new(
                    PlanNode::TidScan {
                        scanrelid,
                        tideval: tideval.clone(),
                    },
                    tlist,
                );
                plan.qual = scan_clauses;
                copy_path_costsize(&mut plan, path)?;
                plan
            }
            ScanPath::SubqueryScan => self.create_subqueryscan_plan(rel, tlist, scan_clauses)?,
            ScanPath::FunctionScan => {
                let scanrelid = scan_relid(rel, "function")?;
                let mut plan = Plan::new(PlanNode::FunctionScan { scanrelid }, tlist);
                plan.qual = scan_clauses;
                copy_path_costsize(&mut plan, path)?;
                plan
            }
        };
        Ok(plan)
    }

    fn create_seqscan_plan(
        &self,
        path: &Path,
        rel: &RelOptInfo,
        tlist: Vec<TargetEntry>,
        scan_clauses: Vec<Expr>,
    ) -> Result<Plan> {
        let scanrelid = scan_relid(rel, "relation")?;
        let mut plan = Plan::new(PlanNode::SeqScan { scanrelid }, tlist);
        plan.qual = scan_clauses;
        copy_path_costsize(&mut plan, path)?;
        Ok(plan)
    }

    /// Index scan over one or more indexes whose results are ORed.
    ///
    /// Restriction clauses the index enforces are dropped from the residual
    /// filter. Clauses the index may over-select on are put back: the
    /// individual clauses for a single index, or the whole OR condition when
    /// several indexes are combined.
    fn create_indexscan_plan(
        &self,
        path: &Path,
        ipath: &IndexPath,
        rel: &RelOptInfo,
        tlist: Vec<TargetEntry>,
        scan_clauses: Vec<Expr>,
    ) -> Result<Plan> {
        let baserelid = scan_relid(rel, "relation")?;
        let indxid = ipath.indexinfo.iter().map(|ix| ix.index_id).collect();
        let indxqual = &ipath.indexqual;

        let mut indxqual_or_expr = None;
        let mut qpqual = match indxqual.as_slice() {
            [] => scan_clauses,
            [only] => set_difference(scan_clauses, only),
            groups => {
                let ors = make_orclause(
                    groups
                        .iter()
                        .map(|g| make_ands_explicit(g.clone()))
                        .collect(),
                );
                let remaining = set_difference(scan_clauses, std::slice::from_ref(&ors));
                indxqual_or_expr = Some(ors);
                remaining
            }
        };

        let fixed = fix_indxqual_references(indxqual, &ipath.indexinfo, baserelid, self.catalog)?;

        if !fixed.recheck.is_empty() {
            match indxqual_or_expr {
                Some(ors) => qpqual.push(ors),
                None => qpqual.extend(fixed.recheck.into_iter().flatten()),
            }
        }

        let mut plan = Plan::new(
            PlanNode::IndexScan {
                scanrelid: baserelid,
                indxid,
                indxqual: fixed.fixed,
                indxqualorig: indxqual.clone(),
                indxorderdir: ipath.scan_direction,
            },
            tlist,
        );
        plan.qual = qpqual;
        copy_path_costsize(&mut plan, path)?;
        plan.plan_rows = ipath.rows;
        Ok(plan)
    }

    /// The inner query is already planned; its plan is copied in and supplies
    /// the estimates.
    fn create_subqueryscan_plan(
        &self,
        rel: &RelOptInfo,
        tlist: Vec<TargetEntry>,
        scan_clauses: Vec<Expr>,
    ) -> Result<Plan> {
        let scanrelid = scan_relid(rel, "subquery")?;
        let subplan = match &rel.rtekind {
            RteKind::Subquery { subplan } => subplan.clone(),
            other => {
                return Err(Error::WrongRelKind {
                    expected: "subquery",
                    found: other.name(),
                })
            }
        };
        let mut plan = Plan::new(PlanNode::default(), tlist);
        plan.copy_costsize_from(&subplan);
        plan.qual = scan_clauses;
        plan.node = PlanNode::SubqueryScan { scanrelid, subplan };
        Ok(plan)
    }
}
