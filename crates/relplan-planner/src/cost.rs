//! Cost estimation for nodes the translator builds on its own.
//!
//! Scan and join nodes inherit the estimates computed by the path search.
//! Nodes inserted during translation (sorts, hashes, aggregates, limits...)
//! are costed here, from their input's estimates and a `CostConfig`. None of
//! these numbers influence execution; they exist for diagnostics and for
//! outer planning levels that read a subquery's estimates.

use relplan_core::config::CostConfig;
use relplan_core::error::Result;
use relplan_core::expr::Expr;
use relplan_core::path::Path;
use relplan_core::plan::{AggStrategy, Plan, TargetEntry};
use serde::{Deserialize, Serialize};

/// Cost of evaluating an expression list: once per scan plus per tuple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualCost {
    pub startup: f64,
    pub per_tuple: f64,
}

/// `(startup_cost, total_cost)`.
pub type CostPair = (f64, f64);

#[derive(Debug, Clone, Default)]
pub struct CostModel {
    cfg: CostConfig,
}

impl CostModel {
    pub fn new(cfg: CostConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &CostConfig {
        &self.cfg
    }

    /// Estimate evaluation cost of an implicitly-ANDed expression list.
    pub fn cost_qual_eval(&self, exprs: &[Expr]) -> QualCost {
        let mut acc = QualCost::default();
        for e in exprs {
            self.qual_walk(e, &mut acc);
        }
        acc
    }

    /// Same as `cost_qual_eval`, over target-list expressions.
    pub fn cost_tlist_eval(&self, tlist: &[TargetEntry]) -> QualCost {
        let mut acc = QualCost::default();
        for tle in tlist {
            self.qual_walk(&tle.expr, &mut acc);
        }
        acc
    }

    fn qual_walk(&self, e: &Expr, acc: &mut QualCost) {
        match e {
            Expr::Op(_) | Expr::Func { .. } => acc.per_tuple += self.cfg.cpu_operator_cost,
            // Aggregate results are read like columns by the node above the
            // aggregation; their inputs are charged at the Agg node itself.
            Expr::Aggref { .. } => return,
            Expr::SubPlan(sp) => {
                if sp.args.is_empty() {
                    acc.startup += sp.plan.total_cost;
                } else {
                    acc.per_tuple += sp.plan.total_cost;
                }
            }
            _ => {}
        }
        for child in e.children() {
            self.qual_walk(child, acc);
        }
    }

    /// Bytes occupied by `tuples` rows of average `width`.
    pub fn relation_byte_size(&self, tuples: f64, width: i32) -> f64 {
        tuples * (width.max(0) as f64 + self.cfg.tuple_overhead_bytes as f64)
    }

    /// Sort `tuples` rows whose input costs `input_cost` to produce.
    ///
    /// In-memory sorts charge `n log2 n` comparisons; when the data exceeds
    /// sort memory each merge pass reads and writes every page once, with
    /// half the accesses assumed random.
    pub fn cost_sort(&self, input_cost: f64, tuples: f64, width: i32) -> CostPair {
        let nbytes = self.relation_byte_size(tuples, width);
        let tuples = tuples.max(2.0);

        let mut startup = input_cost;
        startup += self.cfg.cpu_operator_cost * tuples * tuples.log2();

        let sort_mem = self.cfg.sort_mem_bytes();
        if nbytes > sort_mem {
            let npages = (nbytes / self.cfg.block_size as f64).ceil();
            let nruns = nbytes / (sort_mem * 2.0);
            let log_runs = (nruns.ln() / 6f64.ln()).ceil().max(1.0);
            let page_accesses = 2.0 * npages * log_runs;
            startup += page_accesses * (1.0 + self.cfg.random_page_cost) * 0.5;
        }

        // Fetching each tuple from the finished sort costs one comparison.
        let run = self.cfg.cpu_operator_cost * tuples;
        (startup, startup + run)
    }

    /// Aggregation over an input with the given estimates.
    #[allow(clippy::too_many_arguments)]
    pub fn cost_agg(
        &self,
        strategy: AggStrategy,
        num_aggs: usize,
        num_group_cols: usize,
        num_groups: f64,
        input_startup: f64,
        input_total: f64,
        input_tuples: f64,
    ) -> CostPair {
        let op = self.cfg.cpu_operator_cost;
        match strategy {
            AggStrategy::Plain => {
                // Everything happens before the single row comes out.
                let startup = input_total + op * input_tuples * num_aggs as f64;
                (startup, startup)
            }
            AggStrategy::Sorted => {
                let total = input_total
                    + op * input_tuples * num_group_cols as f64
                    + op * input_tuples * num_aggs as f64
                    + self.cfg.cpu_tuple_cost * num_groups;
                (input_startup, total)
            }
            AggStrategy::Hashed => {
                // Whole input is consumed into the table before output starts.
                let startup = input_total
                    + op * input_tuples * num_group_cols as f64
                    + op * input_tuples * num_aggs as f64;
                (startup, startup + self.cfg.cpu_tuple_cost * num_groups)
            }
        }
    }

    /// Grouping of pre-sorted input: one comparison per grouping column per
    /// input tuple.
    pub fn cost_group(
        &self,
        num_group_cols: usize,
        _num_groups: f64,
        input_startup: f64,
        input_total: f64,
        input_tuples: f64,
    ) -> CostPair {
        let total =
            input_total + self.cfg.cpu_operator_cost * input_tuples * num_group_cols as f64;
        (input_startup, total)
    }
}

/// Copy the search phase's estimates from a path onto the node built for it.
pub fn copy_path_costsize(dest: &mut Plan, src: &Path) -> Result<()> {
    let parent = src.parent()?;
    dest.startup_cost = src.startup_cost;
    dest.total_cost = src.total_cost;
    dest.plan_rows = parent.rows;
    dest.plan_width = parent.width;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relplan_core::expr::{SubPlanExpr, BOOL_TYPE, INT4_TYPE};
    use relplan_core::id::{FuncId, OperatorId, PlanId, RelId};

    fn model() -> CostModel {
        CostModel::new(CostConfig::default())
    }

    fn v(att: i32) -> Expr {
        Expr::var(RelId::new(1), att, INT4_TYPE)
    }

    #[test]
    fn test_qual_eval_counts_operators_and_functions() {
        let e = Expr::op(
            OperatorId::new(96),
            v(1),
            Expr::Func {
                funcid: FuncId::new(3),
                result_type: INT4_TYPE,
                args: vec![v(2)],
            },
        );
        let qc = model().cost_qual_eval(&[e]);
        assert_eq!(qc.startup, 0.0);
        assert!((qc.per_tuple - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_qual_eval_subplans() {
        let mut plan = Plan::default();
        plan.total_cost = 50.0;
        let correlated = Expr::SubPlan(SubPlanExpr {
            plan_id: PlanId::new(1),
            args: vec![v(1)],
            result_type: BOOL_TYPE,
            plan: Box::new(plan.clone()),
        });
        let once = Expr::SubPlan(SubPlanExpr {
            plan_id: PlanId::new(2),
            args: vec![],
            result_type: BOOL_TYPE,
            plan: Box::new(plan),
        });
        let m = model();
        assert_eq!(m.cost_qual_eval(&[correlated]).per_tuple, 50.0);
        let qc = m.cost_qual_eval(&[once]);
        assert_eq!(qc.startup, 50.0);
        assert_eq!(qc.per_tuple, 0.0);
    }

    #[test]
    fn test_aggref_is_free() {
        let agg = Expr::Aggref {
            aggfnoid: FuncId::new(2108),
            result_type: INT4_TYPE,
            args: vec![Expr::op(OperatorId::new(551), v(1), v(2))],
        };
        assert_eq!(model().cost_qual_eval(&[agg]), QualCost::default());
    }

    #[test]
    fn test_sort_in_memory() {
        let (startup, total) = model().cost_sort(10.0, 8.0, 4);
        // 8 * log2(8) = 24 comparisons
        assert!((startup - (10.0 + 0.0025 * 24.0)).abs() < 1e-9);
        assert!((total - (startup + 0.0025 * 8.0)).abs() < 1e-9);
    }

    #[test]
    fn test_sort_floors_tuples_at_two() {
        let (startup, _) = model().cost_sort(0.0, 0.0, 4);
        assert!((startup - 0.0025 * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sort_spills_when_over_memory() {
        let mut cfg = CostConfig::default();
        cfg.sort_mem_kb = 1;
        let small = CostModel::new(cfg);
        let (spilled, _) = small.cost_sort(0.0, 1_000.0, 100);
        let (in_mem, _) = model().cost_sort(0.0, 1_000.0, 100);
        assert!(spilled > in_mem);
    }

    #[test]
    fn test_agg_strategies() {
        let m = model();
        let (s, t) = m.cost_agg(AggStrategy::Plain, 2, 0, 1.0, 1.0, 100.0, 1000.0);
        assert_eq!(s, t);
        assert!((s - (100.0 + 0.0025 * 1000.0 * 2.0)).abs() < 1e-9);

        let (s, t) = m.cost_agg(AggStrategy::Sorted, 1, 1, 10.0, 1.0, 100.0, 1000.0);
        assert_eq!(s, 1.0);
        assert!((t - (100.0 + 2.5 + 2.5 + 0.1)).abs() < 1e-9);

        let (s, t) = m.cost_agg(AggStrategy::Hashed, 1, 1, 10.0, 1.0, 100.0, 1000.0);
        assert!((s - 105.0).abs() < 1e-9);
        assert!((t - 105.1).abs() < 1e-9);
    }

    #[test]
    fn test_group_streams() {
        let (s, t) = model().cost_group(2, 10.0, 3.0, 100.0, 1000.0);
        assert_eq!(s, 3.0);
        assert!((t - 105.0).abs() < 1e-9);
    }
}
