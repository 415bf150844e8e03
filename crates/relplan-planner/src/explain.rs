//! EXPLAIN-style rendering of plan trees.
//!
//! Diagnostic only; the text format is not meant to be parsed.

use std::fmt::Write;

use relplan_core::error::Result;
use relplan_core::expr::Expr;
use relplan_core::plan::{AggStrategy, Plan, PlanNode};

pub struct ExplainOutput;

impl ExplainOutput {
    /// Indented tree, one node per line followed by its conditions.
    pub fn format(plan: &Plan) -> String {
        let mut output = String::new();
        Self::format_node(plan, 0, &mut output);
        output
    }

    /// Full plan as pretty-printed JSON.
    pub fn format_json(plan: &Plan) -> Result<String> {
        Ok(serde_json::to_string_pretty(plan)?)
    }

    fn format_node(plan: &Plan, indent: usize, out: &mut String) {
        let prefix = "  ".repeat(indent);
        let arrow = if indent > 0 { "->  " } else { "" };

        let _ = writeln!(
            out,
            "{}{}{}{}  (cost={:.2}..{:.2} rows={:.0} width={})",
            prefix,
            arrow,
            plan.node_name(),
            Self::node_detail(plan),
            plan.startup_cost,
            plan.total_cost,
            plan.plan_rows,
            plan.plan_width
        );

        let detail_prefix = format!("{prefix}      ");
        match &plan.node {
            PlanNode::IndexScan { indxqualorig, .. } => {
                let groups: Vec<Expr> = indxqualorig
                    .iter()
                    .map(|g| relplan_core::expr::make_ands_explicit(g.clone()))
                    .collect();
                Self::write_clauses(out, &detail_prefix, "Index Cond", &groups);
            }
            PlanNode::TidScan { tideval, .. } => {
                Self::write_clauses(out, &detail_prefix, "Tid Cond", tideval);
            }
            PlanNode::Result { resconstantqual } => {
                Self::write_clauses(out, &detail_prefix, "One-Time Filter", resconstantqual);
            }
            PlanNode::NestLoop { join } => {
                Self::write_clauses(out, &detail_prefix, "Join Filter", &join.joinqual);
            }
            PlanNode::MergeJoin { join, mergeclauses } => {
                Self::write_clauses(out, &detail_prefix, "Merge Cond", mergeclauses);
                Self::write_clauses(out, &detail_prefix, "Join Filter", &join.joinqual);
            }
            PlanNode::HashJoin { join, hashclauses } => {
                Self::write_clauses(out, &detail_prefix, "Hash Cond", hashclauses);
                Self::write_clauses(out, &detail_prefix, "Join Filter", &join.joinqual);
            }
            PlanNode::Sort { .. } => {
                let mut keys: Vec<_> = plan.targetlist.iter().filter(|t| t.reskey > 0).collect();
                keys.sort_by_key(|t| t.reskey);
                let keys: Vec<String> = keys.iter().map(|t| t.expr.to_string()).collect();
                let _ = writeln!(out, "{}Sort Key: {}", detail_prefix, keys.join(", "));
            }
            PlanNode::Limit {
                limit_offset,
                limit_count,
            } => {
                if let Some(o) = limit_offset {
                    let _ = writeln!(out, "{}Offset: {}", detail_prefix, o);
                }
                if let Some(c) = limit_count {
                    let _ = writeln!(out, "{}Count: {}", detail_prefix, c);
                }
            }
            _ => {}
        }
        Self::write_clauses(out, &detail_prefix, "Filter", &plan.qual);

        for child in plan.children() {
            Self::format_node(child, indent + 1, out);
        }
    }

    fn node_detail(plan: &Plan) -> String {
        match &plan.node {
            PlanNode::IndexScan { indxid, scanrelid, .. } => {
                let ids: Vec<String> = indxid.iter().map(|i| i.get().to_string()).collect();
                format!(" using {} on rel {}", ids.join(", "), scanrelid.get())
            }
            PlanNode::NestLoop { join }
            | PlanNode::MergeJoin { join, .. }
            | PlanNode::HashJoin { join, .. } => {
                if join.jointype.is_outer() {
                    format!(" ({:?})", join.jointype)
                } else {
                    String::new()
                }
            }
            PlanNode::Agg { strategy, .. } => match strategy {
                AggStrategy::Plain => String::new(),
                AggStrategy::Sorted => " (sorted)".to_string(),
                AggStrategy::Hashed => " (hashed)".to_string(),
            },
            PlanNode::SetOp { cmd, .. } => format!(" {:?}", cmd),
            _ => match plan.scanrelid() {
                Some(rel) => format!(" on rel {}", rel.get()),
                None => String::new(),
            },
        }
    }

    fn write_clauses(out: &mut String, prefix: &str, label: &str, clauses: &[Expr]) {
        if clauses.is_empty() {
            return;
        }
        let text: Vec<String> = clauses.iter().map(|c| c.to_string()).collect();
        let _ = writeln!(out, "{}{}: {}", prefix, label, text.join(" AND "));
    }
}
