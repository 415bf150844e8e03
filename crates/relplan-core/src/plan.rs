//! Executable plan tree.
//!
//! A `Plan` owns its children outright. Estimates (`startup_cost`,
//! `total_cost`, `plan_rows`, `plan_width`) are advisory; execution never
//! consults them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::hash::{fingerprint, Hash256};
use crate::id::{AttrNumber, IndexId, OperatorId, RelId};
use crate::path::{JoinType, ScanDirection};

/// One output column of a plan node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// 1-based output position.
    pub resno: AttrNumber,
    pub expr: Expr,
    pub name: Option<String>,
    /// Computed only for a parent's benefit (e.g. a sort key); not returned.
    pub resjunk: bool,
    /// Sort key rank, 0 when this column is not a sort key.
    pub reskey: u32,
    pub reskeyop: Option<OperatorId>,
    /// Referenced by `SortClause::tle_sort_group_ref`; 0 when unreferenced.
    pub ressortgroupref: u32,
}

impl TargetEntry {
    pub fn new(resno: AttrNumber, expr: Expr, name: Option<String>) -> Self {
        Self {
            resno,
            expr,
            name,
            resjunk: false,
            reskey: 0,
            reskeyop: None,
            ressortgroupref: 0,
        }
    }

    pub fn junk(resno: AttrNumber, expr: Expr) -> Self {
        Self {
            resjunk: true,
            ..Self::new(resno, expr, None)
        }
    }

    pub fn with_sortgroupref(mut self, r: u32) -> Self {
        self.ressortgroupref = r;
        self
    }
}

/// Identifies a target-list column used for sorting, grouping, or
/// duplicate elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub tle_sort_group_ref: u32,
    pub sortop: OperatorId,
}

/// Find the target entry a sort/group clause refers to.
pub fn get_sortgroupclause_tle<'a>(
    clause: &SortClause,
    tlist: &'a [TargetEntry],
) -> Result<&'a TargetEntry> {
    tlist
        .iter()
        .find(|tle| tle.ressortgroupref == clause.tle_sort_group_ref)
        .ok_or(Error::MissingSortGroupClause(clause.tle_sort_group_ref))
}

/// Position in `tlist` of the entry computing exactly `expr`.
pub fn tlist_member(expr: &Expr, tlist: &[TargetEntry]) -> Option<usize> {
    tlist.iter().position(|tle| tle.expr == *expr)
}

/// Copy of a target list with all sort-key markings cleared.
pub fn new_unsorted_tlist(tlist: &[TargetEntry]) -> Vec<TargetEntry> {
    tlist
        .iter()
        .map(|tle| TargetEntry {
            reskey: 0,
            reskeyop: None,
            ..tle.clone()
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggStrategy {
    /// No grouping: one output row.
    Plain,
    /// Grouped input arrives sorted on the group columns.
    Sorted,
    /// Grouping via an in-memory hash table.
    Hashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetOpCmd {
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinInfo {
    pub jointype: JoinType,
    /// Clauses deciding whether an outer and inner row match.
    pub joinqual: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanNode {
    SeqScan {
        scanrelid: RelId,
    },
    IndexScan {
        scanrelid: RelId,
        indxid: Vec<IndexId>,
        /// Rewritten into index-key space, one group per index.
        indxqual: Vec<Vec<Expr>>,
        /// The groups as the path supplied them.
        indxqualorig: Vec<Vec<Expr>>,
        indxorderdir: ScanDirection,
    },
    TidScan {
        scanrelid: RelId,
        tideval: Vec<Expr>,
    },
    SubqueryScan {
        scanrelid: RelId,
        subplan: Box<Plan>,
    },
    FunctionScan {
        scanrelid: RelId,
    },
    Append {
        appendplans: Vec<Plan>,
        is_target: bool,
    },
    Result {
        /// Evaluated once; when false the node returns nothing.
        resconstantqual: Vec<Expr>,
    },
    NestLoop {
        join: JoinInfo,
    },
    MergeJoin {
        join: JoinInfo,
        mergeclauses: Vec<Expr>,
    },
    HashJoin {
        join: JoinInfo,
        hashclauses: Vec<Expr>,
    },
    Hash {
        hashkeys: Vec<Expr>,
    },
    Material,
    Sort {
        keycount: u32,
    },
    Agg {
        strategy: AggStrategy,
        grp_col_idx: Vec<AttrNumber>,
        num_groups: u64,
    },
    Group {
        grp_col_idx: Vec<AttrNumber>,
    },
    Unique {
        uniq_col_idx: Vec<AttrNumber>,
    },
    SetOp {
        cmd: SetOpCmd,
        dup_col_idx: Vec<AttrNumber>,
        flag_col_idx: AttrNumber,
    },
    Limit {
        limit_offset: Option<Expr>,
        limit_count: Option<Expr>,
    },
}

impl Default for PlanNode {
    fn default() -> Self {
        PlanNode::Result {
            resconstantqual: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub startup_cost: f64,
    pub total_cost: f64,
    pub plan_rows: f64,
    pub plan_width: i32,
    pub targetlist: Vec<TargetEntry>,
    /// Residual filter; every clause must hold for a row to pass.
    pub qual: Vec<Expr>,
    pub lefttree: Option<Box<Plan>>,
    pub righttree: Option<Box<Plan>>,
    pub node: PlanNode,
}

impl Plan {
    /// Node with zeroed estimates and no children; callers fill the rest.
    pub fn new(node: PlanNode, targetlist: Vec<TargetEntry>) -> Self {
        Self {
            node,
            targetlist,
            ..Self::default()
        }
    }

    pub fn with_children(mut self, lefttree: Option<Plan>, righttree: Option<Plan>) -> Self {
        self.lefttree = lefttree.map(Box::new);
        self.righttree = righttree.map(Box::new);
        self
    }

    pub fn node_name(&self) -> &'static str {
        match &self.node {
            PlanNode::SeqScan { .. } => "Seq Scan",
            PlanNode::IndexScan { .. } => "Index Scan",
            PlanNode::TidScan { .. } => "Tid Scan",
            PlanNode::SubqueryScan { .. } => "Subquery Scan",
            PlanNode::FunctionScan { .. } => "Function Scan",
            PlanNode::Append { .. } => "Append",
            PlanNode::Result { .. } => "Result",
            PlanNode::NestLoop { .. } => "Nested Loop",
            PlanNode::MergeJoin { .. } => "Merge Join",
            PlanNode::HashJoin { .. } => "Hash Join",
            PlanNode::Hash { .. } => "Hash",
            PlanNode::Material => "Materialize",
            PlanNode::Sort { .. } => "Sort",
            PlanNode::Agg { .. } => "Aggregate",
            PlanNode::Group { .. } => "Group",
            PlanNode::Unique { .. } => "Unique",
            PlanNode::SetOp { .. } => "SetOp",
            PlanNode::Limit { .. } => "Limit",
        }
    }

    /// Base relation scanned by this node, for scan nodes.
    pub fn scanrelid(&self) -> Option<RelId> {
        match &self.node {
            PlanNode::SeqScan { scanrelid }
            | PlanNode::IndexScan { scanrelid, .. }
            | PlanNode::TidScan { scanrelid, .. }
            | PlanNode::SubqueryScan { scanrelid, .. }
            | PlanNode::FunctionScan { scanrelid } => Some(*scanrelid),
            _ => None,
        }
    }

    pub fn join_info(&self) -> Option<&JoinInfo> {
        match &self.node {
            PlanNode::NestLoop { join }
            | PlanNode::MergeJoin { join, .. }
            | PlanNode::HashJoin { join, .. } => Some(join),
            _ => None,
        }
    }

    /// Whether the node can evaluate arbitrary target-list expressions.
    /// Nodes that pass input rows through unchanged cannot.
    pub fn can_project(&self) -> bool {
        !matches!(
            self.node,
            PlanNode::Append { .. }
                | PlanNode::Material
                | PlanNode::Sort { .. }
                | PlanNode::Hash { .. }
                | PlanNode::Unique { .. }
                | PlanNode::SetOp { .. }
                | PlanNode::Limit { .. }
        )
    }

    /// All owned child plans, in display order.
    pub fn children(&self) -> Vec<&Plan> {
        let mut out: Vec<&Plan> = Vec::new();
        if let Some(l) = &self.lefttree {
            out.push(l);
        }
        if let Some(r) = &self.righttree {
            out.push(r);
        }
        match &self.node {
            PlanNode::Append { appendplans, .. } => out.extend(appendplans.iter()),
            PlanNode::SubqueryScan { subplan, .. } => out.push(subplan),
            _ => {}
        }
        out
    }

    /// Stable structural fingerprint; equal plans hash equal.
    pub fn fingerprint(&self) -> Result<Hash256> {
        fingerprint(self)
    }

    /// Copy estimates from another node (used for inserted nodes).
    pub fn copy_costsize_from(&mut self, src: &Plan) {
        self.startup_cost = src.startup_cost;
        self.total_cost = src.total_cost;
        self.plan_rows = src.plan_rows;
        self.plan_width = src.plan_width;
    }
}
