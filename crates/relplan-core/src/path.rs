//! Strategy trees ("paths") produced by the cost-based search.
//!
//! Paths are read-only input to the translator. Relation descriptors are
//! shared between the many paths built for the same relation, hence `Arc`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr::{Expr, Relids};
use crate::id::{AttrNumber, FuncId, IndexId, OpClassId, OperatorId, RelId};
use crate::plan::{Plan, TargetEntry};

/// Join types (outer variants keep unmatched rows from one or both sides).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn is_outer(self) -> bool {
        !matches!(self, JoinType::Inner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanDirection {
    Backward,
    NoMovement,
    #[default]
    Forward,
}

/// A clause plus the relation sets of its two operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictInfo {
    pub clause: Expr,
    /// Pushed down from above an outer join: applies after null-extension,
    /// so it filters joined rows instead of deciding matches.
    pub is_pushed_down: bool,
    pub left_relids: Relids,
    pub right_relids: Relids,
}

impl RestrictInfo {
    /// Wrap a clause, deriving operand relation sets for binary operators.
    pub fn new(clause: Expr) -> Self {
        let (left_relids, right_relids) = match clause.as_op() {
            Some(op) if op.is_binary() => (op.args[0].pull_varnos(), op.args[1].pull_varnos()),
            _ => (Relids::new(), Relids::new()),
        };
        Self {
            clause,
            is_pushed_down: false,
            left_relids,
            right_relids,
        }
    }

    pub fn pushed_down(mut self) -> Self {
        self.is_pushed_down = true;
        self
    }
}

/// Index metadata as the search phase saw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexOptInfo {
    pub index_id: IndexId,
    /// Table attribute number for each index column.
    pub index_keys: Vec<AttrNumber>,
    /// Operator class for each index column.
    pub opclasses: Vec<OpClassId>,
    /// Set for a functional index; such indexes have exactly one key.
    pub index_proc: Option<FuncId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RteKind {
    Relation,
    /// Already planned sub-select in FROM.
    Subquery { subplan: Box<Plan> },
    /// Set-returning function in FROM.
    Function,
}

impl RteKind {
    pub fn name(&self) -> &'static str {
        match self {
            RteKind::Relation => "relation",
            RteKind::Subquery { .. } => "subquery",
            RteKind::Function => "function",
        }
    }
}

/// Relation descriptor: a base relation or a join of several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelOptInfo {
    pub relids: Relids,
    /// Estimated output rows after restrictions.
    pub rows: f64,
    /// Estimated average output row width in bytes.
    pub width: i32,
    pub targetlist: Vec<TargetEntry>,
    pub base_restrict_info: Vec<RestrictInfo>,
    pub rtekind: RteKind,
}

impl RelOptInfo {
    /// The one base relation this descriptor covers.
    pub fn single_relid(&self) -> Result<RelId> {
        let mut it = self.relids.iter();
        match (it.next(), it.next()) {
            (Some(r), None) => Ok(*r),
            _ => Err(Error::MultipleBaseRels {
                count: self.relids.len(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathKeyItem {
    pub key: Expr,
    pub sortop: OperatorId,
}

/// Equivalent alternatives for one position of a required ordering.
pub type PathKey = Vec<PathKeyItem>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPath {
    /// One entry per index scan; the scans' results are ORed.
    pub indexinfo: Vec<IndexOptInfo>,
    /// Parallel to `indexinfo`: the ANDed conditions for each scan.
    pub indexqual: Vec<Vec<Expr>>,
    pub scan_direction: ScanDirection,
    /// Index-specific row estimate (the relation's `rows` is generic).
    pub rows: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScanPath {
    SeqScan,
    IndexScan(IndexPath),
    TidScan { tideval: Vec<Expr> },
    SubqueryScan,
    FunctionScan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinMethod {
    NestLoop,
    MergeJoin {
        mergeclauses: Vec<RestrictInfo>,
        /// Empty when the outer input is already suitably ordered.
        outer_sort_keys: Vec<PathKey>,
        inner_sort_keys: Vec<PathKey>,
    },
    HashJoin {
        hashclauses: Vec<RestrictInfo>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinPath {
    pub jointype: JoinType,
    pub outer: Box<Path>,
    pub inner: Box<Path>,
    pub join_restrict_info: Vec<RestrictInfo>,
    pub method: JoinMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathKind {
    Scan(ScanPath),
    Join(JoinPath),
    Append {
        subpaths: Vec<Path>,
    },
    /// Constant-qual gate over an optional input; with no input it yields one
    /// row computed from constants.
    Result {
        subpath: Option<Box<Path>>,
        constant_qual: Vec<Expr>,
    },
    Material {
        subpath: Box<Path>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub startup_cost: f64,
    pub total_cost: f64,
    pub parent: Option<Arc<RelOptInfo>>,
    pub kind: PathKind,
}

impl Path {
    pub fn new(parent: Arc<RelOptInfo>, kind: PathKind, startup_cost: f64, total_cost: f64) -> Self {
        Self {
            startup_cost,
            total_cost,
            parent: Some(parent),
            kind,
        }
    }

    pub fn parent(&self) -> Result<&RelOptInfo> {
        self.parent.as_deref().ok_or(Error::MissingParent)
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            PathKind::Scan(ScanPath::SeqScan) => "SeqScan",
            PathKind::Scan(ScanPath::IndexScan(_)) => "IndexScan",
            PathKind::Scan(ScanPath::TidScan { .. }) => "TidScan",
            PathKind::Scan(ScanPath::SubqueryScan) => "SubqueryScan",
            PathKind::Scan(ScanPath::FunctionScan) => "FunctionScan",
            PathKind::Join(j) => match j.method {
                JoinMethod::NestLoop => "NestLoop",
                JoinMethod::MergeJoin { .. } => "MergeJoin",
                JoinMethod::HashJoin { .. } => "HashJoin",
            },
            PathKind::Append { .. } => "Append",
            PathKind::Result { .. } => "Result",
            PathKind::Material { .. } => "Material",
        }
    }
}
