//! Convenient re-exports for downstream crates.

pub use crate::catalog::{Catalog, MemoryCatalog};
pub use crate::config::CostConfig;
pub use crate::error::{Error, Result};
pub use crate::expr::{BoolOp, Datum, Expr, OpExpr, ParamKind, Relids, SubPlanExpr};
pub use crate::id::{AttrNumber, FuncId, IndexId, OpClassId, OperatorId, PlanId, RelId, TypeId};
pub use crate::path::{
    IndexOptInfo, IndexPath, JoinMethod, JoinPath, JoinType, Path, PathKey, PathKeyItem,
    PathKind, RelOptInfo, RestrictInfo, RteKind, ScanDirection, ScanPath,
};
pub use crate::plan::{
    AggStrategy, JoinInfo, Plan, PlanNode, SetOpCmd, SortClause, TargetEntry,
};
