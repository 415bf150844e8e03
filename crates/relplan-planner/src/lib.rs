#![forbid(unsafe_code)]
//! relplan-planner: chosen strategy tree (`Path`) → executable plan (`Plan`).
//!
//! Design:
//! - Data model lives in `relplan-core`; this crate only builds from it.
//! - `createplan::Planner` is the single entry point. It dispatches on the
//!   path kind and hands off to:
//!     * scan translators, with `indexqual` rewriting index conditions into
//!       index-key space
//!     * join translators, using `clauses` to split and orient join clauses
//!     * `builders` for inserted nodes (sort, hash, result, append)
//! - `builders` is also public for callers stacking grouping, distinct,
//!   set-op, and limit nodes on a translated tree.
//! - `cost` estimates inserted nodes; `explain` renders a finished tree.

pub mod builders;
pub mod clauses;
pub mod cost;
pub mod createplan;
pub mod explain;
pub mod indexqual;

pub use cost::{CostModel, QualCost};
pub use createplan::Planner;
pub use explain::ExplainOutput;
pub use indexqual::FixedIndexQuals;
