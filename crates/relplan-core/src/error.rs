use thiserror::Error;

use crate::id::{IndexId, OperatorId, RelId};

/// Canonical result for core and planner.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is a broken contract between the path search and the
/// translator. None of these are recoverable; the translation is abandoned.
#[derive(Debug, Error)]
pub enum Error {
    #[error("scan path must cover exactly one base relation, found {count}")]
    MultipleBaseRels { count: usize },

    #[error("scan path expects a {expected} relation, found {found}")]
    WrongRelKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("path node has no parent relation")]
    MissingParent,

    #[error("indexqual clause is not a binary operator clause")]
    NotBinaryOpClause,

    #[error("attribute {attno} of relation {relid} is not a key of index {index}")]
    NotIndexKey {
        index: IndexId,
        relid: RelId,
        attno: i32,
    },

    #[error("index path has {quals} qual groups but {indexes} indexes")]
    IndexQualMismatch { quals: usize, indexes: usize },

    #[error("operator {0} has no commutator")]
    NoCommutator(OperatorId),

    #[error("cannot find pathkey item to sort")]
    PathKeyNotFound,

    #[error("sort requested with no sort keys")]
    EmptySortKeys,

    #[error("sort/group clause {0} does not match any target list entry")]
    MissingSortGroupClause(u32),

    #[error("internal invariant failed: {0}")]
    Invariant(String),

    #[error("hashing error: {0}")]
    Hash(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Hash(e.to_string())
    }
}
