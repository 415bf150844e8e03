//! Catalog lookups the translator needs, and an in-memory implementation.
//!
//! The translator never queries system tables itself; callers hand it a
//! `Catalog`. Operator-class lists for index keys travel inside
//! `IndexOptInfo` and are not looked up here.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::id::{OpClassId, OperatorId};

pub trait Catalog: Send + Sync {
    /// Whether an index of class `opclass` may return false positives for
    /// `opno`, so the original clause has to be evaluated again.
    fn op_requires_recheck(&self, opno: OperatorId, opclass: OpClassId) -> bool;

    /// Operator equivalent to `opno` with its operands swapped.
    fn commutator(&self, opno: OperatorId) -> Option<OperatorId>;
}

/// Catalog backed by ordered maps; cheap to build in tests and fixtures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCatalog {
    commutators: BTreeMap<OperatorId, OperatorId>,
    lossy: BTreeSet<(OperatorId, OpClassId)>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `a` and `b` as each other's commutator (`a == b` for
    /// symmetric operators such as equality).
    pub fn add_commutator_pair(&mut self, a: OperatorId, b: OperatorId) {
        self.commutators.insert(a, b);
        self.commutators.insert(b, a);
    }

    pub fn with_commutator_pair(mut self, a: OperatorId, b: OperatorId) -> Self {
        self.add_commutator_pair(a, b);
        self
    }

    pub fn mark_lossy(&mut self, opno: OperatorId, opclass: OpClassId) {
        self.lossy.insert((opno, opclass));
    }

    pub fn with_lossy(mut self, opno: OperatorId, opclass: OpClassId) -> Self {
        self.mark_lossy(opno, opclass);
        self
    }
}

impl Catalog for MemoryCatalog {
    fn op_requires_recheck(&self, opno: OperatorId, opclass: OpClassId) -> bool {
        self.lossy.contains(&(opno, opclass))
    }

    fn commutator(&self, opno: OperatorId) -> Option<OperatorId> {
        self.commutators.get(&opno).copied()
    }
}
