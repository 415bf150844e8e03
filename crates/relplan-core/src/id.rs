//! Strongly-typed identifiers used across the data model.
//!
//! Downstream code should *not* pass raw integers around for catalog objects
//! or range-table positions.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! new_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(v: u32) -> Self {
                Self(v)
            }
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

// Range-table index of a base relation (1-based).
new_id!(RelId);
new_id!(OperatorId);
new_id!(OpClassId);
new_id!(IndexId);
new_id!(FuncId);
new_id!(TypeId);
new_id!(PlanId);

/// 1-based attribute position within a relation, index, or target list.
pub type AttrNumber = i32;
