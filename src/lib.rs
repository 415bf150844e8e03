#![forbid(unsafe_code)]
//! relplan: translates the strategy tree chosen by a cost-based optimizer
//! into an executable plan tree.
//!
//! Re-exports the data model (`relplan_core`) and the translator
//! (`relplan_planner`), plus the handful of names most callers need.

pub use relplan_core;
pub use relplan_planner;

pub use relplan_core::prelude::*;
pub use relplan_planner::{CostModel, ExplainOutput, Planner};
