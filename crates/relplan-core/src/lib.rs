#![forbid(unsafe_code)]
//! relplan-core: data model shared by the path-to-plan translator.
//!
//! - `path`: strategy trees chosen by the cost-based search (input).
//! - `plan`: executable trees handed to the executor (output).
//! - `expr`: qualification and target-list expressions used by both.
//! - `catalog`: the two read-only lookups translation depends on.
//!
//! No translation logic lives here; see `relplan-planner`.

pub mod catalog;
pub mod config;
pub mod error;
pub mod expr;
pub mod hash;
pub mod id;
pub mod path;
pub mod plan;
pub mod prelude;

pub use error::{Error, Result};
