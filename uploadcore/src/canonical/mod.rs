//! Value canonicalization.
//!
//! This module provides:
//! - Per-type coercion of raw JSON values (`canonicalize`)
//! - Exact numeric helpers
//! - ISO-8601 date, time, duration and timestamp parsing

mod canonicalize;
pub mod numbers;
mod result;
pub mod temporal;

pub use canonicalize::{canonicalize, to_string_value, value_as_text};
pub use result::CanonicalizationResult;
