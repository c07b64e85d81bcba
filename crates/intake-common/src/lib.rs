//! Shared utilities for the intake checker crates.
//!
//! This crate provides the Polars `AnyValue` helpers used by every crate that
//! reads cells out of a submission table.

pub mod polars;

pub use polars::{
    any_to_f64, any_to_i64, any_to_string, format_numeric, is_missing_value, parse_trimmed,
};
