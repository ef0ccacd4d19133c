#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared utilities for the Strata compiler and CLI.
//!
//! - `utils`: identifier case conversion and module-name derivation
//! - `colors`: ANSI palette for terminal dumps

pub mod colors;
pub mod utils;


pub use colors::Colors;
