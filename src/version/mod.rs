//! Validation, comparison and extraction of display-version strings
//!
//! Versions here are the free-form strings vendors print on web pages and
//! write into installer metadata, not semver: an ordered sequence of 2-4
//! integer segments, compared numerically after right-padding the shorter
//! side with zero segments ("1.2" and "1.2.0" are equal).
//!
//! # Modules
//!
//! - [`model`]: Validation modes, comparison and normalization
//! - [`extract`]: Lifting version substrings out of arbitrary noisy text
//! - [`error`]: Error types for invalid inputs and bad segment bounds

pub mod error;
pub mod extract;
pub mod model;
