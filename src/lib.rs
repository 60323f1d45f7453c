//! Shape and data type validation for array-like data science objects.
//!
//! The [`check`] module holds the matching engine: shape patterns with fixed sizes, ranges,
//! wildcards and named dimension variables, data type requirements over hierarchical and
//! exact-match type systems, and the [`ErrorFinder`](check::finder::ErrorFinder) protocol
//! that ties them together. The [`adapter`] module provides ready-made finders for arrays,
//! tensors, series and data frames.

pub mod adapter;
pub mod check;

pub use ds_validator_derive::ErrorFinder;
