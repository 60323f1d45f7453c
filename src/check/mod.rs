//! The `check` module decides whether a concrete object satisfies declarative criteria.
//!
//! ## Key Components
//! 1. **Shape Matching**:
//!    - Shape patterns (`ShapeSpec`) built from fixed sizes, inclusive ranges, wildcards and
//!      named dimension variables.
//!    - Variables bind on first occurrence and are compared on every later one.
//!
//! 2. **Data Type Matching**:
//!    - Data types (`DType`) tagged by their origin type system.
//!    - Hierarchy-aware matching for numpy types, exact matching for arrow and torch types.
//!
//! 3. **Error Finders**:
//!    - The `ErrorFinder` protocol: a named check producing an `ErrorList`.
//!    - `Bundle` runs several finders and reports all of their errors together.
//!    - `Checker` turns a non-empty list into a `ValidationError`, a warning, or nothing.
//!
//! Malformed criteria are rejected at construction time with a [`SpecError`](error::SpecError).
//! Data mismatches never raise; they are reported as entries of an `ErrorList`.

pub mod bundle;
pub mod checker;
pub mod dtype;
pub mod error;
pub mod finder;
pub mod shape;
