//! Finders for n-dimensional arrays with numpy-style data types.

use crate::{
    ErrorFinder,
    check::{
        dtype::{DtypeMatcher, Typed, TypeSpec},
        error::SpecError,
        shape::{IntoShapeSpec, ShapeMatcher, Shaped},
    },
};

/// An n-dimensional array.
pub trait ArrayLike: Shaped + Typed {}

impl<T: Shaped + Typed + ?Sized> ArrayLike for T {}

/// Checks the shape of an array.
///
/// The spec has one entry per dimension: a fixed size, an inclusive range, a variable name
/// whose every occurrence must have the same size, or `..` for any size.
/// `(3, 1..=10, "x", "x", ..)` requires five dimensions where dimension 0 is 3,
/// dimension 1 lies between 1 and 10, and dimensions 2 and 3 are equal.
#[derive(Debug, Clone, PartialEq, Eq, ErrorFinder)]
#[error_finder(crate = "crate", name = "numpy_shape_error")]
pub struct ArrayShape(ShapeMatcher);

impl ArrayShape {
    #[inline]
    pub fn new(spec: impl IntoShapeSpec) -> Result<Self, SpecError> {
        ShapeMatcher::new(spec).map(Self)
    }
}

/// Checks the data type of an array.
///
/// An array passes if its type is, or lies below, any of the required types in the numpy
/// hierarchy, so requiring [`NumpyType::Integer`](crate::check::dtype::NumpyType::Integer)
/// accepts every signed and unsigned integer type. [`TypeSpec::Any`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, ErrorFinder)]
#[error_finder(crate = "crate", name = "numpy_type_error")]
pub struct ArrayDtype(DtypeMatcher);

impl ArrayDtype {
    #[inline]
    pub fn new(spec: impl Into<TypeSpec>) -> Result<Self, SpecError> {
        DtypeMatcher::required(spec, "arrays").map(Self)
    }
}
