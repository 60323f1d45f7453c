//! Finders for labelled one-dimensional series.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::index::{Indexed, Label};
use crate::{
    ErrorFinder,
    check::{
        dtype::{DtypeMatcher, Typed, TypeSpec},
        error::SpecError,
        finder::{self, ErrorList},
        shape::{IntoShapeSpec, ShapeMatcher, Shaped},
    },
};

/// A one-dimensional labelled column of values.
pub trait SeriesLike: Shaped + Typed + Indexed {
    /// The series name, if it has one.
    fn name(&self) -> Option<Label>;
}

/// Checks the length of a series. The shape spec must have exactly one dimension.
#[derive(Debug, Clone, PartialEq, Eq, ErrorFinder)]
#[error_finder(crate = "crate", name = "pandas_series_shape_error")]
pub struct SeriesShape(ShapeMatcher);

impl SeriesShape {
    #[inline]
    pub fn new(spec: impl IntoShapeSpec) -> Result<Self, SpecError> {
        ShapeMatcher::new(spec)?.require_rank("series", 1).map(Self)
    }
}

/// Checks the data type of a series. Numpy types match through the hierarchy while
/// arrow types only match exactly. [`TypeSpec::Any`] always passes.
#[derive(Debug, Clone, PartialEq, Eq, ErrorFinder)]
#[error_finder(crate = "crate", name = "pandas_series_data_error")]
pub struct SeriesDtype(DtypeMatcher);

impl SeriesDtype {
    #[inline]
    pub fn new(spec: impl Into<TypeSpec>) -> Self {
        Self(DtypeMatcher::new(spec))
    }
}

/// Checks the name of a series. `None` requires an unnamed series.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeriesName {
    name: Option<Label>,
}

impl SeriesName {
    #[inline]
    pub fn new<L: Into<Label>>(name: Option<L>) -> Self {
        let name = name.map(Into::into);
        Self { name }
    }
}

fn display_name(name: &Option<Label>) -> String {
    match name {
        Some(name) => name.to_string(),
        None => "None".into(),
    }
}

impl<T: SeriesLike + ?Sized> finder::ErrorFinder<T> for SeriesName {
    #[inline]
    fn name(&self) -> &str {
        "pandas_series_name_error"
    }

    fn find(&self, data: &T) -> ErrorList {
        let found = SeriesLike::name(data);
        if found == self.name {
            return ErrorList::new();
        }
        let found = display_name(&found);
        let name = display_name(&self.name);
        format!("Series name `{found}` does not match: `{name}`.").into()
    }
}
