//! Finders for dataframes: labelled two-dimensional tables of named series.

use std::{borrow::Cow, collections::BTreeSet, fmt};

use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    index::{Indexed, Label, label_set},
    series::SeriesLike,
};
use crate::{
    ErrorFinder,
    check::{
        dtype::{Typed, TypeSpec, match_dtype},
        error::SpecError,
        finder::{self, ErrorList},
        shape::{IntoShapeSpec, ShapeMatcher, Shaped},
    },
};

/// A table of rows and named columns.
pub trait FrameLike: Shaped + Indexed {
    type Column: SeriesLike;

    /// Column labels in table order.
    fn columns(&self) -> Cow<'_, [Label]>;
    fn column(&self, label: &Label) -> Option<&Self::Column>;
}

/// Checks the shape of a dataframe as `(rows, columns)`.
/// The shape spec must have exactly two dimensions.
#[derive(Debug, Clone, PartialEq, Eq, ErrorFinder)]
#[error_finder(crate = "crate", name = "pandas_dataframe_shape_error")]
pub struct FrameShape(ShapeMatcher);

impl FrameShape {
    #[inline]
    pub fn new(spec: impl IntoShapeSpec) -> Result<Self, SpecError> {
        ShapeMatcher::new(spec)?.require_rank("dataframes", 2).map(Self)
    }
}

/// What to do with columns that no requirement names.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OtherColumns {
    /// Unnamed columns are an error.
    #[default]
    Forbid,
    /// Unnamed columns are allowed, and their type must satisfy the spec.
    Allow(TypeSpec),
}

impl OtherColumns {
    /// Reports extra columns (when forbidden) and then missing required columns.
    fn layout_errors<'a>(
        &self,
        present: &[Label],
        required: impl IntoIterator<Item = &'a Label>,
    ) -> ErrorList {
        let required = required.into_iter().collect_vec();
        let mut errors = ErrorList::new();

        if let OtherColumns::Forbid = self {
            let extra = present
                .iter()
                .filter(|label| !required.contains(label))
                .collect_vec();
            if !extra.is_empty() {
                let extra = label_set(extra);
                errors.push(format!("Extra column(s) found: {extra}."));
            }
        }

        let present: BTreeSet<&Label> = present.iter().collect();
        let missing = required
            .into_iter()
            .filter(|label| !present.contains(label))
            .collect_vec();
        if !missing.is_empty() {
            let missing = label_set(missing);
            errors.push(format!("Required column(s) don't exist: {missing}."));
        }

        errors
    }

    /// The spec an unnamed column is checked against, if any.
    fn spec(&self) -> Option<&TypeSpec> {
        match self {
            OtherColumns::Allow(spec) if !spec.is_any() => Some(spec),
            _ => None,
        }
    }
}

fn unique_columns<L: Into<Label>, T>(
    columns: impl IntoIterator<Item = (L, T)>,
) -> Result<Vec<(Label, T)>, SpecError> {
    let mut seen = BTreeSet::new();
    columns
        .into_iter()
        .map(|(label, value)| {
            let label = label.into();
            match seen.insert(label.clone()) {
                true => Ok((label, value)),
                false => Err(SpecError::DuplicateColumn(label.to_string())),
            }
        })
        .collect()
}

fn prefixed(label: &Label, errors: ErrorList) -> impl Iterator<Item = String> + '_ {
    errors
        .into_iter()
        .map(move |error| format!("Column `{label}`: {error}"))
}

/// Checks the data type of each column.
///
/// Errors come in this order: extra columns when [`OtherColumns::Forbid`], missing required
/// columns, then one error per mismatching column in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "FrameDtypeRepr")
)]
pub struct FrameDtype {
    columns: Vec<(Label, TypeSpec)>,
    other: OtherColumns,
}

/// Unchecked form of [`FrameDtype`], validated through [`FrameDtype::new`] on load.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct FrameDtypeRepr {
    columns: Vec<(Label, TypeSpec)>,
    #[serde(default)]
    other: OtherColumns,
}

#[cfg(feature = "serde")]
impl TryFrom<FrameDtypeRepr> for FrameDtype {
    type Error = SpecError;

    #[inline]
    fn try_from(value: FrameDtypeRepr) -> Result<Self, Self::Error> {
        let FrameDtypeRepr { columns, other } = value;
        Self::new(columns).map(|frame| frame.other_columns(other))
    }
}

impl FrameDtype {
    /// Requires each listed column with its type spec. A label listed twice is an error.
    pub fn new<L, S>(columns: impl IntoIterator<Item = (L, S)>) -> Result<Self, SpecError>
    where
        L: Into<Label>,
        S: Into<TypeSpec>,
    {
        let columns = columns
            .into_iter()
            .map(|(label, spec)| (label, spec.into()));
        let columns = unique_columns(columns)?;
        let other = OtherColumns::default();
        Ok(Self { columns, other })
    }

    #[inline]
    pub fn other_columns(mut self, other: OtherColumns) -> Self {
        self.other = other;
        self
    }

    fn spec(&self, label: &Label) -> Option<&TypeSpec> {
        self.columns
            .iter()
            .find(|(required, _)| required == label)
            .map(|(_, spec)| spec)
            .or_else(|| self.other.spec())
    }
}

impl<F: FrameLike + ?Sized> finder::ErrorFinder<F> for FrameDtype {
    #[inline]
    fn name(&self) -> &str {
        "pandas_dataframe_dtype_error"
    }

    fn find(&self, data: &F) -> ErrorList {
        let present = data.columns();
        let mut errors = self
            .other
            .layout_errors(&present, self.columns.iter().map(|(label, _)| label));

        for label in present.iter() {
            let (Some(spec), Some(column)) = (self.spec(label), data.column(label)) else {
                continue;
            };
            let found = match_dtype(&column.dtype(), spec);
            errors.extend(prefixed(label, found));
        }
        errors
    }
}

/// Runs a series finder on each named column.
///
/// Missing and extra columns follow the same rules as [`FrameDtype`]. Errors of each column
/// finder are prefixed with the column label, in table order.
pub struct FrameSeries<F: FrameLike + ?Sized> {
    columns: Vec<(Label, Box<dyn finder::ErrorFinder<F::Column>>)>,
    other: OtherColumns,
}

impl<F: FrameLike + ?Sized> Clone for FrameSeries<F> {
    #[inline]
    fn clone(&self) -> Self {
        let columns = self.columns.clone();
        let other = self.other.clone();
        Self { columns, other }
    }
}

impl<F: FrameLike + ?Sized> fmt::Debug for FrameSeries<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSeries")
            .field("columns", &self.columns)
            .field("other", &self.other)
            .finish()
    }
}

impl<F: FrameLike + ?Sized> FrameSeries<F> {
    /// Checks each listed column with its finder. A label listed twice is an error.
    pub fn new<L: Into<Label>>(
        columns: impl IntoIterator<Item = (L, Box<dyn finder::ErrorFinder<F::Column>>)>,
    ) -> Result<Self, SpecError> {
        let columns = unique_columns(columns)?;
        let other = OtherColumns::default();
        Ok(Self { columns, other })
    }

    #[inline]
    pub fn other_columns(mut self, other: OtherColumns) -> Self {
        self.other = other;
        self
    }
}

impl<F: FrameLike + ?Sized> finder::ErrorFinder<F> for FrameSeries<F> {
    #[inline]
    fn name(&self) -> &str {
        "pandas_df_series_error"
    }

    fn find(&self, data: &F) -> ErrorList {
        let present = data.columns();
        let mut errors = self
            .other
            .layout_errors(&present, self.columns.iter().map(|(label, _)| label));

        for label in present.iter() {
            let Some(column) = data.column(label) else {
                continue;
            };
            let found = match self.columns.iter().find(|(required, _)| required == label) {
                Some((_, check)) => finder::ErrorFinder::find(check, column),
                None => match self.other.spec() {
                    Some(spec) => match_dtype(&column.dtype(), spec),
                    None => continue,
                },
            };
            errors.extend(prefixed(label, found));
        }
        errors
    }
}
