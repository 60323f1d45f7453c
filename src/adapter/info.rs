//! Plain metadata descriptors for arrays, tensors, series and dataframes.
//!
//! Finders only read shapes, types, labels and devices, so these descriptors can stand in for
//! the real objects, e.g. when validating metadata that was serialized elsewhere.

use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    frame::FrameLike,
    index::{Indexed, Label},
    series::SeriesLike,
    tensor::{Device, TensorLike},
};
use crate::check::{
    dtype::{DType, Typed},
    shape::Shaped,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArrayInfo {
    pub shape: Vec<usize>,
    pub dtype: DType,
}

impl ArrayInfo {
    pub fn new(shape: impl IntoIterator<Item = usize>, dtype: impl Into<DType>) -> Self {
        let shape = shape.into_iter().collect();
        let dtype = dtype.into();
        Self { shape, dtype }
    }
}

impl Shaped for ArrayInfo {
    #[inline]
    fn shape(&self) -> Cow<'_, [usize]> {
        Cow::Borrowed(&self.shape)
    }
}

impl Typed for ArrayInfo {
    #[inline]
    fn dtype(&self) -> DType {
        self.dtype.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TensorInfo {
    pub shape: Vec<usize>,
    pub dtype: DType,
    pub device: Device,
}

impl TensorInfo {
    pub fn new(
        shape: impl IntoIterator<Item = usize>,
        dtype: impl Into<DType>,
        device: impl Into<Device>,
    ) -> Self {
        let shape = shape.into_iter().collect();
        let dtype = dtype.into();
        let device = device.into();
        Self {
            shape,
            dtype,
            device,
        }
    }
}

impl Shaped for TensorInfo {
    #[inline]
    fn shape(&self) -> Cow<'_, [usize]> {
        Cow::Borrowed(&self.shape)
    }
}

impl Typed for TensorInfo {
    #[inline]
    fn dtype(&self) -> DType {
        self.dtype.clone()
    }
}

impl TensorLike for TensorInfo {
    #[inline]
    fn device(&self) -> Device {
        self.device
    }
}

/// A series: an optional name, an element type and one label per row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeriesInfo {
    pub name: Option<Label>,
    pub dtype: DType,
    pub index: Vec<Label>,
}

impl SeriesInfo {
    /// An unnamed, empty series.
    pub fn new(dtype: impl Into<DType>) -> Self {
        let dtype = dtype.into();
        Self {
            name: None,
            dtype,
            index: vec![],
        }
    }

    #[inline]
    pub fn with_name(mut self, name: impl Into<Label>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_index<L: Into<Label>>(mut self, index: impl IntoIterator<Item = L>) -> Self {
        self.index = index.into_iter().map(Into::into).collect();
        self
    }

    /// Uses `0..len` as the index.
    #[inline]
    pub fn with_len(self, len: usize) -> Self {
        self.with_index((0..len as i64).map(Label::Int))
    }
}

impl Shaped for SeriesInfo {
    #[inline]
    fn shape(&self) -> Cow<'_, [usize]> {
        Cow::Owned(vec![self.index.len()])
    }
}

impl Typed for SeriesInfo {
    #[inline]
    fn dtype(&self) -> DType {
        self.dtype.clone()
    }
}

impl Indexed for SeriesInfo {
    #[inline]
    fn index(&self) -> Cow<'_, [Label]> {
        Cow::Borrowed(&self.index)
    }
}

impl SeriesLike for SeriesInfo {
    #[inline]
    fn name(&self) -> Option<Label> {
        self.name.clone()
    }
}

/// A dataframe: a row index shared by named columns.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameInfo {
    pub index: Vec<Label>,
    pub columns: Vec<SeriesInfo>,
}

impl FrameInfo {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row index of the frame and of every column.
    pub fn with_index<L: Into<Label>>(mut self, index: impl IntoIterator<Item = L>) -> Self {
        self.index = index.into_iter().map(Into::into).collect();
        for column in &mut self.columns {
            column.index.clone_from(&self.index);
        }
        self
    }

    /// Uses `0..len` as the row index.
    #[inline]
    pub fn with_len(self, len: usize) -> Self {
        self.with_index((0..len as i64).map(Label::Int))
    }

    /// Appends a column sharing the frame's index.
    pub fn with_column(mut self, label: impl Into<Label>, dtype: impl Into<DType>) -> Self {
        let column = SeriesInfo {
            name: Some(label.into()),
            dtype: dtype.into(),
            index: self.index.clone(),
        };
        self.columns.push(column);
        self
    }
}

impl Shaped for FrameInfo {
    #[inline]
    fn shape(&self) -> Cow<'_, [usize]> {
        Cow::Owned(vec![self.index.len(), self.columns.len()])
    }
}

impl Indexed for FrameInfo {
    #[inline]
    fn index(&self) -> Cow<'_, [Label]> {
        Cow::Borrowed(&self.index)
    }
}

fn column_label(position: usize, column: &SeriesInfo) -> Label {
    match &column.name {
        Some(name) => name.clone(),
        None => Label::Int(position as i64),
    }
}

impl FrameLike for FrameInfo {
    type Column = SeriesInfo;

    /// An unnamed column is labelled by its position, so every column counted by the shape
    /// is listed.
    fn columns(&self) -> Cow<'_, [Label]> {
        self.columns
            .iter()
            .enumerate()
            .map(|(position, column)| column_label(position, column))
            .collect()
    }

    fn column(&self, label: &Label) -> Option<&SeriesInfo> {
        self.columns
            .iter()
            .enumerate()
            .find(|(position, column)| &column_label(*position, column) == label)
            .map(|(_, column)| column)
    }
}
