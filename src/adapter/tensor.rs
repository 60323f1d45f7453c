//! Finders for tensors with torch-style data types and devices.

use std::{fmt, str::FromStr};

use derive_more::Display;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    ErrorFinder,
    check::{
        dtype::{DtypeMatcher, Typed, TypeSpec},
        error::SpecError,
        finder::{self, ErrorList},
        shape::{IntoShapeSpec, ShapeMatcher, Shaped},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceKind {
    #[display("cpu")]
    Cpu,
    #[display("cuda")]
    Cuda,
    #[display("mps")]
    Mps,
    #[display("xpu")]
    Xpu,
    #[display("meta")]
    Meta,
}

impl FromStr for DeviceKind {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda),
            "mps" => Ok(Self::Mps),
            "xpu" => Ok(Self::Xpu),
            "meta" => Ok(Self::Meta),
            _ => Err(SpecError::Device(s.to_string())),
        }
    }
}

/// A compute device: a kind and an optional ordinal, written like `cuda:1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Device {
    pub kind: DeviceKind,
    pub index: Option<u32>,
}

impl Device {
    #[inline]
    pub fn new(kind: DeviceKind, index: Option<u32>) -> Self {
        Self { kind, index }
    }
}

impl From<DeviceKind> for Device {
    #[inline]
    fn from(kind: DeviceKind) -> Self {
        Self { kind, index: None }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}:{index}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl FromStr for Device {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((kind, index)) => {
                let kind = kind.parse()?;
                let index = index
                    .parse()
                    .map_err(|_| SpecError::Device(s.to_string()))?;
                Ok(Self::new(kind, Some(index)))
            }
            None => s.parse().map(|kind: DeviceKind| kind.into()),
        }
    }
}

/// A tensor.
pub trait TensorLike: Shaped + Typed {
    fn device(&self) -> Device;
}

/// Checks the shape of a tensor. See [`ArrayShape`](super::array::ArrayShape) for the spec.
#[derive(Debug, Clone, PartialEq, Eq, ErrorFinder)]
#[error_finder(crate = "crate", name = "tensor_shape_error")]
pub struct TensorShape(ShapeMatcher);

impl TensorShape {
    #[inline]
    pub fn new(spec: impl IntoShapeSpec) -> Result<Self, SpecError> {
        ShapeMatcher::new(spec).map(Self)
    }
}

/// Checks the data type of a tensor. Torch types only match exactly.
/// [`TypeSpec::Any`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, ErrorFinder)]
#[error_finder(crate = "crate", name = "tensor_dtype_error")]
pub struct TensorDtype(DtypeMatcher);

impl TensorDtype {
    #[inline]
    pub fn new(spec: impl Into<TypeSpec>) -> Result<Self, SpecError> {
        DtypeMatcher::required(spec, "tensors").map(Self)
    }
}

/// Checks that a tensor lives on a device of the required kind,
/// and on the same ordinal if `match_index` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TensorDevice {
    device: Device,
    match_index: bool,
}

impl TensorDevice {
    #[inline]
    pub fn new(device: impl Into<Device>) -> Self {
        let device = device.into();
        Self {
            device,
            match_index: false,
        }
    }

    #[inline]
    pub fn match_index(mut self, match_index: bool) -> Self {
        self.match_index = match_index;
        self
    }
}

impl<T: TensorLike + ?Sized> finder::ErrorFinder<T> for TensorDevice {
    #[inline]
    fn name(&self) -> &str {
        "tensor_device_error"
    }

    fn find(&self, data: &T) -> ErrorList {
        let found = data.device();
        let mut errors = ErrorList::new();
        if found.kind != self.device.kind {
            errors.push(format!(
                "Tensor device ({}) does not match required device type: {}.",
                found.kind, self.device.kind
            ));
        }
        if self.match_index && found.index != self.device.index {
            errors.push(format!(
                "Tensor device `{found}` does not match required device index: `{}`.",
                self.device
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::{Device, DeviceKind, TensorDevice, TensorDtype, TensorShape};
    use crate::{
        adapter::info::TensorInfo,
        check::{
            dtype::{NumpyType, TorchType, TypeSpec},
            error::SpecError,
            finder::ErrorFinder,
        },
    };

    #[test]
    fn test_parse_device() -> Result<(), SpecError> {
        assert_eq!(
            "cuda:1".parse::<Device>()?,
            Device::new(DeviceKind::Cuda, Some(1))
        );
        assert_eq!("cpu".parse::<Device>()?, DeviceKind::Cpu.into());
        assert_eq!("mps:0".parse::<Device>()?.to_string(), "mps:0");
        assert!("tpu".parse::<Device>().is_err());
        assert!("cuda:x".parse::<Device>().is_err());
        Ok(())
    }

    #[test]
    fn test_tensor_shape_dtype() -> Result<(), SpecError> {
        let tensor = TensorInfo::new([8, 3, 224, 224], TorchType::Float16, DeviceKind::Cpu);

        let finder = TensorShape::new(("batch", 3, "side", "side"))?;
        assert!(finder.find(&tensor).is_valid());

        let finder = TensorDtype::new(TypeSpec::one_of([TorchType::Float16, TorchType::Float32])?)?;
        assert!(finder.find(&tensor).is_valid());

        let finder = TensorDtype::new(TorchType::BFloat16)?;
        let errors = finder.find(&tensor);
        assert_eq!(
            errors.to_vec(),
            vec![
                "Data type `torch.float16` is not compatible with any of the required types: {torch.bfloat16}."
                    .to_string()
            ]
        );

        // torch types never match through the numpy hierarchy
        let finder = TensorDtype::new(NumpyType::Floating)?;
        assert_eq!(finder.find(&tensor).len(), 1);

        assert!(TensorDtype::new(TypeSpec::Any).is_err());
        Ok(())
    }

    #[test]
    fn test_tensor_device() -> Result<(), SpecError> {
        let tensor = TensorInfo::new([2], TorchType::Int64, "cuda:0".parse::<Device>()?);

        let finder = TensorDevice::new("cuda:1".parse::<Device>()?);
        assert!(finder.find(&tensor).is_valid());

        let finder = finder.match_index(true);
        let errors = finder.find(&tensor);
        assert_eq!(
            errors.to_vec(),
            vec![
                "Tensor device `cuda:0` does not match required device index: `cuda:1`."
                    .to_string()
            ]
        );

        let finder = TensorDevice::new("cpu".parse::<Device>()?).match_index(true);
        let errors = finder.find(&tensor);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            "Tensor device (cuda) does not match required device type: cpu."
        );
        Ok(())
    }
}
