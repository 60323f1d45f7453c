//! Ready-made error finders for common array-like objects.
//!
//! Each library plugs in through a small trait reporting what the checks need:
//! a shape ([`Shaped`](crate::check::shape::Shaped)), an element type
//! ([`Typed`](crate::check::dtype::Typed)), and where relevant index labels, a series name,
//! columns or a device. The [`info`] descriptors implement these traits for metadata
//! obtained elsewhere.

pub mod array;
pub mod frame;
pub mod index;
pub mod info;
pub mod series;
pub mod tensor;
