use std::{fmt, sync::Arc};

use derive_more::{Deref, Display, From};
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    error::SpecError,
    finder::{ErrorFinder, ErrorList},
};

/// Numpy scalar types, including the abstract kinds of the numpy type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NumpyType {
    #[display("generic")]
    Generic,
    #[display("number")]
    Number,
    #[display("integer")]
    Integer,
    #[display("signedinteger")]
    SignedInteger,
    #[display("unsignedinteger")]
    UnsignedInteger,
    #[display("inexact")]
    Inexact,
    #[display("floating")]
    Floating,
    #[display("complexfloating")]
    ComplexFloating,
    #[display("flexible")]
    Flexible,
    #[display("character")]
    Character,
    #[display("bool")]
    Bool,
    #[display("int8")]
    Int8,
    #[display("int16")]
    Int16,
    #[display("int32")]
    Int32,
    #[display("int64")]
    Int64,
    #[display("uint8")]
    UInt8,
    #[display("uint16")]
    UInt16,
    #[display("uint32")]
    UInt32,
    #[display("uint64")]
    UInt64,
    #[display("float16")]
    Float16,
    #[display("float32")]
    Float32,
    #[display("float64")]
    Float64,
    #[display("complex64")]
    Complex64,
    #[display("complex128")]
    Complex128,
    #[display("bytes")]
    Bytes,
    #[display("str")]
    Str,
    #[display("void")]
    Void,
    #[display("object")]
    Object,
    #[display("datetime64")]
    Datetime64,
    #[display("timedelta64")]
    Timedelta64,
}

impl NumpyType {
    /// Returns the direct supertype in the numpy hierarchy. Only [`NumpyType::Generic`] has none.
    pub const fn parent(self) -> Option<Self> {
        use NumpyType::*;
        match self {
            Generic => None,
            Number | Bool | Flexible | Object | Datetime64 => Some(Generic),
            Integer | Inexact => Some(Number),
            SignedInteger | UnsignedInteger => Some(Integer),
            Int8 | Int16 | Int32 | Int64 | Timedelta64 => Some(SignedInteger),
            UInt8 | UInt16 | UInt32 | UInt64 => Some(UnsignedInteger),
            Floating | ComplexFloating => Some(Inexact),
            Float16 | Float32 | Float64 => Some(Floating),
            Complex64 | Complex128 => Some(ComplexFloating),
            Character | Void => Some(Flexible),
            Bytes | Str => Some(Character),
        }
    }

    /// Returns `true` for kinds that only group other types, like [`NumpyType::Integer`].
    pub const fn is_abstract(self) -> bool {
        use NumpyType::*;
        matches!(
            self,
            Generic
                | Number
                | Integer
                | SignedInteger
                | UnsignedInteger
                | Inexact
                | Floating
                | ComplexFloating
                | Flexible
                | Character
        )
    }

    /// Returns `true` if `self` equals `other` or lies below it in the hierarchy.
    pub fn is_subtype_of(self, other: Self) -> bool {
        std::iter::successors(Some(self), |ty| ty.parent()).contains(&other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeUnit {
    #[display("s")]
    Second,
    #[display("ms")]
    Millisecond,
    #[display("us")]
    Microsecond,
    #[display("ns")]
    Nanosecond,
}

/// Arrow logical types. These carry no hierarchy and only match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArrowType {
    Null,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float16,
    Float32,
    Float64,
    Utf8,
    LargeUtf8,
    Binary,
    LargeBinary,
    Date32,
    Date64,
    Timestamp(TimeUnit, Option<Arc<str>>),
    Duration(TimeUnit),
    Decimal128 { precision: u8, scale: i8 },
}

impl fmt::Display for ArrowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[pyarrow]", self.logical())
    }
}

impl ArrowType {
    fn logical(&self) -> String {
        match self {
            ArrowType::Null => "null".into(),
            ArrowType::Bool => "bool".into(),
            ArrowType::Int8 => "int8".into(),
            ArrowType::Int16 => "int16".into(),
            ArrowType::Int32 => "int32".into(),
            ArrowType::Int64 => "int64".into(),
            ArrowType::UInt8 => "uint8".into(),
            ArrowType::UInt16 => "uint16".into(),
            ArrowType::UInt32 => "uint32".into(),
            ArrowType::UInt64 => "uint64".into(),
            ArrowType::Float16 => "halffloat".into(),
            ArrowType::Float32 => "float".into(),
            ArrowType::Float64 => "double".into(),
            ArrowType::Utf8 => "string".into(),
            ArrowType::LargeUtf8 => "large_string".into(),
            ArrowType::Binary => "binary".into(),
            ArrowType::LargeBinary => "large_binary".into(),
            ArrowType::Date32 => "date32[day]".into(),
            ArrowType::Date64 => "date64[ms]".into(),
            ArrowType::Timestamp(unit, None) => format!("timestamp[{unit}]"),
            ArrowType::Timestamp(unit, Some(tz)) => format!("timestamp[{unit}, tz={tz}]"),
            ArrowType::Duration(unit) => format!("duration[{unit}]"),
            ArrowType::Decimal128 { precision, scale } => {
                format!("decimal128({precision}, {scale})")
            }
        }
    }
}

/// Torch tensor element types. These only match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TorchType {
    #[display("torch.bool")]
    Bool,
    #[display("torch.uint8")]
    UInt8,
    #[display("torch.int8")]
    Int8,
    #[display("torch.int16")]
    Int16,
    #[display("torch.int32")]
    Int32,
    #[display("torch.int64")]
    Int64,
    #[display("torch.float16")]
    Float16,
    #[display("torch.bfloat16")]
    BFloat16,
    #[display("torch.float32")]
    Float32,
    #[display("torch.float64")]
    Float64,
    #[display("torch.complex64")]
    Complex64,
    #[display("torch.complex128")]
    Complex128,
}

/// The type system a data type identifier comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Types form an "is-a" hierarchy; a type satisfies any of its supertypes.
    Hierarchy,
    /// Types are opaque; a type only satisfies itself.
    Exact,
}

impl Origin {
    /// The matching strategy of this type system.
    #[inline]
    pub fn strategy(self) -> fn(&DType, &DType) -> bool {
        match self {
            Origin::Hierarchy => hierarchy_match,
            Origin::Exact => exact_match,
        }
    }
}

fn hierarchy_match(found: &DType, required: &DType) -> bool {
    match (found, required) {
        (DType::Numpy(found), DType::Numpy(required)) => found.is_subtype_of(*required),
        _ => exact_match(found, required),
    }
}

#[inline]
fn exact_match(found: &DType, required: &DType) -> bool {
    found == required
}

/// An element type identifier, tagged with the type system it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DType {
    #[display("{_0}")]
    Numpy(NumpyType),
    #[display("{_0}")]
    Arrow(ArrowType),
    #[display("{_0}")]
    Torch(TorchType),
}

impl DType {
    #[inline]
    pub fn origin(&self) -> Origin {
        match self {
            DType::Numpy(_) => Origin::Hierarchy,
            DType::Arrow(_) | DType::Torch(_) => Origin::Exact,
        }
    }

    /// Returns `true` if `self` satisfies `required`.
    ///
    /// Hierarchy matching only applies when both types come from a hierarchical type system;
    /// if either side is exact-match, the types must be equal.
    pub fn satisfies(&self, required: &DType) -> bool {
        let origin = match (self.origin(), required.origin()) {
            (Origin::Hierarchy, Origin::Hierarchy) => Origin::Hierarchy,
            _ => Origin::Exact,
        };
        origin.strategy()(self, required)
    }
}

/// A non-empty set of acceptable data types, in declaration order without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<DType>", into = "Vec<DType>")
)]
pub struct TypeSet(Arc<[DType]>);

impl TypeSet {
    pub fn new<T: Into<DType>>(types: impl IntoIterator<Item = T>) -> Result<Self, SpecError> {
        let types: Arc<[DType]> = types.into_iter().map(Into::into).unique().collect();
        if types.is_empty() {
            return Err(SpecError::EmptyTypeSet);
        }
        Ok(Self(types))
    }

    /// Returns `true` if `found` satisfies at least one member.
    #[inline]
    pub fn accepts(&self, found: &DType) -> bool {
        self.0.iter().any(|required| found.satisfies(required))
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0.iter().format(", "))
    }
}

macro_rules! impl_type_spec_from {
    ($($t:ty),+) => {
        $(
            impl From<$t> for TypeSet {
                #[inline]
                fn from(value: $t) -> Self {
                    Self([DType::from(value)].into())
                }
            }

            impl From<$t> for TypeSpec {
                #[inline]
                fn from(value: $t) -> Self {
                    Self::OneOf(value.into())
                }
            }
        )+
    };
}

impl_type_spec_from!(DType, NumpyType, ArrowType, TorchType);

impl TryFrom<Vec<DType>> for TypeSet {
    type Error = SpecError;

    #[inline]
    fn try_from(value: Vec<DType>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TypeSet> for Vec<DType> {
    #[inline]
    fn from(value: TypeSet) -> Self {
        value.0.to_vec()
    }
}

/// Requirement on the element type of an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeSpec {
    /// Any type passes.
    #[display("any")]
    Any,
    /// The type must satisfy at least one member of the set.
    #[display("{_0}")]
    OneOf(TypeSet),
}

impl TypeSpec {
    /// Builds a spec accepting any of `types`. Fails if `types` is empty.
    #[inline]
    pub fn one_of<T: Into<DType>>(types: impl IntoIterator<Item = T>) -> Result<Self, SpecError> {
        TypeSet::new(types).map(Self::OneOf)
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, TypeSpec::Any)
    }
}

impl From<TypeSet> for TypeSpec {
    #[inline]
    fn from(value: TypeSet) -> Self {
        Self::OneOf(value)
    }
}

/// Anything that reports the type of its elements.
pub trait Typed {
    fn dtype(&self) -> DType;
}

impl Typed for DType {
    #[inline]
    fn dtype(&self) -> DType {
        self.clone()
    }
}

/// Matches a concrete data type against a requirement.
/// Returns a single error naming the type found and the acceptable types on failure.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", skip_all))]
pub fn match_dtype(found: &DType, spec: &TypeSpec) -> ErrorList {
    match spec {
        TypeSpec::Any => ErrorList::new(),
        TypeSpec::OneOf(types) if types.accepts(found) => ErrorList::new(),
        TypeSpec::OneOf(types) => format!(
            "Data type `{found}` is not compatible with any of the required types: {types}."
        )
        .into(),
    }
}

/// An [`ErrorFinder`] bound to a fixed [`TypeSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DtypeMatcher {
    spec: TypeSpec,
}

impl DtypeMatcher {
    /// Creates a matcher. [`TypeSpec::Any`] is accepted and always passes.
    #[inline]
    pub fn new(spec: impl Into<TypeSpec>) -> Self {
        let spec = spec.into();
        Self { spec }
    }

    /// Creates a matcher where checking the type is the whole point, so [`TypeSpec::Any`]
    /// is rejected. `context` names the check in the error.
    #[inline]
    pub fn required(spec: impl Into<TypeSpec>, context: &'static str) -> Result<Self, SpecError> {
        let spec = spec.into();
        if spec.is_any() {
            return Err(SpecError::AnyNotAllowed(context));
        }
        Ok(Self { spec })
    }

    #[inline]
    pub fn spec(&self) -> &TypeSpec {
        &self.spec
    }
}

impl<T: Typed + ?Sized> ErrorFinder<T> for DtypeMatcher {
    #[inline]
    fn name(&self) -> &str {
        "dtype_error"
    }

    #[inline]
    fn find(&self, data: &T) -> ErrorList {
        match_dtype(&data.dtype(), &self.spec)
    }
}
