use std::{
    borrow::Cow,
    collections::hash_map::Entry,
    ops::{RangeFull, RangeInclusive},
    sync::Arc,
};

use casey::snake;
use derive_more::{Deref, Display};
use itertools::Itertools;
use rustc_hash::FxHashMap as HashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    error::SpecError,
    finder::{ErrorFinder, ErrorList},
};

/// Inclusive bounds on the size of a dimension. Always satisfies `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "(usize, usize)", into = "(usize, usize)")
)]
#[display("{low}..={high}")]
pub struct DimRange {
    low: usize,
    high: usize,
}

impl DimRange {
    #[inline]
    pub fn new(low: usize, high: usize) -> Result<Self, SpecError> {
        if low > high {
            return Err(SpecError::InvertedRange { low, high });
        }
        Ok(Self { low, high })
    }

    #[inline]
    pub fn low(&self) -> usize {
        self.low
    }

    #[inline]
    pub fn high(&self) -> usize {
        self.high
    }

    #[inline]
    pub fn contains(&self, size: usize) -> bool {
        (self.low..=self.high).contains(&size)
    }
}

impl TryFrom<(usize, usize)> for DimRange {
    type Error = SpecError;

    #[inline]
    fn try_from((low, high): (usize, usize)) -> Result<Self, Self::Error> {
        Self::new(low, high)
    }
}

impl From<DimRange> for (usize, usize) {
    #[inline]
    fn from(value: DimRange) -> Self {
        (value.low, value.high)
    }
}

/// Requirement on the size of one dimension.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dim {
    /// The size must equal the given value.
    #[display("{_0}")]
    Fixed(usize),
    /// The size must lie in the inclusive range.
    #[display("{_0}")]
    Range(DimRange),
    /// Any size.
    #[default]
    #[display("..")]
    Any,
    /// Binds to the size at its first occurrence; every later occurrence must match it.
    #[display("{_0}")]
    Var(Arc<str>),
}

impl Dim {
    #[inline]
    pub fn range(low: usize, high: usize) -> Result<Self, SpecError> {
        DimRange::new(low, high).map(Self::Range)
    }

    #[inline]
    pub fn var(name: impl Into<Arc<str>>) -> Result<Self, SpecError> {
        let name: Arc<str> = name.into();
        if name.is_empty() {
            return Err(SpecError::EmptyVariable);
        }
        Ok(Self::Var(name))
    }
}

pub trait IntoDim {
    fn into_dim(self) -> Result<Dim, SpecError>;
}

impl IntoDim for Dim {
    #[inline]
    fn into_dim(self) -> Result<Dim, SpecError> {
        match self {
            Dim::Var(name) => Dim::var(name),
            dim => Ok(dim),
        }
    }
}

impl IntoDim for DimRange {
    #[inline]
    fn into_dim(self) -> Result<Dim, SpecError> {
        Ok(Dim::Range(self))
    }
}

impl IntoDim for RangeFull {
    #[inline]
    fn into_dim(self) -> Result<Dim, SpecError> {
        Ok(Dim::Any)
    }
}

impl IntoDim for &str {
    #[inline]
    fn into_dim(self) -> Result<Dim, SpecError> {
        Dim::var(self)
    }
}

impl IntoDim for String {
    #[inline]
    fn into_dim(self) -> Result<Dim, SpecError> {
        Dim::var(self)
    }
}

impl<D: IntoDim> IntoDim for Option<D> {
    #[inline]
    fn into_dim(self) -> Result<Dim, SpecError> {
        match self {
            Some(dim) => dim.into_dim(),
            None => Ok(Dim::Any),
        }
    }
}

macro_rules! impl_into_dim_size {
    ($($t:ty),+) => {
        $(
            impl IntoDim for $t {
                #[inline]
                fn into_dim(self) -> Result<Dim, SpecError> {
                    let size = usize::try_from(self).map_err(|_| SpecError::Size(self as i128))?;
                    Ok(Dim::Fixed(size))
                }
            }

            impl IntoDim for RangeInclusive<$t> {
                #[inline]
                fn into_dim(self) -> Result<Dim, SpecError> {
                    let (low, high) = self.into_inner();
                    let low = usize::try_from(low).map_err(|_| SpecError::Size(low as i128))?;
                    let high = usize::try_from(high).map_err(|_| SpecError::Size(high as i128))?;
                    Dim::range(low, high)
                }
            }
        )+
    };
}

impl_into_dim_size!(usize, u32, u64, i32, i64);

/// An ordered, immutable pattern of dimension requirements.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Deref, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<Dim>", into = "Vec<Dim>")
)]
#[display("[{}]", _0.iter().format(", "))]
pub struct ShapeSpec(Arc<[Dim]>);

impl ShapeSpec {
    pub fn new(dims: impl IntoIterator<Item = Dim>) -> Result<Self, SpecError> {
        let dims: Arc<[Dim]> = dims
            .into_iter()
            .map(IntoDim::into_dim)
            .collect::<Result<_, _>>()?;
        Ok(Self(dims))
    }

    /// Number of dimensions the pattern requires.
    #[inline]
    pub fn rank(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<Vec<Dim>> for ShapeSpec {
    type Error = SpecError;

    #[inline]
    fn try_from(value: Vec<Dim>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShapeSpec> for Vec<Dim> {
    #[inline]
    fn from(value: ShapeSpec) -> Self {
        value.0.to_vec()
    }
}

pub trait IntoShapeSpec {
    fn into_shape_spec(self) -> Result<ShapeSpec, SpecError>;
}

impl IntoShapeSpec for ShapeSpec {
    #[inline]
    fn into_shape_spec(self) -> Result<ShapeSpec, SpecError> {
        Ok(self)
    }
}

impl IntoShapeSpec for () {
    #[inline]
    fn into_shape_spec(self) -> Result<ShapeSpec, SpecError> {
        Ok(ShapeSpec::default())
    }
}

impl<D: IntoDim> IntoShapeSpec for Vec<D> {
    #[inline]
    fn into_shape_spec(self) -> Result<ShapeSpec, SpecError> {
        let dims: Arc<[Dim]> = self
            .into_iter()
            .map(IntoDim::into_dim)
            .collect::<Result<_, _>>()?;
        Ok(ShapeSpec(dims))
    }
}

impl<D: IntoDim, const N: usize> IntoShapeSpec for [D; N] {
    #[inline]
    fn into_shape_spec(self) -> Result<ShapeSpec, SpecError> {
        Vec::from(self).into_shape_spec()
    }
}

macro_rules! impl_shape_spec_from {
    ($($t:ident),+) => {
        impl<$($t),+> IntoShapeSpec for ($($t,)+)
        where
            $($t: IntoDim),+
        {
            #[inline]
            fn into_shape_spec(self) -> Result<ShapeSpec, SpecError> {
                let ($(snake!($t),)+) = self;
                let dims = [$(snake!($t).into_dim()?),+];
                Ok(ShapeSpec(dims.into()))
            }
        }
    };
}

impl_shape_spec_from!(T0);
impl_shape_spec_from!(T0, T1);
impl_shape_spec_from!(T0, T1, T2);
impl_shape_spec_from!(T0, T1, T2, T3);
impl_shape_spec_from!(T0, T1, T2, T3, T4);
impl_shape_spec_from!(T0, T1, T2, T3, T4, T5);
impl_shape_spec_from!(T0, T1, T2, T3, T4, T5, T6);
impl_shape_spec_from!(T0, T1, T2, T3, T4, T5, T6, T7);

/// Anything that reports the sizes of its dimensions.
pub trait Shaped {
    fn shape(&self) -> Cow<'_, [usize]>;
}

impl Shaped for [usize] {
    #[inline]
    fn shape(&self) -> Cow<'_, [usize]> {
        Cow::Borrowed(self)
    }
}

impl Shaped for Vec<usize> {
    #[inline]
    fn shape(&self) -> Cow<'_, [usize]> {
        Cow::Borrowed(self)
    }
}

impl<const N: usize> Shaped for [usize; N] {
    #[inline]
    fn shape(&self) -> Cow<'_, [usize]> {
        Cow::Borrowed(self)
    }
}

/// Variable bindings of a single [`match_shape`] call.
/// Maps a variable name to the dimension index and size of its first occurrence.
#[derive(Debug, Default)]
struct Bindings<'a>(HashMap<&'a str, (usize, usize)>);

impl<'a> Bindings<'a> {
    fn check(&mut self, index: usize, size: usize, dim: &'a Dim) -> Option<String> {
        match dim {
            Dim::Fixed(fixed) if size != *fixed => Some(format!(
                "Dimension {index} size ({size}) does not equal required size: {fixed}."
            )),
            Dim::Range(range) if !range.contains(size) => Some(format!(
                "Dimension {index} size ({size}) is not in required range: {range}."
            )),
            Dim::Var(name) => match self.0.entry(name.as_ref()) {
                Entry::Vacant(entry) => {
                    log::trace!("bind dimension variable `{name}` = {size} at dimension {index}");
                    entry.insert((index, size));
                    None
                }
                Entry::Occupied(entry) => {
                    let &(first, bound) = entry.get();
                    (size != bound).then(|| {
                        format!(
                            "Dimension {index} size ({size}) does not match variable `{name}` = {bound} set at dimension {first}."
                        )
                    })
                }
            },
            Dim::Fixed(_) | Dim::Range(_) | Dim::Any => None,
        }
    }
}

/// Matches a concrete shape against a pattern.
///
/// A rank mismatch yields exactly one error and skips the per-dimension checks.
/// Otherwise every dimension is checked from left to right and all failures are reported.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", skip_all))]
pub fn match_shape(shape: &[usize], spec: &ShapeSpec) -> ErrorList {
    if shape.len() != spec.rank() {
        let error = format!(
            "Object dimensions ({}) do not match required dimensions: {}.",
            shape.len(),
            spec.rank()
        );
        return error.into();
    }

    let mut bindings = Bindings::default();
    itertools::izip!(0.., shape, spec.iter())
        .filter_map(|(index, &size, dim)| bindings.check(index, size, dim))
        .collect()
}

/// An [`ErrorFinder`] bound to a fixed [`ShapeSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeMatcher {
    spec: ShapeSpec,
}

impl ShapeMatcher {
    #[inline]
    pub fn new(spec: impl IntoShapeSpec) -> Result<Self, SpecError> {
        let spec = spec.into_shape_spec()?;
        Ok(Self { spec })
    }

    #[inline]
    pub fn spec(&self) -> &ShapeSpec {
        &self.spec
    }

    /// Checks that the pattern has exactly `expected` dimensions.
    pub(crate) fn require_rank(
        self,
        context: &'static str,
        expected: usize,
    ) -> Result<Self, SpecError> {
        let found = self.spec.rank();
        if found != expected {
            return Err(SpecError::Rank {
                context,
                expected,
                found,
            });
        }
        Ok(self)
    }
}

impl<T: Shaped + ?Sized> ErrorFinder<T> for ShapeMatcher {
    #[inline]
    fn name(&self) -> &str {
        "shape_error"
    }

    #[inline]
    fn find(&self, data: &T) -> ErrorList {
        match_shape(&data.shape(), &self.spec)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::{Dim, DimRange, IntoShapeSpec, ShapeMatcher, ShapeSpec, match_shape};
    use crate::check::{error::SpecError, finder::ErrorFinder};

    fn random_shape(rank: usize) -> Vec<usize> {
        (0..rank).map(|_| fastrand::usize(0..4096)).collect_vec()
    }

    #[test]
    fn test_wildcards_match_any_shape() -> Result<(), SpecError> {
        for _ in 0..256 {
            let rank = fastrand::usize(0..8);
            let spec = ShapeSpec::new(vec![Dim::Any; rank])?;
            let shape = random_shape(rank);
            assert!(match_shape(&shape, &spec).is_valid(), "{shape:?} vs {spec}");
        }
        Ok(())
    }

    #[test]
    fn test_rank_mismatch_single_error() -> Result<(), SpecError> {
        for _ in 0..256 {
            let rank = fastrand::usize(0..8);
            let other = (rank + fastrand::usize(1..4)) % 12;
            let spec = ShapeSpec::new(vec![Dim::Fixed(0); rank])?;
            let shape = random_shape(other);
            let errors = match_shape(&shape, &spec);
            assert_eq!(errors.len(), 1, "{shape:?} vs {spec}: {errors:?}");
        }

        let spec = (3, 4).into_shape_spec()?;
        let errors = match_shape(&[1, 2, 3], &spec);
        assert_eq!(
            errors[0],
            "Object dimensions (3) do not match required dimensions: 2."
        );
        Ok(())
    }

    #[test]
    fn test_variables() -> Result<(), SpecError> {
        let spec = ("x", "x").into_shape_spec()?;
        assert!(match_shape(&[4, 4], &spec).is_valid());

        let errors = match_shape(&[4, 5], &spec);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("`x`"));
        assert_eq!(
            errors[0],
            "Dimension 1 size (5) does not match variable `x` = 4 set at dimension 0."
        );

        // later occurrences compare against the first binding, never rebind
        let spec = ("n", "n", "n").into_shape_spec()?;
        let errors = match_shape(&[2, 3, 3], &spec);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|error| error.contains("= 2 set at dimension 0")));

        // distinct variables are independent
        let spec = ("m", "n", "m").into_shape_spec()?;
        assert!(match_shape(&[7, 1, 7], &spec).is_valid());
        Ok(())
    }

    #[test]
    fn test_range_and_fixed_no_short_circuit() -> Result<(), SpecError> {
        let spec = (1..=10, 3).into_shape_spec()?;
        let errors = match_shape(&[0, 3], &spec);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            "Dimension 0 size (0) is not in required range: 1..=10."
        );

        let errors = match_shape(&[11, 4], &spec);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[1],
            "Dimension 1 size (4) does not equal required size: 3."
        );

        // both bounds are inclusive
        assert!(match_shape(&[1, 3], &spec).is_valid());
        assert!(match_shape(&[10, 3], &spec).is_valid());
        Ok(())
    }

    #[test]
    fn test_inverted_range() {
        assert_eq!(
            DimRange::new(10, 1),
            Err(SpecError::InvertedRange { low: 10, high: 1 })
        );
        assert!((10..=1, ..).into_shape_spec().is_err());
        assert!(ShapeMatcher::new([10..=1]).is_err());
        assert!(DimRange::new(5, 5).is_ok());
    }

    #[test]
    fn test_invalid_dims() {
        assert_eq!(("", 3).into_shape_spec(), Err(SpecError::EmptyVariable));
        assert_eq!((-1, 3).into_shape_spec(), Err(SpecError::Size(-1)));
        assert!(ShapeSpec::new([Dim::Var("".into())]).is_err());
    }

    #[test]
    fn test_empty() -> Result<(), SpecError> {
        let spec = ().into_shape_spec()?;
        assert!(match_shape(&[], &spec).is_valid());
        assert_eq!(match_shape(&[1], &spec).len(), 1);
        Ok(())
    }

    #[test]
    fn test_display() -> Result<(), SpecError> {
        let spec = (3, 1..=10, "x", "x", None::<usize>).into_shape_spec()?;
        assert_eq!(spec.to_string(), "[3, 1..=10, x, x, ..]");
        Ok(())
    }

    #[test]
    fn test_matcher_idempotent() -> Result<(), SpecError> {
        let matcher = ShapeMatcher::new((3, 1..=10, "x", "x", ..))?;
        let data: Vec<usize> = vec![2, 11, 4, 5, 0];
        let first = matcher.find(&data);
        let second = matcher.find(&data);
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);

        assert!(matcher.find(&[3usize, 4, 6, 6, 100]).is_valid());
        Ok(())
    }

    #[test]
    fn test_matcher_concurrent() -> Result<(), SpecError> {
        use rayon::prelude::*;

        let matcher = ShapeMatcher::new(("batch", "x", "x"))?;
        let shapes = (0..1024)
            .map(|_| {
                let side = fastrand::usize(1..64);
                let other = match fastrand::bool() {
                    true => side,
                    false => side + 1,
                };
                vec![fastrand::usize(1..16), side, other]
            })
            .collect_vec();

        // bindings are local to each call, so concurrent calls never see each other's sizes
        let results = shapes
            .par_iter()
            .map(|shape| matcher.find(shape))
            .collect::<Vec<_>>();
        for (shape, errors) in shapes.iter().zip_eq(results) {
            assert_eq!(errors.is_valid(), shape[1] == shape[2]);
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() -> Result<(), Box<dyn std::error::Error>> {
        let spec = (3, 1..=10, "x", ..).into_shape_spec()?;
        let json = serde_json::to_string(&spec)?;
        let back: ShapeSpec = serde_json::from_str(&json)?;
        assert_eq!(spec, back);

        let inverted = r#"[{"Range":[10,1]}]"#;
        assert!(serde_json::from_str::<ShapeSpec>(inverted).is_err());
        Ok(())
    }
}
