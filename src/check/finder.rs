use std::{fmt, sync::Arc};

use derive_more::{Deref, DerefMut, From, Into};
use dyn_clone::DynClone;

use super::error::ValidationError;

/// Human-readable descriptions of every mismatch found, in evaluation order. Empty means valid.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Deref, DerefMut, From, Into)]
pub struct ErrorList(Vec<String>);

impl ErrorList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no mismatch was found.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|error| write!(f, "\n  - {error}"))
    }
}

impl From<String> for ErrorList {
    #[inline]
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl FromIterator<String> for ErrorList {
    #[inline]
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<String> for ErrorList {
    #[inline]
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl IntoIterator for ErrorList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A check over data of type `T` with criteria fixed at construction.
///
/// Implementors must not mutate the datum, must report data problems only through the
/// returned [`ErrorList`], and must return the same list when called again with the same datum.
pub trait ErrorFinder<T: ?Sized>: DynClone + Send + Sync {
    /// A stable identifier used to namespace the reported errors.
    fn name(&self) -> &str;
    /// Finds all mismatches between `data` and the criteria.
    fn find(&self, data: &T) -> ErrorList;
}

dyn_clone::clone_trait_object!(<T> ErrorFinder<T> where T: ?Sized);

impl<T: ?Sized> ErrorFinder<T> for Box<dyn ErrorFinder<T>> {
    #[inline]
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    #[inline]
    fn find(&self, data: &T) -> ErrorList {
        self.as_ref().find(data)
    }
}

impl<T: ?Sized> fmt::Debug for dyn ErrorFinder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorFinder").field(&self.name()).finish()
    }
}

pub trait ErrorFinderExt<T: ?Sized>: ErrorFinder<T> {
    /// Runs the finder and wraps a non-empty result into a [`ValidationError`].
    fn check(&self, data: &T) -> Result<(), ValidationError> {
        let errors = self.find(data);
        if errors.is_valid() {
            return Ok(());
        }
        Err(ValidationError::new(self.name(), errors))
    }

    #[inline]
    fn boxed(self) -> Box<dyn ErrorFinder<T>>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

impl<T: ?Sized, F: ErrorFinder<T> + ?Sized> ErrorFinderExt<T> for F {}

/// An [`ErrorFinder`] backed by a closure. Created by [`error_finder`].
#[derive(Clone)]
pub struct FnFinder<F> {
    name: Arc<str>,
    f: F,
}

impl<F> fmt::Debug for FnFinder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFinder").field("name", &self.name).finish()
    }
}

impl<T, F> ErrorFinder<T> for FnFinder<F>
where
    T: ?Sized,
    F: Fn(&T) -> ErrorList + Clone + Send + Sync,
{
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn find(&self, data: &T) -> ErrorList {
        (self.f)(data)
    }
}

/// Wraps a user-supplied check into a named [`ErrorFinder`].
///
/// The closure receives the datum and returns the mismatches it found. Its criteria are
/// whatever it captures, so they are fixed once the finder is built.
#[inline]
pub fn error_finder<T, F>(name: impl Into<Arc<str>>, f: F) -> FnFinder<F>
where
    T: ?Sized,
    F: Fn(&T) -> ErrorList + Clone + Send + Sync,
{
    let name = name.into();
    FnFinder { name, f }
}

#[cfg(test)]
mod tests {
    use super::{ErrorFinder, ErrorFinderExt, ErrorList, error_finder};

    #[test]
    fn test_fn_finder() {
        let positive = error_finder("positive_error", |data: &[i32]| {
            data.iter()
                .enumerate()
                .filter(|(_, x)| **x <= 0)
                .map(|(index, x)| format!("Value {x} at {index} is not positive."))
                .collect()
        });
        assert_eq!(ErrorFinder::<[i32]>::name(&positive), "positive_error");
        assert!(positive.find(&[1, 2, 3][..]).is_valid());

        let errors = positive.find(&[1, -2, 0][..]);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], "Value -2 at 1 is not positive.");

        let err = positive.check(&[0][..]).unwrap_err();
        assert_eq!(&*err.name, "positive_error");
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn test_boxed_clone() {
        let finder: Box<dyn ErrorFinder<str>> = error_finder("empty_error", |data: &str| {
            match data.is_empty() {
                true => ErrorList::from("String is empty.".to_string()),
                false => ErrorList::new(),
            }
        })
        .boxed();
        let cloned = finder.clone();
        assert_eq!(cloned.name(), "empty_error");
        assert_eq!(finder.find(""), cloned.find(""));
        assert!(cloned.check("x").is_ok());
    }
}
