use std::{fmt, marker::PhantomData};

use derive_more::Display;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    error::ValidationError,
    finder::{ErrorFinder, ErrorList},
};

/// What a [`Checker`] does when its finder reports errors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Policy {
    /// Fail with a [`ValidationError`].
    #[default]
    Raise,
    /// Log the errors as a warning and pass the data through.
    Warn,
    /// Pass the data through silently.
    Ignore,
}

/// Wraps an [`ErrorFinder`] into a pass-through validation step.
pub struct Checker<F, T: ?Sized> {
    finder: F,
    policy: Policy,
    phantom: PhantomData<fn(&T)>,
}

impl<F: Clone, T: ?Sized> Clone for Checker<F, T> {
    #[inline]
    fn clone(&self) -> Self {
        let finder = self.finder.clone();
        let policy = self.policy;
        let phantom = PhantomData;
        Self {
            finder,
            policy,
            phantom,
        }
    }
}

impl<F: fmt::Debug, T: ?Sized> fmt::Debug for Checker<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checker")
            .field("finder", &self.finder)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<F: ErrorFinder<T>, T: ?Sized> Checker<F, T> {
    #[inline]
    pub fn new(finder: F) -> Self {
        let policy = Policy::default();
        let phantom = PhantomData;
        Self {
            finder,
            policy,
            phantom,
        }
    }

    #[inline]
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    #[inline]
    pub fn finder(&self) -> &F {
        &self.finder
    }

    /// Validates `data`, returning it unchanged unless the policy turns errors into a failure.
    pub fn validate<'a>(&self, data: &'a T) -> Result<&'a T, ValidationError> {
        let errors = self.finder.find(data);
        if errors.is_valid() {
            return Ok(data);
        }

        let name = self.finder.name();
        match self.policy {
            Policy::Raise => {
                log::debug!("{name}: {} error(s) found", errors.len());
                Err(ValidationError::new(name, errors))
            }
            Policy::Warn => {
                log::warn!("{name}:{errors}");
                Ok(data)
            }
            Policy::Ignore => Ok(data),
        }
    }

    /// Runs the finder without applying the policy.
    #[inline]
    pub fn errors(&self, data: &T) -> ErrorList {
        self.finder.find(data)
    }
}

#[cfg(test)]
mod tests {
    use super::{Checker, Policy};
    use crate::check::{
        dtype::{DType, DtypeMatcher, NumpyType},
        error::SpecError,
        shape::ShapeMatcher,
    };

    #[test]
    fn test_policies() -> Result<(), SpecError> {
        let data = vec![2usize, 3];
        let checker = Checker::new(ShapeMatcher::new((2, 4))?);
        assert_eq!(checker.policy(), Policy::Raise);

        let err = checker.validate(&data).unwrap_err();
        assert_eq!(&*err.name, "shape_error");
        assert_eq!(
            err.to_string(),
            "shape_error:\n  - Dimension 1 size (3) does not equal required size: 4."
        );

        let checker = checker.with_policy(Policy::Warn);
        assert_eq!(checker.validate(&data).ok(), Some(&data));
        assert_eq!(checker.errors(&data).len(), 1);

        let checker = checker.with_policy(Policy::Ignore);
        assert!(checker.validate(&data).is_ok());

        let checker = Checker::new(DtypeMatcher::required(NumpyType::Floating, "arrays")?);
        let found = DType::from(NumpyType::Float32);
        assert_eq!(checker.validate(&found).ok(), Some(&found));
        Ok(())
    }
}
