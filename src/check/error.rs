use std::sync::Arc;

use thiserror::Error;

use super::finder::ErrorList;

/// Malformed criteria supplied when constructing a matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("dimension range error: low bound {low} exceeds high bound {high}")]
    InvertedRange { low: usize, high: usize },
    #[error("dimension size error: {0} is not a valid dimension size")]
    Size(i128),
    #[error("dimension variable error: variable name must not be empty")]
    EmptyVariable,
    #[error("type spec error: a set of required types must not be empty")]
    EmptyTypeSet,
    #[error("type spec error: `any` is not a valid requirement for {0}")]
    AnyNotAllowed(&'static str),
    #[error("shape spec error: {context} requires {expected} dimension(s), spec has {found}")]
    Rank {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("device error: cannot parse device `{0}`")]
    Device(String),
    #[error("column spec error: column `{0}` is listed more than once")]
    DuplicateColumn(String),
}

/// A non-empty list of data mismatches reported under the name of the finder that found them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}:{errors}")]
pub struct ValidationError {
    pub name: Arc<str>,
    pub errors: ErrorList,
}

impl ValidationError {
    #[inline]
    pub fn new(name: impl Into<Arc<str>>, errors: ErrorList) -> Self {
        let name = name.into();
        Self { name, errors }
    }
}

#[cfg(test)]
mod tests {
    use super::ValidationError;
    use crate::check::finder::ErrorList;

    #[test]
    fn test_validation_error_display() {
        let errors = ErrorList::from(vec!["first".to_string(), "second".to_string()]);
        let err = ValidationError::new("numpy_shape_error", errors);
        assert_eq!(
            err.to_string(),
            "numpy_shape_error:\n  - first\n  - second"
        );
    }
}
