use std::{borrow::Cow, collections::BTreeSet, sync::Arc};

use derive_more::{Display, From};
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::check::finder::{ErrorFinder, ErrorList};

/// A row or column label: an integer or a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum Label {
    #[display("{_0}")]
    Int(i64),
    #[display("{_0}")]
    Str(Arc<str>),
}

impl From<i32> for Label {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<&str> for Label {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Label {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

/// Formats labels as a set, e.g. `{a, b}`.
pub(crate) fn label_set<'a>(labels: impl IntoIterator<Item = &'a Label>) -> String {
    format!("{{{}}}", labels.into_iter().format(", "))
}

/// Anything with row index labels.
pub trait Indexed {
    fn index(&self) -> Cow<'_, [Label]>;
}

/// Checks that an object's index contains the required labels.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexMatcher {
    required: BTreeSet<Label>,
    allow_extra: bool,
}

impl IndexMatcher {
    /// Requires every label in `required`. Extra labels are allowed by default.
    pub fn new<L: Into<Label>>(required: impl IntoIterator<Item = L>) -> Self {
        let required = required.into_iter().map(Into::into).collect();
        Self {
            required,
            allow_extra: true,
        }
    }

    /// Sets whether labels outside the required set are allowed.
    #[inline]
    pub fn allow_extra(mut self, allow_extra: bool) -> Self {
        self.allow_extra = allow_extra;
        self
    }
}

impl<T: Indexed + ?Sized> ErrorFinder<T> for IndexMatcher {
    #[inline]
    fn name(&self) -> &str {
        "pandas_index_error"
    }

    fn find(&self, data: &T) -> ErrorList {
        let index = data.index();
        let present: BTreeSet<&Label> = index.iter().collect();
        let mut errors = ErrorList::new();

        let missing = self
            .required
            .iter()
            .filter(|label| !present.contains(label))
            .collect_vec();
        if !missing.is_empty() {
            let missing = label_set(missing);
            errors.push(format!("Object is missing the following indices: {missing}."));
        }

        if !self.allow_extra {
            let extra = present
                .into_iter()
                .filter(|label| !self.required.contains(*label))
                .collect_vec();
            if !extra.is_empty() {
                let extra = label_set(extra);
                errors.push(format!("Object has extra indices: {extra}."));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::{IndexMatcher, Indexed, Label};
    use crate::check::finder::ErrorFinder;

    struct Rows(Vec<Label>);

    impl Indexed for Rows {
        fn index(&self) -> Cow<'_, [Label]> {
            Cow::Borrowed(&self.0)
        }
    }

    #[test]
    fn test_index() {
        let rows = Rows(vec!["test".into(), "test_2".into(), 3.into()]);

        let matcher = IndexMatcher::new(["test", "test_2"]);
        assert!(matcher.find(&rows).is_valid());

        let matcher = matcher.allow_extra(false);
        let errors = matcher.find(&rows);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], "Object has extra indices: {3}.");

        let matcher = IndexMatcher::new(["test", "missing"]).allow_extra(false);
        let errors = matcher.find(&rows);
        assert_eq!(
            errors.to_vec(),
            vec![
                "Object is missing the following indices: {missing}.".to_string(),
                "Object has extra indices: {3, test_2}.".to_string(),
            ]
        );
    }

    #[test]
    fn test_label_order() {
        let mut labels = vec![Label::from("b"), Label::from(2), Label::from("a"), 1.into()];
        labels.sort();
        assert_eq!(super::label_set(&labels), "{1, 2, a, b}");
    }
}
