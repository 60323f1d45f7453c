use std::fmt;

use super::finder::{ErrorFinder, ErrorList};

/// Runs every finder against the same datum and concatenates their errors in order.
///
/// No finder is skipped because an earlier one failed. A bundle is itself an [`ErrorFinder`],
/// so bundles nest.
pub struct Bundle<T: ?Sized> {
    finders: Vec<Box<dyn ErrorFinder<T>>>,
}

impl<T: ?Sized> Clone for Bundle<T> {
    #[inline]
    fn clone(&self) -> Self {
        let finders = self.finders.clone();
        Self { finders }
    }
}

impl<T: ?Sized> Default for Bundle<T> {
    #[inline]
    fn default() -> Self {
        let finders = vec![];
        Self { finders }
    }
}

impl<T: ?Sized> fmt::Debug for Bundle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.finders.iter().map(|finder| finder.name()))
            .finish()
    }
}

impl<T: ?Sized> Bundle<T> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finder; it runs after every finder added before it.
    #[inline]
    pub fn with(mut self, finder: impl ErrorFinder<T> + 'static) -> Self {
        self.finders.push(Box::new(finder));
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.finders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.finders.is_empty()
    }
}

impl<T: ?Sized> FromIterator<Box<dyn ErrorFinder<T>>> for Bundle<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = Box<dyn ErrorFinder<T>>>>(iter: I) -> Self {
        let finders = iter.into_iter().collect();
        Self { finders }
    }
}

impl<T: ?Sized> ErrorFinder<T> for Bundle<T> {
    #[inline]
    fn name(&self) -> &str {
        "bundled_validation_error"
    }

    fn find(&self, data: &T) -> ErrorList {
        self.finders
            .iter()
            .flat_map(|finder| finder.find(data))
            .collect()
    }
}

/// Composes `finders` into one [`Bundle`] that reports the errors of all of them.
#[inline]
pub fn bundle<T: ?Sized>(finders: impl IntoIterator<Item = Box<dyn ErrorFinder<T>>>) -> Bundle<T> {
    finders.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::{Bundle, bundle};
    use crate::check::{
        error::SpecError,
        finder::{ErrorFinder, ErrorFinderExt, ErrorList, error_finder},
        shape::ShapeMatcher,
    };

    fn counted(
        name: &'static str,
        errors: &'static [&'static str],
        counter: Arc<AtomicUsize>,
    ) -> Box<dyn ErrorFinder<[usize]>> {
        error_finder(name, move |_: &[usize]| {
            counter.fetch_add(1, Ordering::SeqCst);
            errors.iter().map(|error| error.to_string()).collect()
        })
        .boxed()
    }

    #[test]
    fn test_bundle_order() {
        let counters: [Arc<AtomicUsize>; 3] = Default::default();
        let bundled = bundle([
            counted("a", &[], counters[0].clone()),
            counted("b", &["e1"], counters[1].clone()),
            counted("c", &["e2", "e3"], counters[2].clone()),
        ]);

        let errors = bundled.find(&[][..]);
        assert_eq!(errors, ErrorList::from(vec!["e1".into(), "e2".into(), "e3".into()]));
        for counter in &counters {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_bundle_all_valid() {
        let counter = Arc::new(AtomicUsize::new(0));
        let bundled = bundle([
            counted("a", &[], counter.clone()),
            counted("b", &[], counter.clone()),
        ]);
        assert!(bundled.find(&[1, 2][..]).is_valid());
        assert!(bundled.check(&[1, 2][..]).is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 4);

        assert!(Bundle::<[usize]>::new().find(&[][..]).is_valid());
    }

    #[test]
    fn test_bundle_nested() -> Result<(), SpecError> {
        let inner = Bundle::<Vec<usize>>::new()
            .with(ShapeMatcher::new((3, ..))?)
            .with(ShapeMatcher::new(("x", "x"))?);
        let outer = Bundle::<Vec<usize>>::new()
            .with(inner)
            .with(ShapeMatcher::new((1..=2, 5))?);
        assert_eq!(outer.len(), 2);

        let data: Vec<usize> = vec![4, 5];
        let errors = outer.find(&data);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("Dimension 0 size (4)"));
        assert!(errors[1].contains("variable `x`"));
        assert!(errors[2].contains("required range: 1..=2"));

        let err = outer.check(&data).unwrap_err();
        assert_eq!(&*err.name, "bundled_validation_error");
        assert_eq!(err.errors, errors);
        assert_eq!(outer.find(&data), errors);
        Ok(())
    }
}
