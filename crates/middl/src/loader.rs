//! Data loaders consumed by pipelines.
//!
//! Any [`IntoIterator`] over batches can drive a pipeline. The [`Loader`]
//! trait additionally exposes the fields every batch is going to have, so
//! that a pipeline can be validated before the first batch is loaded.

use crate::error::LoaderError;
use itertools::{EitherOrBoth, Itertools};
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

pub trait Loader: Iterator {
    fn data_fields(&self) -> &BTreeSet<String>;
}

/// A loader that yields empty batches. Useful for iterating over epochs.
///
/// ```
/// use middl::EmptyLoader;
/// use std::collections::BTreeMap;
///
/// let loader = EmptyLoader::<BTreeMap<String, u32>>::new(3);
/// assert_eq!(loader.len(), 3);
/// assert!(loader.clone().all(|batch| batch.is_empty()));
/// ```
#[derive(Debug)]
pub struct EmptyLoader<D> {
    remaining: usize,
    data_fields: BTreeSet<String>,
    batch: PhantomData<fn() -> D>,
}

impl<D> EmptyLoader<D> {
    pub fn new(num_steps: usize) -> Self {
        Self {
            remaining: num_steps,
            data_fields: BTreeSet::new(),
            batch: PhantomData,
        }
    }
}

impl<D> Clone for EmptyLoader<D> {
    fn clone(&self) -> Self {
        Self {
            remaining: self.remaining,
            data_fields: self.data_fields.clone(),
            batch: PhantomData,
        }
    }
}

impl<D: Default> Iterator for EmptyLoader<D> {
    type Item = D;

    fn next(&mut self) -> Option<D> {
        self.remaining = self.remaining.checked_sub(1)?;
        Some(D::default())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<D: Default> ExactSizeIterator for EmptyLoader<D> {}

impl<D: Default> Loader for EmptyLoader<D> {
    fn data_fields(&self) -> &BTreeSet<String> {
        &self.data_fields
    }
}

/// Loader that turns rows (tuples, arrays, vectors, ...) into batches keyed by
/// the declared data fields. Created with [`wrap_iterable`].
#[derive(Debug, Clone)]
pub struct WrappedLoader<I> {
    rows: I,
    fields: Vec<String>,
    data_fields: BTreeSet<String>,
}

/// Wraps an iterable of rows so that it yields batches as maps.
///
/// Every item of a row is assigned the field name at the corresponding
/// position in `data_fields`. The number of items in each row has to match
/// the number of fields, otherwise that row yields [`LoaderError::RowLength`].
///
/// If the wrapped iterator knows its exact length, so does the wrapper.
pub fn wrap_iterable<I, F>(rows: I, data_fields: F) -> WrappedLoader<I::IntoIter>
where
    I: IntoIterator,
    I::Item: IntoIterator,
    F: IntoIterator,
    F::Item: Into<String>,
{
    let fields: Vec<String> = data_fields.into_iter().map(Into::into).collect();
    let data_fields = fields.iter().cloned().collect();

    WrappedLoader {
        rows: rows.into_iter(),
        fields,
        data_fields,
    }
}

impl<I> Iterator for WrappedLoader<I>
where
    I: Iterator,
    I::Item: IntoIterator,
{
    type Item = Result<BTreeMap<String, <I::Item as IntoIterator>::Item>, LoaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;

        let mut batch = BTreeMap::new();
        let mut actual = 0;
        let mut mismatch = false;

        for pair in self.fields.iter().zip_longest(row) {
            match pair {
                EitherOrBoth::Both(field, value) => {
                    actual += 1;
                    batch.insert(field.clone(), value);
                }
                EitherOrBoth::Right(_) => {
                    actual += 1;
                    mismatch = true;
                }
                EitherOrBoth::Left(_) => mismatch = true,
            }
        }

        if mismatch {
            return Some(Err(LoaderError::RowLength {
                expected: self.fields.len(),
                actual,
            }));
        }

        Some(Ok(batch))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<I> ExactSizeIterator for WrappedLoader<I>
where
    I: ExactSizeIterator,
    I::Item: IntoIterator,
{
}

impl<I> Loader for WrappedLoader<I>
where
    I: Iterator,
    I::Item: IntoIterator,
{
    fn data_fields(&self) -> &BTreeSet<String> {
        &self.data_fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use expect_test::expect;

    #[test]
    fn empty_loader_yields_fresh_batches() {
        let loader = EmptyLoader::<BTreeMap<String, u32>>::new(3);
        assert_eq!(loader.len(), 3);

        let mut first: Vec<_> = loader.clone().collect();
        first[0].insert("modified".to_owned(), 1);

        let second: Vec<_> = loader.collect();

        assert_eq!(first[0].len(), 1);
        assert_eq!(second, vec![BTreeMap::new(); 3]);
    }

    #[test]
    fn empty_loader_has_no_data_fields() {
        assert!(EmptyLoader::<BTreeMap<String, ()>>::new(1)
            .data_fields()
            .is_empty());
    }

    #[test]
    fn zero_fields() {
        let rows: Vec<[&str; 0]> = vec![[], []];
        let batches: Vec<_> = wrap_iterable(rows, Vec::<String>::new())
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(batches, vec![BTreeMap::new(), BTreeMap::new()]);
    }

    #[test]
    fn one_field() {
        let batches: Vec<_> = wrap_iterable([["val1"], ["val2"]], ["field"])
            .collect::<Result<_, _>>()
            .unwrap();

        test_bat::debug::assert_eq(
            batches,
            &expect![[r#"[{"field": "val1"}, {"field": "val2"}]"#]],
        );
    }

    #[test]
    fn items_are_matched_to_fields_by_position() {
        let rows = vec![vec!["a1", "b1", "c1"], vec!["a2", "b2", "c2"]];
        let loader = wrap_iterable(rows, ["A", "B", "C"]);

        assert_eq!(
            loader.data_fields(),
            &BTreeSet::from(["A".to_owned(), "B".to_owned(), "C".to_owned()])
        );

        for batch in loader {
            for (field, value) in batch.unwrap() {
                assert!(value.starts_with(&field.to_lowercase()));
            }
        }
    }

    #[test]
    fn row_length_mismatch() {
        let rows = [vec!["x", "y"], vec!["x", "y", "z", "w"]];
        let mut loader = wrap_iterable(rows, ["A", "B", "C"]);

        assert_matches!(
            loader.next(),
            Some(Err(LoaderError::RowLength { expected: 3, actual: 2 }))
        );
        assert_matches!(
            loader.next(),
            Some(Err(LoaderError::RowLength { expected: 3, actual: 4 }))
        );
        assert_matches!(loader.next(), None);
    }

    #[test]
    fn exact_size_is_preserved() {
        let loader = wrap_iterable(vec![["item1"], ["item2"], ["item3"]], ["only_key"]);
        assert_eq!(loader.len(), 3);
    }

    #[test]
    fn unsized_source_has_no_upper_bound() {
        let rows = std::iter::successors(Some(0), |i| (*i < 1).then_some(i + 1))
            .map(|i| [i]);

        let loader = wrap_iterable(rows, ["only_key"]);
        assert_eq!(loader.size_hint().1, None);
        assert_eq!(loader.count(), 2);
    }
}
