//! Uniform access to the engine's count/index collections.
//!
//! The engine exposes modules, breakpoints, threads, frames, breakpoint
//! locations and value children as a pair of operations: "how many" and
//! "give me element `i`". [`IndexedSequence`] wraps such a pair so every
//! caller gets the same bounds checking and iteration behavior. Nothing is
//! cached: each call goes back to the engine.
//!
//! Do not mutate the backing collection while iterating. Iteration reads
//! the length once up front and then asks for each index in turn, so a
//! collection that shrinks underneath a traversal yields whatever the
//! engine returns for the missing indices (typically
//! [`EngineError::OutOfRange`]).

use std::fmt;

use crate::error::EngineError;

type CountFn<'a> = Box<dyn Fn() -> usize + 'a>;
type AtFn<'a, T> = Box<dyn Fn(usize) -> Result<T, EngineError> + 'a>;

/// A lazily evaluated, finite sequence backed by live engine calls.
pub struct IndexedSequence<'a, T> {
    count: CountFn<'a>,
    at: AtFn<'a, T>,
}

impl<'a, T> IndexedSequence<'a, T> {
    /// Build a sequence from a count operation and an element-at-index
    /// operation.
    pub fn new<C, A>(count: C, at: A) -> Self
    where
        C: Fn() -> usize + 'a,
        A: Fn(usize) -> Result<T, EngineError> + 'a,
    {
        Self {
            count: Box::new(count),
            at: Box::new(at),
        }
    }

    /// Current number of elements, queried from the engine.
    pub fn len(&self) -> usize {
        (self.count)()
    }

    /// Whether the collection is currently empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index` (0-based).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::OutOfRange`] when `index` is not below the
    /// current length, or whatever error the engine reports for the
    /// element itself.
    pub fn at(&self, index: usize) -> Result<T, EngineError> {
        let len = self.len();
        if index >= len {
            return Err(EngineError::OutOfRange { index, len });
        }
        (self.at)(index)
    }

    /// Forward traversal. The length is read once when this is called.
    pub fn iter(&self) -> Iter<'_, 'a, T> {
        Iter {
            seq: self,
            next: 0,
            end: self.len(),
        }
    }

    /// Traverse the whole sequence, stopping at the first error.
    pub fn try_collect(&self) -> Result<Vec<T>, EngineError> {
        self.iter().collect()
    }
}

impl<T> fmt::Debug for IndexedSequence<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedSequence")
            .field("len", &self.len())
            .finish()
    }
}

impl<'s, 'a, T> IntoIterator for &'s IndexedSequence<'a, T> {
    type Item = Result<T, EngineError>;
    type IntoIter = Iter<'s, 'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over an [`IndexedSequence`].
pub struct Iter<'s, 'a, T> {
    seq: &'s IndexedSequence<'a, T>,
    next: usize,
    end: usize,
}

impl<T> Iterator for Iter<'_, '_, T> {
    type Item = Result<T, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some((self.seq.at)(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, '_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn raw_at(items: &RefCell<Vec<u32>>, i: usize) -> Result<u32, EngineError> {
        let items = items.borrow();
        items.get(i).copied().ok_or(EngineError::OutOfRange {
            index: i,
            len: items.len(),
        })
    }

    #[test]
    fn at_matches_underlying_operation_in_range() {
        let items = RefCell::new(vec![7, 8, 9]);
        let seq = IndexedSequence::new(|| items.borrow().len(), |i| raw_at(&items, i));
        for i in 0..3 {
            assert_eq!(seq.at(i).unwrap(), raw_at(&items, i).unwrap());
        }
    }

    #[test]
    fn at_fails_out_of_range_at_and_beyond_count() {
        let items = RefCell::new(vec![1, 2]);
        let seq = IndexedSequence::new(|| items.borrow().len(), |i| raw_at(&items, i));
        assert_eq!(
            seq.at(2).unwrap_err(),
            EngineError::OutOfRange { index: 2, len: 2 }
        );
        assert!(seq.at(100).unwrap_err().is_out_of_range());
    }

    #[test]
    fn bounds_check_does_not_call_underlying_at() {
        let calls = Cell::new(0);
        let seq = IndexedSequence::new(
            || 1,
            |i| {
                calls.set(calls.get() + 1);
                Ok(i)
            },
        );
        assert!(seq.at(5).is_err());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn length_is_live_not_cached() {
        let items = RefCell::new(vec![1]);
        let seq = IndexedSequence::new(|| items.borrow().len(), |i| raw_at(&items, i));
        assert_eq!(seq.len(), 1);
        items.borrow_mut().push(2);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.at(1).unwrap(), 2);
    }

    #[test]
    fn empty_sequence() {
        let seq: IndexedSequence<'_, u32> = IndexedSequence::new(|| 0, |_| Ok(0));
        assert!(seq.is_empty());
        assert_eq!(seq.iter().count(), 0);
        assert_eq!(seq.try_collect().unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn iteration_visits_every_element_in_order() {
        let items = RefCell::new(vec![3, 1, 4, 1, 5]);
        let seq = IndexedSequence::new(|| items.borrow().len(), |i| raw_at(&items, i));
        assert_eq!(seq.try_collect().unwrap(), vec![3, 1, 4, 1, 5]);
        let via_into_iter: Vec<u32> = (&seq).into_iter().map(Result::unwrap).collect();
        assert_eq!(via_into_iter, vec![3, 1, 4, 1, 5]);
    }

    #[test]
    fn iteration_reads_length_once() {
        let count_calls = Cell::new(0);
        let seq = IndexedSequence::new(
            || {
                count_calls.set(count_calls.get() + 1);
                4
            },
            |i| Ok(i * 10),
        );
        let out: Vec<usize> = seq.iter().map(Result::unwrap).collect();
        assert_eq!(out, vec![0, 10, 20, 30]);
        assert_eq!(count_calls.get(), 1);
    }

    #[test]
    fn shrinking_during_traversal_surfaces_engine_error() {
        let items = RefCell::new(vec![1, 2, 3]);
        let seq = IndexedSequence::new(|| items.borrow().len(), |i| raw_at(&items, i));
        let mut iter = seq.iter();
        assert_eq!(iter.next(), Some(Ok(1)));
        items.borrow_mut().truncate(1);
        assert!(matches!(
            iter.next(),
            Some(Err(EngineError::OutOfRange { index: 1, len: 1 }))
        ));
    }

    #[test]
    fn try_collect_stops_at_first_error() {
        let seq = IndexedSequence::new(
            || 3,
            |i| {
                if i == 1 {
                    Err(EngineError::call_failed("frame_at", "corrupt stack"))
                } else {
                    Ok(i)
                }
            },
        );
        let err = seq.try_collect().unwrap_err();
        assert!(matches!(err, EngineError::CallFailed { .. }));
    }

    #[test]
    fn size_hint_is_exact() {
        let seq = IndexedSequence::new(|| 3, Ok);
        let mut iter = seq.iter();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.size_hint(), (2, Some(2)));
    }
}
