//! Iterators over a container's records.
//!
//! | Iterator        | Item              | Source                       |
//! |-----------------|-------------------|------------------------------|
//! | [`Iter`]        | [`ElementRef`]    | `SoaVec::iter`, `&SoaVec`    |
//! | [`IntoIter`]    | `R` (owned)       | `SoaVec::into_iter`          |

use std::iter::FusedIterator;

use soa_core::Record;

use crate::{Element, ElementRef, FieldArrayStore};

/// Read-only proxies over positions `front..back` of a store.
pub struct Iter<'a, R: Record> {
    store: &'a FieldArrayStore<R>,
    front: usize,
    back:  usize,
}

impl<'a, R: Record> Iter<'a, R> {
    pub(crate) fn new(store: &'a FieldArrayStore<R>, front: usize, back: usize) -> Self {
        debug_assert!(front <= back && back <= store.len());
        Self { store, front, back }
    }
}

impl<R: Record> Clone for Iter<'_, R> {
    fn clone(&self) -> Self {
        Self { store: self.store, front: self.front, back: self.back }
    }
}

impl<'a, R: Record> Iterator for Iter<'a, R> {
    type Item = ElementRef<'a, R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let element = Element::new(self.store, self.front);
        self.front += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl<R: Record> DoubleEndedIterator for Iter<'_, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(Element::new(self.store, self.back))
    }
}

impl<R: Record> ExactSizeIterator for Iter<'_, R> {}

impl<R: Record> FusedIterator for Iter<'_, R> {}

/// Owning iterator: moves each record out of the store in order.
pub struct IntoIter<R: Record> {
    store: FieldArrayStore<R>,
    front: usize,
    back:  usize,
}

impl<R: Record> IntoIter<R> {
    pub(crate) fn new(store: FieldArrayStore<R>) -> Self {
        let back = store.len();
        Self { store, front: 0, back }
    }
}

impl<R: Record> Iterator for IntoIter<R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        if self.front == self.back {
            return None;
        }
        let value = self.store.take_at(self.front);
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<R: Record> DoubleEndedIterator for IntoIter<R> {
    fn next_back(&mut self) -> Option<R> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.store.pop()
    }
}

impl<R: Record> ExactSizeIterator for IntoIter<R> {}

impl<R: Record> FusedIterator for IntoIter<R> {}
