//! Cursors: random-access traversal handles that dereference to proxies.
//!
//! A cursor is a store reference plus an index in `[0, len]`; `len` is the
//! end sentinel.  There is no separate "invalid" state.  Dereferencing the
//! end sentinel is a contract violation and panics.
//!
//! Like [`Element`], `Cursor<S>` is generic over how it holds the store:
//! [`CursorRef`] yields read-only proxies, [`CursorMut`] read-write ones.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Deref, DerefMut, Sub, SubAssign};

use soa_core::Record;

use crate::{Element, ElementMut, ElementRef, FieldArrayStore, Iter};

/// Traversal handle over the positions of a [`FieldArrayStore`].
#[derive(Clone, Copy)]
pub struct Cursor<S> {
    store: S,
    index: usize,
}

pub type CursorRef<'a, R> = Cursor<&'a FieldArrayStore<R>>;

pub type CursorMut<'a, R> = Cursor<&'a mut FieldArrayStore<R>>;

impl<S> Cursor<S> {
    pub(crate) fn new(store: S, index: usize) -> Self {
        Self { store, index }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<R, S> Cursor<S>
where
    R: Record,
    S: Deref<Target = FieldArrayStore<R>>,
{
    /// `true` at the end sentinel.
    pub fn is_end(&self) -> bool {
        self.index >= self.store.len()
    }

    fn seek(&mut self, index: Option<usize>) {
        let len = self.store.len();
        self.index = match index {
            Some(index) if index <= len => index,
            Some(index) => panic!("cursor moved past the end (to {index}, len is {len})"),
            None => panic!("cursor moved before the first position"),
        };
    }

    /// Step forward one position (`++`).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end sentinel.
    pub fn advance(&mut self) -> &mut Self {
        self.seek(self.index.checked_add(1));
        self
    }

    /// Step back one position (`--`).
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at position 0.
    pub fn retreat(&mut self) -> &mut Self {
        self.seek(self.index.checked_sub(1));
        self
    }

    /// Move by `n` positions in either direction.
    ///
    /// # Panics
    ///
    /// Panics if the result leaves `[0, len]`.
    pub fn offset(mut self, n: isize) -> Self {
        self.seek(self.index.checked_add_signed(n));
        self
    }

    /// Signed number of positions from `self` to `other`
    /// (`other - self`).  Both cursors must belong to the same container.
    pub fn distance<S2>(&self, other: &Cursor<S2>) -> isize
    where
        S2: Deref<Target = FieldArrayStore<R>>,
    {
        debug_assert!(self.same_store(other), "distance between cursors of different containers");
        other.index as isize - self.index as isize
    }

    fn same_store<S2>(&self, other: &Cursor<S2>) -> bool
    where
        S2: Deref<Target = FieldArrayStore<R>>,
    {
        std::ptr::eq(&*self.store, &*other.store)
    }

    /// Read-only proxy at the current position.
    ///
    /// # Panics
    ///
    /// Panics at the end sentinel.
    pub fn get(&self) -> ElementRef<'_, R> {
        assert!(!self.is_end(), "dereferenced the end cursor");
        Element::new(&*self.store, self.index)
    }

    /// Iterate read-only proxies from here to the end.
    pub fn iter(&self) -> Iter<'_, R> {
        let len = self.store.len();
        Iter::new(&*self.store, self.index.min(len), len)
    }
}

impl<R, S> Cursor<S>
where
    R: Record,
    S: DerefMut<Target = FieldArrayStore<R>>,
{
    /// Read-write proxy at the current position.
    ///
    /// # Panics
    ///
    /// Panics at the end sentinel.
    pub fn get_mut(&mut self) -> ElementMut<'_, R> {
        assert!(!self.is_end(), "dereferenced the end cursor");
        Element::new(&mut *self.store, self.index)
    }

    /// Turn the cursor into a proxy at the current position, keeping the
    /// full borrow.
    pub fn into_element(self) -> Element<S> {
        assert!(!self.is_end(), "dereferenced the end cursor");
        Element::new(self.store, self.index)
    }
}

impl<'a, R: Record> CursorRef<'a, R> {
    /// Read-only proxy that outlives the cursor.
    pub fn element(self) -> ElementRef<'a, R> {
        assert!(!self.is_end(), "dereferenced the end cursor");
        Element::new(self.store, self.index)
    }
}

impl<'a, R: Record> IntoIterator for CursorRef<'a, R> {
    type Item = ElementRef<'a, R>;
    type IntoIter = Iter<'a, R>;

    fn into_iter(self) -> Iter<'a, R> {
        let len = self.store.len();
        Iter::new(self.store, self.index.min(len), len)
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────────

impl<R, S> Add<usize> for Cursor<S>
where
    R: Record,
    S: Deref<Target = FieldArrayStore<R>>,
{
    type Output = Self;

    fn add(mut self, n: usize) -> Self {
        self += n;
        self
    }
}

impl<R, S> Sub<usize> for Cursor<S>
where
    R: Record,
    S: Deref<Target = FieldArrayStore<R>>,
{
    type Output = Self;

    fn sub(mut self, n: usize) -> Self {
        self -= n;
        self
    }
}

impl<R, S> AddAssign<usize> for Cursor<S>
where
    R: Record,
    S: Deref<Target = FieldArrayStore<R>>,
{
    fn add_assign(&mut self, n: usize) {
        self.seek(self.index.checked_add(n));
    }
}

impl<R, S> SubAssign<usize> for Cursor<S>
where
    R: Record,
    S: Deref<Target = FieldArrayStore<R>>,
{
    fn sub_assign(&mut self, n: usize) {
        self.seek(self.index.checked_sub(n));
    }
}

// ── Comparison ────────────────────────────────────────────────────────────────

impl<R, S, S2> PartialEq<Cursor<S2>> for Cursor<S>
where
    R: Record,
    S: Deref<Target = FieldArrayStore<R>>,
    S2: Deref<Target = FieldArrayStore<R>>,
{
    /// Equal when both point at the same position of the same container.
    fn eq(&self, other: &Cursor<S2>) -> bool {
        self.same_store(other) && self.index == other.index
    }
}

impl<R, S, S2> PartialOrd<Cursor<S2>> for Cursor<S>
where
    R: Record,
    S: Deref<Target = FieldArrayStore<R>>,
    S2: Deref<Target = FieldArrayStore<R>>,
{
    /// Ordered by position; cursors of different containers are unordered.
    fn partial_cmp(&self, other: &Cursor<S2>) -> Option<Ordering> {
        self.same_store(other).then(|| self.index.cmp(&other.index))
    }
}

impl<S> fmt::Debug for Cursor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("index", &self.index).finish_non_exhaustive()
    }
}
