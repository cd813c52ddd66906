//! `SoaVec<R>` — the user-facing struct-of-arrays vector.
//!
//! The API mirrors `Vec<R>` where it can.  Element access hands out proxies
//! ([`ElementRef`] / [`ElementMut`]) instead of `&R` / `&mut R`, because no
//! `R` exists in memory; each field lives in its own array.
//!
//! # Panics vs errors
//!
//! Checked access ([`SoaVec::at`]) and the `try_*` growth operations return
//! [`SoaResult`].  Everything else treats a bad position as a contract
//! violation and panics, the way `Vec` does.

use std::fmt;
use std::ops::Range;

use soa_core::{Field, FieldSelector, FieldSet, FieldValue, Record, SoaError, SoaResult};

use crate::{
    Cursor, CursorMut, CursorRef, Element, ElementMut, ElementRef, FieldArrayStore, IntoIter, Iter,
};

/// Vector of `R` stored as one array per field.
///
/// ```rust
/// use soa_vec::{soa_record, SoaVec};
///
/// soa_record! {
///     #[derive(Clone, Debug, Default, PartialEq)]
///     pub struct Body {
///         pub mass: f64,
///         pub name: String,
///     }
/// }
///
/// let mut bodies = SoaVec::new();
/// bodies.push(Body { mass: 5.97e24, name: "earth".into() });
/// bodies.push(Body { mass: 7.35e22, name: "moon".into() });
///
/// let total: f64 = bodies.column(Body::mass).iter().sum();
/// assert!(total > 5.97e24);
/// assert_eq!(bodies.element(1).get(Body::name), "moon");
/// ```
pub struct SoaVec<R: Record> {
    store: FieldArrayStore<R>,
}

impl<R: Record> SoaVec<R> {
    // ── Construction ──────────────────────────────────────────────────────

    /// Empty vector.
    ///
    /// # Panics
    ///
    /// Panics if `R`'s provider is inconsistent (see [`SoaVec::try_new`]).
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(vec) => vec,
            Err(err) => panic!("cannot build a SoaVec: {err}"),
        }
    }

    /// Empty vector, reporting registration errors of `R`.
    pub fn try_new() -> SoaResult<Self> {
        Ok(Self { store: FieldArrayStore::try_new()? })
    }

    /// `count` default records.
    pub fn with_len(count: usize) -> Self {
        let mut vec = Self::new();
        vec.resize(count);
        vec
    }

    /// `count` copies of `value`.
    pub fn from_elem(count: usize, value: &R) -> Self {
        let mut vec = Self::new();
        vec.assign(count, value);
        vec
    }

    /// Move the contents out, leaving `self` empty.
    pub fn take(&mut self) -> Self {
        Self { store: self.store.take() }
    }

    /// Field metadata of `R`.
    pub fn fields(&self) -> &'static FieldSet {
        self.store.fields()
    }

    /// The underlying field array store.
    pub fn store(&self) -> &FieldArrayStore<R> {
        &self.store
    }

    // ── Assignment ────────────────────────────────────────────────────────

    /// Replace the contents with `count` copies of `value`.
    pub fn assign(&mut self, count: usize, value: &R) {
        self.store.assign(count, value);
    }

    /// Replace the contents with the records of `iter`.
    pub fn assign_iter(&mut self, iter: impl IntoIterator<Item = R>) {
        let mut staged: Vec<R> = iter.into_iter().collect();
        self.store.clear();
        self.store.insert_records(0, &mut staged);
    }

    pub fn assign_from_slice(&mut self, values: &[R]) {
        self.assign_iter(values.iter().cloned());
    }

    // ── Element access ────────────────────────────────────────────────────

    /// Checked access.
    ///
    /// # Errors
    ///
    /// [`SoaError::OutOfRange`] if `index >= len`.
    pub fn at(&self, index: usize) -> SoaResult<ElementRef<'_, R>> {
        self.check_index(index)?;
        Ok(Element::new(&self.store, index))
    }

    pub fn at_mut(&mut self, index: usize) -> SoaResult<ElementMut<'_, R>> {
        self.check_index(index)?;
        Ok(Element::new(&mut self.store, index))
    }

    fn check_index(&self, index: usize) -> SoaResult<()> {
        let len = self.len();
        if index < len { Ok(()) } else { Err(SoaError::OutOfRange { index, len }) }
    }

    /// Unchecked access: a proxy for `index` without the `OutOfRange`
    /// check [`at`](Self::at) performs.
    ///
    /// This trades the error path for speed in loops whose caller has
    /// already validated `index` against [`len`](Self::len).  A bad index
    /// is still caught, but as a panic on the first field access rather
    /// than as a [`SoaError`].  Use [`at`](Self::at) or [`get`](Self::get)
    /// when the index comes from outside.
    #[inline]
    pub fn element(&self, index: usize) -> ElementRef<'_, R> {
        Element::new(&self.store, index)
    }

    /// Unchecked read-write access; see [`element`](Self::element) for the
    /// tradeoff and [`at_mut`](Self::at_mut) for the checked form.
    #[inline]
    pub fn element_mut(&mut self, index: usize) -> ElementMut<'_, R> {
        Element::new(&mut self.store, index)
    }

    pub fn get(&self, index: usize) -> Option<ElementRef<'_, R>> {
        self.at(index).ok()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<ElementMut<'_, R>> {
        self.at_mut(index).ok()
    }

    pub fn front(&self) -> Option<ElementRef<'_, R>> {
        self.get(0)
    }

    pub fn front_mut(&mut self) -> Option<ElementMut<'_, R>> {
        self.get_mut(0)
    }

    pub fn back(&self) -> Option<ElementRef<'_, R>> {
        self.get(self.len().checked_sub(1)?)
    }

    pub fn back_mut(&mut self) -> Option<ElementMut<'_, R>> {
        let last = self.len().checked_sub(1)?;
        self.get_mut(last)
    }

    /// One field's values across all records, selected by index, name,
    /// [`ByType`](soa_core::ByType), or typed key.
    pub fn field_array<T: FieldValue>(&self, selector: impl FieldSelector<R, T>) -> SoaResult<&[T]> {
        self.store.field_array(selector)
    }

    pub fn field_array_mut<T: FieldValue>(
        &mut self,
        selector: impl FieldSelector<R, T>,
    ) -> SoaResult<&mut [T]> {
        self.store.field_array_mut(selector)
    }

    /// Values of the field named by a typed key.  Infallible: the key's type
    /// was fixed when `R` was declared.
    #[inline]
    pub fn column<T: FieldValue>(&self, key: Field<R, T>) -> &[T] {
        self.store.column(key)
    }

    #[inline]
    pub fn column_mut<T: FieldValue>(&mut self, key: Field<R, T>) -> &mut [T] {
        self.store.column_mut(key)
    }

    // ── Cursors and iteration ─────────────────────────────────────────────

    pub fn begin(&self) -> CursorRef<'_, R> {
        Cursor::new(&self.store, 0)
    }

    /// End sentinel (position `len`).
    pub fn end(&self) -> CursorRef<'_, R> {
        Cursor::new(&self.store, self.len())
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, R> {
        Cursor::new(&mut self.store, 0)
    }

    /// Read-write cursor at `pos` (`pos == len` gives the end sentinel).
    pub fn cursor_mut(&mut self, pos: usize) -> CursorMut<'_, R> {
        assert!(pos <= self.len(), "cursor position (is {pos}) should be <= len (is {})", self.len());
        Cursor::new(&mut self.store, pos)
    }

    pub fn iter(&self) -> Iter<'_, R> {
        Iter::new(&self.store, 0, self.len())
    }

    // ── Capacity ──────────────────────────────────────────────────────────

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Largest size the container could reach; bounded by the field with
    /// the widest element type.
    pub fn max_len(&self) -> usize {
        self.store.max_len()
    }

    /// Reserve room for `additional` more records in every field array.
    ///
    /// # Panics
    ///
    /// Panics if the allocation fails; nothing is changed in that case.
    pub fn reserve(&mut self, additional: usize) {
        self.store.reserve(additional);
    }

    /// # Errors
    ///
    /// [`SoaError::Allocation`] naming the field whose array could not grow.
    /// Capacity and contents are left as they were.
    pub fn try_reserve(&mut self, additional: usize) -> SoaResult<()> {
        self.store.try_reserve(additional)
    }

    /// Smallest capacity across the field arrays.
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn shrink_to_fit(&mut self) {
        self.store.shrink_to_fit();
    }

    // ── Insertion ─────────────────────────────────────────────────────────

    /// Insert `value` at `pos`, shifting later records back.  Returns a
    /// cursor at the new record.
    ///
    /// # Panics
    ///
    /// Panics if `pos > len`.
    pub fn insert(&mut self, pos: usize, value: R) -> CursorMut<'_, R> {
        self.store.insert_records(pos, &mut [value]);
        Cursor::new(&mut self.store, pos)
    }

    /// Insert `count` copies of `value` at `pos` with one shift per field
    /// array.
    pub fn insert_n(&mut self, pos: usize, count: usize, value: &R) -> CursorMut<'_, R> {
        let mut staged = vec![value.clone(); count];
        self.store.insert_records(pos, &mut staged);
        Cursor::new(&mut self.store, pos)
    }

    /// Insert the records of `iter` at `pos`, keeping their order.
    pub fn insert_iter(&mut self, pos: usize, iter: impl IntoIterator<Item = R>) -> CursorMut<'_, R> {
        let mut staged: Vec<R> = iter.into_iter().collect();
        self.store.insert_records(pos, &mut staged);
        Cursor::new(&mut self.store, pos)
    }

    pub fn insert_slice(&mut self, pos: usize, values: &[R]) -> CursorMut<'_, R> {
        self.insert_iter(pos, values.iter().cloned())
    }

    pub fn push(&mut self, value: R) {
        self.store.push(value);
    }

    /// Fallible [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// [`SoaError::Allocation`]; the container is unchanged.
    pub fn try_insert(&mut self, pos: usize, value: R) -> SoaResult<CursorMut<'_, R>> {
        self.store.try_insert_records(pos, &mut [value])?;
        Ok(Cursor::new(&mut self.store, pos))
    }

    pub fn try_insert_n(&mut self, pos: usize, count: usize, value: &R) -> SoaResult<CursorMut<'_, R>> {
        self.store.try_reserve(count)?;
        let mut staged = Vec::new();
        staged
            .try_reserve_exact(count)
            .map_err(|source| SoaError::Allocation { field: "(staged records)", source })?;
        staged.resize(count, value.clone());
        self.store.try_insert_records(pos, &mut staged)?;
        Ok(Cursor::new(&mut self.store, pos))
    }

    pub fn try_push(&mut self, value: R) -> SoaResult<()> {
        self.store.try_push(value)
    }

    // ── Removal ───────────────────────────────────────────────────────────

    /// Remove the record at `pos`.  The returned cursor sits at `pos`, which
    /// now holds the following record (or is the end).
    ///
    /// # Panics
    ///
    /// Panics if `pos >= len`.
    pub fn erase(&mut self, pos: usize) -> CursorMut<'_, R> {
        let len = self.len();
        assert!(pos < len, "removal index (is {pos}) should be < len (is {len})");
        self.store.remove_range(pos, pos + 1);
        Cursor::new(&mut self.store, pos)
    }

    /// Remove `range`, returning a cursor at `range.start`.
    pub fn erase_range(&mut self, range: Range<usize>) -> CursorMut<'_, R> {
        self.store.remove_range(range.start, range.end);
        Cursor::new(&mut self.store, range.start)
    }

    pub fn pop(&mut self) -> Option<R> {
        self.store.pop()
    }

    pub fn truncate(&mut self, len: usize) {
        self.store.truncate(len);
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Keep only the records whose proxy satisfies `keep`, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(ElementRef<'_, R>) -> bool) {
        let mask: Vec<bool> = self.iter().map(&mut keep).collect();
        self.store.retain_mask(&mask);
    }

    // ── Resizing ──────────────────────────────────────────────────────────

    /// Grow with default records or truncate to `count`.
    pub fn resize(&mut self, count: usize) {
        self.store.resize_default(count);
    }

    /// Grow with copies of `value` or truncate to `count`.
    pub fn resize_with_value(&mut self, count: usize, value: &R) {
        let len = self.len();
        if count > len {
            self.insert_n(len, count - len, value);
        } else {
            self.truncate(count);
        }
    }

    pub fn try_resize(&mut self, count: usize) -> SoaResult<()> {
        self.store.try_resize_default(count)
    }

    // ── Whole-record moves ────────────────────────────────────────────────

    /// Exchange contents with `other` in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        self.store.swap(&mut other.store);
    }

    /// Exchange the records at `a` and `b`.
    pub fn swap_elements(&mut self, a: usize, b: usize) {
        self.store.swap_records(a, b);
    }

    /// `self[to] = self[from]`, without materialising a record.
    pub fn copy_element(&mut self, from: usize, to: usize) {
        self.store.copy_record(from, to);
    }
}

// ── Trait impls ───────────────────────────────────────────────────────────────

impl<R: Record> Default for SoaVec<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Clone for SoaVec<R> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }

    fn clone_from(&mut self, source: &Self) {
        self.store.clone_from(&source.store);
    }
}

impl<R: Record> From<Vec<R>> for SoaVec<R> {
    fn from(mut values: Vec<R>) -> Self {
        let mut vec = Self::new();
        vec.store.insert_records(0, &mut values);
        vec
    }
}

impl<R: Record, const N: usize> From<[R; N]> for SoaVec<R> {
    fn from(values: [R; N]) -> Self {
        Self::from(Vec::from(values))
    }
}

impl<R: Record> FromIterator<R> for SoaVec<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<R>>())
    }
}

impl<R: Record> Extend<R> for SoaVec<R> {
    fn extend<I: IntoIterator<Item = R>>(&mut self, iter: I) {
        let mut staged: Vec<R> = iter.into_iter().collect();
        let len = self.len();
        self.store.insert_records(len, &mut staged);
    }
}

impl<R: Record> IntoIterator for SoaVec<R> {
    type Item = R;
    type IntoIter = IntoIter<R>;

    fn into_iter(self) -> IntoIter<R> {
        IntoIter::new(self.store)
    }
}

impl<'a, R: Record> IntoIterator for &'a SoaVec<R> {
    type Item = ElementRef<'a, R>;
    type IntoIter = Iter<'a, R>;

    fn into_iter(self) -> Iter<'a, R> {
        self.iter()
    }
}

impl<R: Record + PartialEq> PartialEq for SoaVec<R> {
    /// Element-wise.  Comparing a vector with itself never reads a field.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<R: Record + fmt::Debug> fmt::Debug for SoaVec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|e| e.value())).finish()
    }
}
