//! `FieldArrayStore` — the owned struct-of-arrays data.
//!
//! # Layout
//!
//! One `Box<dyn FieldArray>` per record field, in field index order.  The
//! logical record at position `i` is the `i`-th value of every array:
//!
//! ```text
//! arrays[0]: [ r0.f0, r1.f0, r2.f0, … ]
//! arrays[1]: [ r0.f1, r1.f1, r2.f1, … ]
//! ```
//!
//! # Lockstep invariant
//!
//! Every array has the same length at every public boundary.  Structural
//! operations keep it by reserving capacity on all arrays first (with
//! rollback on failure), then applying moves that cannot fail.  Values that
//! need cloning are cloned into staged records before any array is touched.

use std::any::Any;
use std::marker::PhantomData;
use std::mem;

use soa_core::{
    Field, FieldArray, FieldSelector, FieldSet, FieldValue, Record, SoaError, SoaResult, registry,
};

/// Field `index` of `record`, as handed out by its provider.
///
/// The registry verified the provider for every index below the field count.
fn field_mut<R: Record>(record: &mut R, index: usize) -> &mut dyn Any {
    match record.field_mut(index) {
        Some(value) => value,
        None => panic!("record provider lost field {index}"),
    }
}

/// Structure-of-Arrays storage for all records of one container.
pub struct FieldArrayStore<R: Record> {
    fields:  &'static FieldSet,
    arrays:  Vec<Box<dyn FieldArray>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> FieldArrayStore<R> {
    /// Empty store, registering `R` on first use.
    ///
    /// # Errors
    ///
    /// Registration errors of `R` (see [`registry::register`]).
    pub fn try_new() -> SoaResult<Self> {
        let fields = registry::register::<R>()?;
        Ok(Self {
            fields,
            arrays: fields.new_arrays(),
            _record: PhantomData,
        })
    }

    /// Field metadata of `R`.
    #[inline]
    pub fn fields(&self) -> &'static FieldSet {
        self.fields
    }

    /// Logical size: the length of every field array.
    #[inline]
    pub fn len(&self) -> usize {
        self.arrays.first().map_or(0, |a| a.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records storable without reallocating any array.
    pub fn capacity(&self) -> usize {
        self.arrays.iter().map(|a| a.capacity()).min().unwrap_or(0)
    }

    /// Largest size the widest field array could reach.
    pub fn max_len(&self) -> usize {
        self.arrays.iter().map(|a| a.max_len()).min().unwrap_or(usize::MAX)
    }

    /// Length of each field array, in field order.  Equal by invariant.
    pub fn field_lens(&self) -> impl Iterator<Item = usize> + '_ {
        self.arrays.iter().map(|a| a.len())
    }

    pub fn is_lockstep(&self) -> bool {
        let len = self.len();
        self.field_lens().all(|l| l == len)
    }

    // ── Capacity ──────────────────────────────────────────────────────────

    /// Reserve room for `additional` more records in every array.
    ///
    /// All-or-nothing: if any array cannot grow, the arrays that already
    /// grew are shrunk back to their previous capacity before the error is
    /// returned.  Lengths never change.
    pub fn try_reserve(&mut self, additional: usize) -> SoaResult<()> {
        let before: Vec<usize> = self.arrays.iter().map(|a| a.capacity()).collect();
        for i in 0..self.arrays.len() {
            if let Err(source) = self.arrays[i].try_reserve(additional) {
                for (array, &capacity) in self.arrays[..i].iter_mut().zip(&before) {
                    array.shrink_to(capacity);
                }
                let field = self.fields.fields()[i].name();
                tracing::warn!(
                    record = self.fields.record_name(),
                    field,
                    additional,
                    "field array growth failed; rolled back"
                );
                return Err(SoaError::Allocation { field, source });
            }
        }
        Ok(())
    }

    /// Like [`try_reserve`](Self::try_reserve) but panics on failure, the
    /// way `Vec::reserve` does.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            panic!("{err}");
        }
    }

    pub fn shrink_to_fit(&mut self) {
        for array in &mut self.arrays {
            array.shrink_to_fit();
        }
    }

    // ── Field arrays ──────────────────────────────────────────────────────

    fn typed<T: FieldValue>(&self, index: usize) -> &[T] {
        let array = &*self.arrays[index];
        match array.downcast_ref::<T>() {
            Some(values) => values,
            None => self.wrong_type::<T>(index),
        }
    }

    fn typed_mut<T: FieldValue>(&mut self, index: usize) -> &mut [T] {
        if self.arrays[index].downcast_ref::<T>().is_none() {
            self.wrong_type::<T>(index);
        }
        match self.arrays[index].downcast_mut::<T>() {
            Some(values) => values,
            None => unreachable!(),
        }
    }

    #[cold]
    fn wrong_type<T>(&self, index: usize) -> ! {
        panic!(
            "field {index} of `{}` stores `{}`, not `{}`",
            self.fields.record_name(),
            self.arrays[index].element_type(),
            std::any::type_name::<T>()
        )
    }

    /// Window over one field's live values, selected by index, name,
    /// [`ByType`](soa_core::ByType), or typed key.
    pub fn field_array<T: FieldValue>(&self, selector: impl FieldSelector<R, T>) -> SoaResult<&[T]> {
        let index = selector.resolve(self.fields)?;
        Ok(self.typed(index))
    }

    /// Mutable window over one field's live values.  Its length is fixed to
    /// the current size.
    pub fn field_array_mut<T: FieldValue>(
        &mut self,
        selector: impl FieldSelector<R, T>,
    ) -> SoaResult<&mut [T]> {
        let index = selector.resolve(self.fields)?;
        Ok(self.typed_mut(index))
    }

    /// Values of the field named by a typed key.
    #[inline]
    pub fn column<T: FieldValue>(&self, key: Field<R, T>) -> &[T] {
        self.typed(key.index())
    }

    #[inline]
    pub fn column_mut<T: FieldValue>(&mut self, key: Field<R, T>) -> &mut [T] {
        self.typed_mut(key.index())
    }

    // ── Whole-record access ───────────────────────────────────────────────

    /// Assemble the record at `index` by cloning each field.
    pub fn value_at(&self, index: usize) -> R {
        let mut out = R::default();
        for (i, array) in self.arrays.iter().enumerate() {
            array.read_into(index, field_mut(&mut out, i));
        }
        out
    }

    /// Scatter `value` into position `index`, returning the previous record.
    pub fn replace_at(&mut self, index: usize, mut value: R) -> R {
        assert!(index < self.len(), "index {index} out of range for length {}", self.len());
        for (i, array) in self.arrays.iter_mut().enumerate() {
            array.swap_slot(index, field_mut(&mut value, i));
        }
        value
    }

    /// Move the record at `index` out, leaving default field values behind.
    pub(crate) fn take_at(&mut self, index: usize) -> R {
        self.replace_at(index, R::default())
    }

    /// Exchange the records at `a` and `b`, field by field.
    pub fn swap_records(&mut self, a: usize, b: usize) {
        let len = self.len();
        assert!(a < len && b < len, "swap indices ({a}, {b}) out of range for length {len}");
        for array in &mut self.arrays {
            array.swap(a, b);
        }
    }

    /// Exchange `self[a]` with `other[b]`, field by field.
    pub fn swap_records_with(&mut self, a: usize, other: &mut Self, b: usize) {
        assert!(a < self.len(), "index {a} out of range for length {}", self.len());
        assert!(b < other.len(), "index {b} out of range for length {}", other.len());
        for (mine, theirs) in self.arrays.iter_mut().zip(other.arrays.iter_mut()) {
            mine.swap_across(a, &mut **theirs, b);
        }
    }

    /// `self[to] = self[from]`, field by field.
    pub fn copy_record(&mut self, from: usize, to: usize) {
        let len = self.len();
        assert!(from < len && to < len, "copy indices ({from}, {to}) out of range for length {len}");
        for array in &mut self.arrays {
            array.clone_within(from, to);
        }
    }

    // ── Structural mutation ───────────────────────────────────────────────

    fn check_insert(&self, pos: usize) {
        let len = self.len();
        assert!(pos <= len, "insertion index (is {pos}) should be <= len (is {len})");
    }

    /// Move `records` into every array at `pos`.  Capacity must already be
    /// reserved, so no array reallocates and nothing can fail midway.
    fn splice_reserved(&mut self, pos: usize, records: &mut [R]) {
        if records.is_empty() {
            return;
        }
        for (i, array) in self.arrays.iter_mut().enumerate() {
            let mut values = records.iter_mut().map(|r| field_mut(r, i));
            array.insert_taken(pos, &mut values);
        }
        debug_assert!(self.is_lockstep());
    }

    /// Insert `records` at `pos`, preserving their order.
    pub fn insert_records(&mut self, pos: usize, records: &mut [R]) {
        self.check_insert(pos);
        self.reserve(records.len());
        self.splice_reserved(pos, records);
    }

    /// Fallible [`insert_records`](Self::insert_records): on allocation
    /// failure the store is unchanged.
    pub fn try_insert_records(&mut self, pos: usize, records: &mut [R]) -> SoaResult<()> {
        self.check_insert(pos);
        self.try_reserve(records.len())?;
        self.splice_reserved(pos, records);
        Ok(())
    }

    pub fn push(&mut self, value: R) {
        let len = self.len();
        self.insert_records(len, &mut [value]);
    }

    pub fn try_push(&mut self, value: R) -> SoaResult<()> {
        let len = self.len();
        self.try_insert_records(len, &mut [value])
    }

    /// Remove and return the last record.
    pub fn pop(&mut self) -> Option<R> {
        if self.is_empty() {
            return None;
        }
        let mut out = R::default();
        for (i, array) in self.arrays.iter_mut().enumerate() {
            array.pop_into(field_mut(&mut out, i));
        }
        Some(out)
    }

    /// Remove positions `start..end`, shifting the tail back.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        let len = self.len();
        assert!(start <= end, "range start (is {start}) should be <= range end (is {end})");
        assert!(end <= len, "range end (is {end}) should be <= len (is {len})");
        for array in &mut self.arrays {
            array.remove_range(start, end);
        }
    }

    pub fn truncate(&mut self, len: usize) {
        for array in &mut self.arrays {
            array.truncate(len);
        }
    }

    pub fn clear(&mut self) {
        for array in &mut self.arrays {
            array.clear();
        }
    }

    /// Grow with default field values or shrink to `len`.
    pub fn resize_default(&mut self, len: usize) {
        let current = self.len();
        if len > current {
            self.reserve(len - current);
        }
        for array in &mut self.arrays {
            array.resize_default(len);
        }
    }

    pub fn try_resize_default(&mut self, len: usize) -> SoaResult<()> {
        let current = self.len();
        if len > current {
            self.try_reserve(len - current)?;
        }
        for array in &mut self.arrays {
            array.resize_default(len);
        }
        Ok(())
    }

    /// Replace the contents with `count` copies of `value`.
    pub fn assign(&mut self, count: usize, value: &R) {
        let mut staged = vec![value.clone(); count];
        self.clear();
        self.insert_records(0, &mut staged);
    }

    /// Keep the positions where `keep` is `true`.
    pub fn retain_mask(&mut self, keep: &[bool]) {
        assert_eq!(keep.len(), self.len(), "retain mask length must equal the store length");
        for array in &mut self.arrays {
            array.retain_mask(keep);
        }
    }

    /// Exchange all field arrays with `other` in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.arrays, &mut other.arrays);
    }

    /// Move the contents out, leaving this store empty.
    pub fn take(&mut self) -> Self {
        Self {
            fields:  self.fields,
            arrays:  mem::replace(&mut self.arrays, self.fields.new_arrays()),
            _record: PhantomData,
        }
    }
}

impl<R: Record> Clone for FieldArrayStore<R> {
    fn clone(&self) -> Self {
        Self {
            fields:  self.fields,
            arrays:  self.arrays.iter().map(|a| a.clone_array()).collect(),
            _record: PhantomData,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        for (mine, theirs) in self.arrays.iter_mut().zip(&source.arrays) {
            mine.clone_from_array(&**theirs);
        }
    }
}
