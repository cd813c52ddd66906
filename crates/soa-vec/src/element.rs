//! Element proxies: a non-owning `(store, index)` view of one record.
//!
//! A proxy never copies field data.  [`Element::get`] / [`Element::field`]
//! return references straight into the field arrays; [`Element::value`]
//! materialises a full record only when asked.
//!
//! # Read-only and read-write views
//!
//! `Element<S>` is generic over how it holds the store.  `S = &Store` gives
//! [`ElementRef`], `S = &mut Store` gives [`ElementMut`].  Read accessors
//! live in one `impl` bounded by `Deref`, write accessors in one bounded by
//! `DerefMut`, so the two views share every line of read logic.
//!
//! Because a proxy borrows its store, the borrow checker rejects any
//! structural mutation of the container while a proxy is alive.

use std::fmt;
use std::ops::{Deref, DerefMut};

use soa_core::{Field, FieldSelector, FieldValue, Record, SoaResult};

use crate::FieldArrayStore;

/// Proxy for the record at `index` of a [`FieldArrayStore`].
#[derive(Clone, Copy)]
pub struct Element<S> {
    store: S,
    index: usize,
}

/// Read-only proxy.
pub type ElementRef<'a, R> = Element<&'a FieldArrayStore<R>>;

/// Read-write proxy.
pub type ElementMut<'a, R> = Element<&'a mut FieldArrayStore<R>>;

impl<S> Element<S> {
    pub(crate) fn new(store: S, index: usize) -> Self {
        Self { store, index }
    }

    /// Position of the record in its container.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

// ── Read access ───────────────────────────────────────────────────────────────

impl<R, S> Element<S>
where
    R: Record,
    S: Deref<Target = FieldArrayStore<R>>,
{
    /// Reference to one field of this record, selected by index, name,
    /// [`ByType`](soa_core::ByType), or typed key.
    pub fn field<T: FieldValue>(&self, selector: impl FieldSelector<R, T>) -> SoaResult<&T> {
        Ok(&self.store.field_array(selector)?[self.index])
    }

    /// Reference to the field named by a typed key.
    #[inline]
    pub fn get<T: FieldValue>(&self, key: Field<R, T>) -> &T {
        &self.store.column(key)[self.index]
    }

    /// Materialise the whole record.
    pub fn value(&self) -> R {
        self.store.value_at(self.index)
    }

    /// Read-only proxy for the same record.
    pub fn view(&self) -> ElementRef<'_, R> {
        Element::new(&*self.store, self.index)
    }

    /// `true` if both proxies point at the same slot of the same store.
    pub fn same_slot<S2>(&self, other: &Element<S2>) -> bool
    where
        S2: Deref<Target = FieldArrayStore<R>>,
    {
        std::ptr::eq(&*self.store, &*other.store) && self.index == other.index
    }
}

// ── Write access ──────────────────────────────────────────────────────────────

impl<R, S> Element<S>
where
    R: Record,
    S: DerefMut<Target = FieldArrayStore<R>>,
{
    /// Mutable reference to one field.  Writes go straight to the field
    /// array.
    pub fn field_mut<T: FieldValue>(
        &mut self,
        selector: impl FieldSelector<R, T>,
    ) -> SoaResult<&mut T> {
        let index = self.index;
        Ok(&mut self.store.field_array_mut(selector)?[index])
    }

    #[inline]
    pub fn get_mut<T: FieldValue>(&mut self, key: Field<R, T>) -> &mut T {
        let index = self.index;
        &mut self.store.column_mut(key)[index]
    }

    /// Overwrite every field of this record with the fields of `value`.
    pub fn set(&mut self, value: R) {
        self.replace(value);
    }

    /// Overwrite this record and return what was there.
    pub fn replace(&mut self, value: R) -> R {
        self.store.replace_at(self.index, value)
    }

    /// Shorter-lived read-write proxy for the same record.
    pub fn reborrow(&mut self) -> ElementMut<'_, R> {
        Element::new(&mut *self.store, self.index)
    }

    /// Exchange this record with `other`, which lives in a different store,
    /// field by field without materialising either record.
    ///
    /// For two positions of one container use
    /// [`SoaVec::swap_elements`](crate::SoaVec::swap_elements).
    pub fn swap_with<S2>(&mut self, other: &mut Element<S2>)
    where
        S2: DerefMut<Target = FieldArrayStore<R>>,
    {
        let (a, b) = (self.index, other.index);
        self.store.swap_records_with(a, &mut *other.store, b);
    }
}

/// Exchange two records of different stores.  See [`Element::swap_with`].
pub fn swap<R: Record>(a: &mut ElementMut<'_, R>, b: &mut ElementMut<'_, R>) {
    a.swap_with(b);
}

// ── Comparison ────────────────────────────────────────────────────────────────

impl<R, S, S2> PartialEq<Element<S2>> for Element<S>
where
    R: Record + PartialEq,
    S: Deref<Target = FieldArrayStore<R>>,
    S2: Deref<Target = FieldArrayStore<R>>,
{
    /// Same slot of the same store compares equal without reading any
    /// field; otherwise both records are materialised and compared.
    fn eq(&self, other: &Element<S2>) -> bool {
        self.same_slot(other) || self.value() == other.value()
    }
}

impl<R, S> PartialEq<R> for Element<S>
where
    R: Record + PartialEq,
    S: Deref<Target = FieldArrayStore<R>>,
{
    fn eq(&self, other: &R) -> bool {
        self.value() == *other
    }
}

impl<R, S> fmt::Debug for Element<S>
where
    R: Record + fmt::Debug,
    S: Deref<Target = FieldArrayStore<R>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("index", &self.index)
            .field("value", &self.value())
            .finish()
    }
}
