//! Field arrays: one growable column of values per record field.
//!
//! A container cannot name `Vec<i32>` and `Vec<String>` in the same list, so
//! it keeps `Box<dyn FieldArray>` and only meets the element type again when
//! a caller asks for a typed slice.  [`TypedFieldArray<T>`] is the single
//! implementation.
//!
//! Values enter and leave through the record provider as `&dyn Any` slots
//! ([`Record::field`](crate::Record::field)).  Registration has already
//! checked those slots against the field descriptors, so a slot of the wrong
//! type here means the record type lied, and the array panics.
//!
//! Whole records are moved in with the `*_taken` methods, which empty each
//! slot with [`std::mem::take`].  Any cloning a caller needs happens before
//! the first array is touched; once a multi-array operation starts, it only
//! moves values.

use std::any::{Any, type_name};
use std::collections::TryReserveError;
use std::mem;

/// Bounds every field type must satisfy.
///
/// `Default` fills slots on `resize` and backs the move-out protocol;
/// `Send + Sync` keeps containers shareable across threads.
pub trait FieldValue: Clone + Default + Send + Sync + 'static {}

impl<T: Clone + Default + Send + Sync + 'static> FieldValue for T {}

// ── Trait object ──────────────────────────────────────────────────────────────

/// Operations a container runs on every field column without knowing its
/// element type.
///
/// Only [`TypedFieldArray`] implements it; the `Sealed` supertrait is
/// private, so every column behind a `Box<dyn FieldArray>` is a plain
/// `Vec<T>` whose length changes only through these methods.
pub trait FieldArray: Send + Sync + 'static + sealed::Sealed {
    /// Number of stored values.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    /// Largest length the array could theoretically reach.
    fn max_len(&self) -> usize;

    /// `std::any::type_name` of the element type.
    fn element_type(&self) -> &'static str;

    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError>;

    fn shrink_to(&mut self, min_capacity: usize);

    fn shrink_to_fit(&mut self);

    fn clear(&mut self);

    fn truncate(&mut self, len: usize);

    /// Grow or shrink to `len`, filling new slots with `T::default()`.
    fn resize_default(&mut self, len: usize);

    /// Append the value moved out of `value`.
    fn push_taken(&mut self, value: &mut dyn Any);

    /// Insert the values moved out of `values` at `pos`, in order, with a
    /// single shift of the tail.
    fn insert_taken<'a>(&mut self, pos: usize, values: &mut dyn Iterator<Item = &'a mut dyn Any>);

    /// Remove `start..end`, shifting the tail back.
    fn remove_range(&mut self, start: usize, end: usize);

    /// Pop the last value into `slot`.  Returns `false` if empty.
    fn pop_into(&mut self, slot: &mut dyn Any) -> bool;

    /// Clone the value at `index` into `slot`.
    fn read_into(&self, index: usize, slot: &mut dyn Any);

    /// Exchange the value at `index` with the one in `value`.
    fn swap_slot(&mut self, index: usize, value: &mut dyn Any);

    /// Exchange the values at `a` and `b`.
    fn swap(&mut self, a: usize, b: usize);

    /// Exchange `self[a]` with `other[b]`; `other` must hold the same type.
    fn swap_across(&mut self, a: usize, other: &mut dyn FieldArray, b: usize);

    /// `self[to] = self[from].clone()`.
    fn clone_within(&mut self, from: usize, to: usize);

    /// Keep exactly the positions where `keep` is `true`.
    fn retain_mask(&mut self, keep: &[bool]);

    /// Replace contents with a clone of `other`, reusing the allocation.
    fn clone_from_array(&mut self, other: &dyn FieldArray);

    fn clone_array(&self) -> Box<dyn FieldArray>;

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

mod sealed {
    pub trait Sealed {}
}

impl dyn FieldArray {
    /// Typed view of the stored values, or `None` if `T` is not the element
    /// type.
    pub fn downcast_ref<T: FieldValue>(&self) -> Option<&[T]> {
        self.as_any()
            .downcast_ref::<TypedFieldArray<T>>()
            .map(|a| a.0.as_slice())
    }

    /// Mutable typed view.  The slice length is fixed: values can be
    /// overwritten but the array cannot grow or shrink through it.
    pub fn downcast_mut<T: FieldValue>(&mut self) -> Option<&mut [T]> {
        self.as_any_mut()
            .downcast_mut::<TypedFieldArray<T>>()
            .map(|a| a.0.as_mut_slice())
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// A `Vec<T>` wrapped so it can be stored as `Box<dyn FieldArray>`.
///
/// Not constructed directly by users; each
/// [`FieldDescriptor`](crate::FieldDescriptor) carries a factory for its
/// field's array.
pub struct TypedFieldArray<T: FieldValue>(Vec<T>);

impl<T: FieldValue> TypedFieldArray<T> {
    /// An empty array boxed behind the trait object.
    pub fn boxed() -> Box<dyn FieldArray> {
        Box::new(Self(Vec::new()))
    }
}

/// Downcast a record field handed over by a provider.
fn value_mut<T: 'static>(value: &mut dyn Any) -> &mut T {
    match value.downcast_mut::<T>() {
        Some(v) => v,
        None => panic!("record field is not a `{}`", type_name::<T>()),
    }
}

impl<T: FieldValue> sealed::Sealed for TypedFieldArray<T> {}

impl<T: FieldValue> FieldArray for TypedFieldArray<T> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn capacity(&self) -> usize {
        self.0.capacity()
    }

    fn max_len(&self) -> usize {
        match mem::size_of::<T>() {
            0 => usize::MAX,
            size => isize::MAX as usize / size,
        }
    }

    fn element_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.0.try_reserve(additional)
    }

    fn shrink_to(&mut self, min_capacity: usize) {
        self.0.shrink_to(min_capacity);
    }

    fn shrink_to_fit(&mut self) {
        self.0.shrink_to_fit();
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    fn resize_default(&mut self, len: usize) {
        self.0.resize_with(len, T::default);
    }

    fn push_taken(&mut self, value: &mut dyn Any) {
        self.0.push(mem::take(value_mut::<T>(value)));
    }

    fn insert_taken<'a>(&mut self, pos: usize, values: &mut dyn Iterator<Item = &'a mut dyn Any>) {
        self.0
            .splice(pos..pos, values.map(|v| mem::take(value_mut::<T>(v))));
    }

    fn remove_range(&mut self, start: usize, end: usize) {
        self.0.drain(start..end);
    }

    fn pop_into(&mut self, slot: &mut dyn Any) -> bool {
        match self.0.pop() {
            Some(v) => {
                *value_mut::<T>(slot) = v;
                true
            }
            None => false,
        }
    }

    fn read_into(&self, index: usize, slot: &mut dyn Any) {
        value_mut::<T>(slot).clone_from(&self.0[index]);
    }

    fn swap_slot(&mut self, index: usize, value: &mut dyn Any) {
        mem::swap(&mut self.0[index], value_mut::<T>(value));
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.0.swap(a, b);
    }

    fn swap_across(&mut self, a: usize, other: &mut dyn FieldArray, b: usize) {
        let other = match other.as_any_mut().downcast_mut::<Self>() {
            Some(o) => o,
            None => panic!("field arrays of different types cannot exchange values"),
        };
        mem::swap(&mut self.0[a], &mut other.0[b]);
    }

    fn clone_within(&mut self, from: usize, to: usize) {
        if from != to {
            let value = self.0[from].clone();
            self.0[to] = value;
        }
    }

    fn retain_mask(&mut self, keep: &[bool]) {
        let mut i = 0;
        self.0.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
    }

    fn clone_from_array(&mut self, other: &dyn FieldArray) {
        match other.as_any().downcast_ref::<Self>() {
            Some(o) => self.0.clone_from(&o.0),
            None => panic!("field arrays of different types cannot be cloned into each other"),
        }
    }

    fn clone_array(&self) -> Box<dyn FieldArray> {
        Box::new(Self(self.0.clone()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
