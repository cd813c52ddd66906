//! Field descriptors: the static, per-record-type metadata table.
//!
//! A [`FieldSet`] is an ordered list of [`FieldDescriptor`]s with two lookup
//! indices built once at [`FieldSetBuilder::build`] time:
//!
//! | Lookup              | Cost | Failure                                      |
//! |---------------------|------|----------------------------------------------|
//! | by index            | O(1) | `FieldIndexOutOfRange`                       |
//! | by name             | O(1) | `UnknownField`                               |
//! | by type (if unique) | O(1) | `NoFieldOfType`, `AmbiguousFieldType`        |
//!
//! Type lookup never guesses.  When two fields share a type, the type is
//! recorded as ambiguous at build time and every by-type lookup for it fails.
//!
//! # Selectors
//!
//! Container accessors take any [`FieldSelector`]: a field index (`usize`),
//! a name (`&str`), [`ByType`], or a typed [`Field`] key.  Index and name
//! selectors are checked against the requested element type.

use std::any::{TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;

use crate::array::{FieldArray, FieldValue, TypedFieldArray};
use crate::{SoaError, SoaResult};

#[cfg(feature = "fx-hash")]
pub(crate) type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type Map<K, V> = std::collections::HashMap<K, V>;

// ── FieldDescriptor ───────────────────────────────────────────────────────────

/// Index, name, and type of one record field.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    index:      usize,
    name:       &'static str,
    type_id:    TypeId,
    type_name:  &'static str,
    size:       usize,
    make_array: fn() -> Box<dyn FieldArray>,
}

impl FieldDescriptor {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// `size_of` the field type, i.e. the stride of its array.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// A fresh, empty array for this field.
    pub fn new_array(&self) -> Box<dyn FieldArray> {
        (self.make_array)()
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("size", &self.size)
            .finish()
    }
}

// ── FieldSet ──────────────────────────────────────────────────────────────────

/// Ordered, immutable field metadata for one record type.
///
/// Obtain one through [`crate::registry::register`] (cached process-wide) or
/// build one directly with [`FieldSet::builder`].
pub struct FieldSet {
    record:  &'static str,
    fields:  Vec<FieldDescriptor>,
    by_name: Map<&'static str, usize>,
    /// Every field index of each type, in declaration order.
    by_type: Map<TypeId, Vec<usize>>,
}

impl FieldSet {
    pub fn builder(record: &'static str) -> FieldSetBuilder {
        FieldSetBuilder::new(record)
    }

    /// Name of the record type these fields belong to.
    #[inline]
    pub fn record_name(&self) -> &'static str {
        self.record
    }

    /// Number of fields (`N`).  Never zero.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Descriptor at `index`, or `FieldIndexOutOfRange`.
    pub fn descriptor(&self, index: usize) -> SoaResult<&FieldDescriptor> {
        self.fields.get(index).ok_or(SoaError::FieldIndexOutOfRange {
            record: self.record,
            index,
            count: self.fields.len(),
        })
    }

    pub fn name_of(&self, index: usize) -> Option<&'static str> {
        self.get(index).map(FieldDescriptor::name)
    }

    pub fn type_name_of(&self, index: usize) -> Option<&'static str> {
        self.get(index).map(FieldDescriptor::type_name)
    }

    pub fn type_id_of(&self, index: usize) -> Option<TypeId> {
        self.get(index).map(FieldDescriptor::type_id)
    }

    pub fn index_of_name(&self, name: &str) -> SoaResult<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SoaError::UnknownField {
                record: self.record,
                name:   name.to_owned(),
            })
    }

    /// Index of the only field of type `T`.
    ///
    /// # Errors
    ///
    /// `NoFieldOfType` if no field has type `T`, `AmbiguousFieldType` if more
    /// than one does.
    pub fn index_of_type<T: 'static>(&self) -> SoaResult<usize> {
        let type_name = type_name::<T>();
        match self.by_type.get(&TypeId::of::<T>()).map(Vec::as_slice) {
            Some([index]) => Ok(*index),
            Some(indices) if !indices.is_empty() => Err(SoaError::AmbiguousFieldType {
                record:     self.record,
                type_name,
                candidates: indices.iter().map(|&i| self.fields[i].name).collect(),
            }),
            _ => Err(SoaError::NoFieldOfType { record: self.record, type_name }),
        }
    }

    /// `true` if more than one field has type `T`.
    pub fn is_ambiguous<T: 'static>(&self) -> bool {
        self.by_type
            .get(&TypeId::of::<T>())
            .is_some_and(|indices| indices.len() > 1)
    }

    /// Type names shared by more than one field, in first-declaration order.
    /// By-type lookup is rejected for each of them.
    pub fn ambiguous_types(&self) -> Vec<&'static str> {
        let mut seen = Vec::new();
        for field in &self.fields {
            if self.by_type[&field.type_id].len() > 1 && !seen.contains(&field.type_name) {
                seen.push(field.type_name);
            }
        }
        seen
    }

    /// Verify that field `index` stores `T` and return the index unchanged.
    pub fn check_type<T: 'static>(&self, index: usize) -> SoaResult<usize> {
        let field = self.descriptor(index)?;
        if field.type_id == TypeId::of::<T>() {
            Ok(index)
        } else {
            Err(SoaError::FieldTypeMismatch {
                record:    self.record,
                field:     field.name,
                stored:    field.type_name,
                requested: type_name::<T>(),
            })
        }
    }

    /// One fresh, empty array per field, in index order.
    pub fn new_arrays(&self) -> Vec<Box<dyn FieldArray>> {
        self.fields.iter().map(FieldDescriptor::new_array).collect()
    }
}

impl fmt::Debug for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSet")
            .field("record", &self.record)
            .field("fields", &self.fields)
            .finish()
    }
}

// ── FieldSetBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`FieldSet`].
///
/// ```rust
/// use soa_core::FieldSet;
///
/// let fields = FieldSet::builder("Sample")
///     .field::<i32>("id")
///     .field::<String>("label")
///     .build()
///     .unwrap();
/// assert_eq!(fields.index_of_name("label").unwrap(), 1);
/// ```
pub struct FieldSetBuilder {
    record: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl FieldSetBuilder {
    pub fn new(record: &'static str) -> Self {
        Self { record, fields: Vec::new() }
    }

    /// Append a field of type `T`.  Indices follow call order.
    pub fn field<T: FieldValue>(mut self, name: &'static str) -> Self {
        self.fields.push(FieldDescriptor {
            index:      self.fields.len(),
            name,
            type_id:    TypeId::of::<T>(),
            type_name:  type_name::<T>(),
            size:       std::mem::size_of::<T>(),
            make_array: TypedFieldArray::<T>::boxed,
        });
        self
    }

    /// Validate and build the lookup indices.
    ///
    /// # Errors
    ///
    /// `EmptyRecord` if no field was added, `DuplicateFieldName` if a name
    /// appears twice.
    pub fn build(self) -> SoaResult<FieldSet> {
        if self.fields.is_empty() {
            return Err(SoaError::EmptyRecord { record: self.record });
        }

        let mut by_name = Map::default();
        let mut by_type: Map<TypeId, Vec<usize>> = Map::default();
        for field in &self.fields {
            if by_name.insert(field.name, field.index).is_some() {
                return Err(SoaError::DuplicateFieldName {
                    record: self.record,
                    name:   field.name,
                });
            }
            by_type.entry(field.type_id).or_default().push(field.index);
        }

        Ok(FieldSet {
            record: self.record,
            fields: self.fields,
            by_name,
            by_type,
        })
    }
}

// ── Typed keys and selectors ──────────────────────────────────────────────────

/// Compile-time typed handle to field `index` of record `R`, whose element
/// type is `T`.
///
/// `soa_record!` generates one per field as an associated constant named
/// after the field (`Particle::mass`).  Building one by hand with the wrong
/// index or type makes typed access panic.
pub struct Field<R, T> {
    index:   usize,
    _marker: PhantomData<fn() -> (R, T)>,
}

impl<R, T> Field<R, T> {
    pub const fn new(index: usize) -> Self {
        Self { index, _marker: PhantomData }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl<R, T> Clone for Field<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, T> Copy for Field<R, T> {}

impl<R, T> fmt::Debug for Field<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field<{}>({})", type_name::<T>(), self.index)
    }
}

/// Select the only field whose type is the requested element type.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByType;

/// Anything that can name one field of `R` holding a `T`.
pub trait FieldSelector<R, T> {
    /// Resolve to a field index, checking that the field stores `T`.
    fn resolve(&self, fields: &FieldSet) -> SoaResult<usize>;
}

impl<R, T: FieldValue> FieldSelector<R, T> for usize {
    fn resolve(&self, fields: &FieldSet) -> SoaResult<usize> {
        fields.check_type::<T>(*self)
    }
}

impl<R, T: FieldValue> FieldSelector<R, T> for &str {
    fn resolve(&self, fields: &FieldSet) -> SoaResult<usize> {
        let index = fields.index_of_name(self)?;
        fields.check_type::<T>(index)
    }
}

impl<R, T: FieldValue> FieldSelector<R, T> for ByType {
    fn resolve(&self, fields: &FieldSet) -> SoaResult<usize> {
        fields.index_of_type::<T>()
    }
}

impl<R, T: FieldValue> FieldSelector<R, T> for Field<R, T> {
    fn resolve(&self, _fields: &FieldSet) -> SoaResult<usize> {
        Ok(self.index)
    }
}

// ── Const helpers for `soa_record!` ───────────────────────────────────────────

#[doc(hidden)]
pub const fn position_of(names: &[&str], name: &str) -> usize {
    let mut i = 0;
    while i < names.len() {
        if str_eq(names[i], name) {
            return i;
        }
        i += 1;
    }
    panic!("field name is not declared on the record");
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
