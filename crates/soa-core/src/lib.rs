//! `soa-core` — record metadata and type-erased field storage for the
//! `rust_soa` workspace.
//!
//! This crate is the Field Descriptor Provider side of the container: it
//! knows how a record type splits into fields, but nothing about containers.
//! `soa-vec` builds the struct-of-arrays container on top of it.
//!
//! # What lives here
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`field`]       | `FieldDescriptor`, `FieldSet`, `FieldSetBuilder`, `Field`, selectors |
//! | [`record`]      | `Record` provider trait, `soa_record!` macro                  |
//! | [`array`]       | `FieldArray` trait, `TypedFieldArray<T>`, `FieldValue`        |
//! | [`registry`]    | Process-wide `TypeId → &'static FieldSet` cache               |
//! | [`error`]       | `SoaError`, `SoaResult`                                       |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                         |
//! |-----------|----------------------------------------------------------------|
//! | `fx-hash` | FxHash for name/type indices and the registry (default).       |

pub mod array;
pub mod error;
pub mod field;
pub mod record;
pub mod registry;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use array::{FieldArray, FieldValue, TypedFieldArray};
pub use error::{SoaError, SoaResult};
pub use field::{ByType, Field, FieldDescriptor, FieldSelector, FieldSet, FieldSetBuilder};
pub use record::Record;
