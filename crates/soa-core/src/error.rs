//! Error type shared by `soa-core` and `soa-vec`.
//!
//! Only checked operations report errors.  Contract violations (unchecked
//! access past the end, inserting past the end, dereferencing an end cursor)
//! panic, the same way `Vec` does.

use std::collections::TryReserveError;

use thiserror::Error;

/// Every recoverable failure a record container can report.
#[derive(Debug, Error)]
pub enum SoaError {
    #[error("index {index} out of range for container of length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("record `{record}` has no field named `{name}`")]
    UnknownField { record: &'static str, name: String },

    #[error("record `{record}` has {count} fields, field index {index} is out of range")]
    FieldIndexOutOfRange {
        record: &'static str,
        index:  usize,
        count:  usize,
    },

    #[error("record `{record}` has no field of type `{type_name}`")]
    NoFieldOfType {
        record:    &'static str,
        type_name: &'static str,
    },

    #[error("record `{record}` has several fields of type `{type_name}` ({candidates:?}); select by name or index")]
    AmbiguousFieldType {
        record:     &'static str,
        type_name:  &'static str,
        candidates: Vec<&'static str>,
    },

    #[error("field `{record}.{field}` stores `{stored}`, not `{requested}`")]
    FieldTypeMismatch {
        record:    &'static str,
        field:     &'static str,
        stored:    &'static str,
        requested: &'static str,
    },

    #[error("record `{record}` describes no fields")]
    EmptyRecord { record: &'static str },

    #[error("record `{record}` describes field `{name}` twice")]
    DuplicateFieldName {
        record: &'static str,
        name:   &'static str,
    },

    #[error("record `{record}` field {index}: {detail}")]
    ProviderMismatch {
        record: &'static str,
        index:  usize,
        detail: String,
    },

    #[error("could not grow field array `{field}`: {source}")]
    Allocation {
        field:  &'static str,
        #[source]
        source: TryReserveError,
    },
}

/// Shorthand result type for all `soa-*` crates.
pub type SoaResult<T> = Result<T, SoaError>;
