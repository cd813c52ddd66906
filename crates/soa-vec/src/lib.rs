//! `soa-vec` — a `Vec`-like container that stores each record field in its
//! own contiguous array.
//!
//! Declare a record with [`soa_record!`], then use [`SoaVec`] much like a
//! `Vec`.  Whole records go in and come out by value; in between, every
//! field sits in a separate array that can be scanned on its own.
//!
//! # Layers
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`store`]   | `FieldArrayStore<R>`: one type-erased array per field        |
//! | [`element`] | `Element<S>` proxies (`ElementRef`, `ElementMut`)            |
//! | [`cursor`]  | `Cursor<S>` random-access positions (`CursorRef`, `CursorMut`) |
//! | [`iter`]    | `Iter`, `IntoIter`                                           |
//! | [`vec`]     | `SoaVec<R>`, the container API                               |
//!
//! Record metadata (`FieldSet`, selectors, the `Record` trait) comes from
//! `soa-core` and is re-exported here.
//!
//! # Example
//!
//! ```rust
//! use soa_vec::{soa_record, SoaVec};
//!
//! soa_record! {
//!     #[derive(Clone, Debug, Default, PartialEq)]
//!     pub struct Foo {
//!         pub i: i32,
//!         pub s: String,
//!     }
//! }
//!
//! let mut v: SoaVec<Foo> = (1..=3).map(|i| Foo { i, s: format!("hello {i}") }).collect();
//! v.erase(0);
//! assert_eq!(v.column(Foo::i), &[2, 3]);
//! assert_eq!(v.field_array::<String>("s").unwrap()[0], "hello 2");
//! ```

pub mod cursor;
pub mod element;
pub mod iter;
pub mod store;
pub mod vec;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cursor::{Cursor, CursorMut, CursorRef};
pub use element::{Element, ElementMut, ElementRef};
pub use iter::{IntoIter, Iter};
pub use store::FieldArrayStore;
pub use vec::SoaVec;

pub use soa_core::{
    ByType, Field, FieldDescriptor, FieldSelector, FieldSet, FieldValue, Record, SoaError,
    SoaResult, soa_record,
};
