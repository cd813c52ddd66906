//! The `Record` provider trait and the `soa_record!` declaration macro.
//!
//! A record type is any `Clone + Default` struct that can describe its fields
//! ([`Record::describe`]) and hand out each field by index as `&dyn Any`.
//! Containers never see the struct layout; they see the [`FieldSet`] and the
//! two accessors.
//!
//! # Usage
//!
//! ```rust
//! use soa_core::{soa_record, Record};
//!
//! soa_record! {
//!     #[derive(Clone, Debug, Default, PartialEq)]
//!     pub struct Sample {
//!         pub id:    u32,
//!         pub label: String,
//!     }
//! }
//!
//! let fields = Sample::describe().unwrap();
//! assert_eq!(fields.len(), 2);
//! assert_eq!(Sample::label.index(), 1);
//! ```

use std::any::Any;

use crate::{FieldSet, SoaResult};

/// Field Descriptor Provider for one record type.
///
/// Implementations must be consistent: `field(i)` and `field_mut(i)` return
/// `Some` holding the described type for every `i < describe()?.len()`, and
/// `None` beyond.  [`crate::registry::register`] checks this once per type.
///
/// Prefer [`soa_record!`](crate::soa_record) over a hand-written impl.
pub trait Record: Clone + Default + 'static {
    /// Ordered field list.  Called once per type by the registry.
    fn describe() -> SoaResult<FieldSet>;

    /// Field `index` of this value.
    fn field(&self, index: usize) -> Option<&dyn Any>;

    /// Mutable field `index` of this value.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Any>;
}

/// Declare a struct and implement [`Record`] for it.
///
/// The struct is emitted unchanged (attributes, visibility, and doc comments
/// included).  In addition, every field gets an associated constant with the
/// same name holding its typed [`Field`](crate::Field) key, so
/// `Particle::mass` selects the `mass` array without name lookup.
///
/// Derives are not added: the struct must derive or implement `Clone` and
/// `Default` itself (and `PartialEq` for proxy comparisons).  Generic structs
/// are not supported.
#[macro_export]
macro_rules! soa_record {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fattr:meta])*
                $fvis:vis $fname:ident : $fty:ty
            ),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        $vis struct $name {
            $(
                $(#[$fattr])*
                $fvis $fname: $fty,
            )+
        }

        #[allow(non_upper_case_globals, dead_code)]
        impl $name {
            #[doc(hidden)]
            const __SOA_FIELD_NAMES: &'static [&'static str] = &[$(stringify!($fname)),+];

            $(
                #[doc = concat!("Typed key of the `", stringify!($fname), "` field array.")]
                pub const $fname: $crate::Field<$name, $fty> = $crate::Field::new(
                    $crate::field::position_of(Self::__SOA_FIELD_NAMES, stringify!($fname)),
                );
            )+
        }

        impl $crate::Record for $name {
            fn describe() -> $crate::SoaResult<$crate::FieldSet> {
                $crate::FieldSet::builder(stringify!($name))
                    $( .field::<$fty>(stringify!($fname)) )+
                    .build()
            }

            fn field(&self, index: usize) -> ::std::option::Option<&dyn ::std::any::Any> {
                $(
                    if index == Self::$fname.index() {
                        return ::std::option::Option::Some(&self.$fname as &dyn ::std::any::Any);
                    }
                )+
                ::std::option::Option::None
            }

            fn field_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                $(
                    if index == Self::$fname.index() {
                        return ::std::option::Option::Some(&mut self.$fname as &mut dyn ::std::any::Any);
                    }
                )+
                ::std::option::Option::None
            }
        }
    };
}
