//! Process-wide cache of record field sets, keyed by record `TypeId`.
//!
//! Registration runs [`Record::describe`] once, checks that the provider's
//! accessors agree with what it described, and leaks the resulting
//! [`FieldSet`] so every container of that record type shares one `'static`
//! table.  Later lookups are a read-locked hash probe.
//!
//! Registration is lazy (the first container of a type registers it) but
//! may be done up front so descriptor errors surface at startup:
//!
//! ```rust
//! use soa_core::{registry, soa_record};
//!
//! soa_record! {
//!     #[derive(Clone, Default)]
//!     struct Pair { a: i32, b: f32 }
//! }
//!
//! let fields = registry::register::<Pair>().unwrap();
//! assert!(registry::is_registered::<Pair>());
//! assert_eq!(fields.name_of(1), Some("b"));
//! ```

use std::any::{TypeId, type_name};
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::field::Map;
use crate::{FieldSet, Record, SoaError, SoaResult};

type Registry = RwLock<Map<TypeId, &'static FieldSet>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::default)
}

/// Field set of `R`, registering it on first use.
///
/// Calling this more than once for the same `R` returns the cached table.
///
/// # Errors
///
/// Whatever `R::describe` reports, or `ProviderMismatch` if `R::field` /
/// `R::field_mut` disagree with the described fields.
pub fn register<R: Record>() -> SoaResult<&'static FieldSet> {
    let key = TypeId::of::<R>();
    if let Some(fields) = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(*fields);
    }

    let fields = R::describe()?;
    verify::<R>(&fields)?;

    let mut map = registry().write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have won the race between the two locks.
    if let Some(existing) = map.get(&key) {
        return Ok(*existing);
    }
    let fields: &'static FieldSet = Box::leak(Box::new(fields));
    map.insert(key, fields);
    tracing::debug!(
        record = fields.record_name(),
        fields = fields.len(),
        ambiguous = ?fields.ambiguous_types(),
        "registered record type"
    );
    Ok(fields)
}

/// `true` once `R` has been registered.
pub fn is_registered<R: Record>() -> bool {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(&TypeId::of::<R>())
}

/// Number of record types registered so far in this process.
pub fn registered_count() -> usize {
    registry().read().unwrap_or_else(PoisonError::into_inner).len()
}

/// Check the provider's accessors against its descriptors on a default value.
fn verify<R: Record>(fields: &FieldSet) -> SoaResult<()> {
    let mismatch = |index: usize, detail: String| SoaError::ProviderMismatch {
        record: fields.record_name(),
        index,
        detail,
    };

    let mut probe = R::default();
    for field in fields.fields() {
        let index = field.index();
        match probe.field(index) {
            Some(value) if (*value).type_id() == field.type_id() => {}
            Some(_) => {
                return Err(mismatch(
                    index,
                    format!("`field` does not return a `{}`", field.type_name()),
                ));
            }
            None => return Err(mismatch(index, "`field` returns nothing".to_owned())),
        }
        match probe.field_mut(index) {
            Some(value) if (*value).type_id() == field.type_id() => {}
            _ => {
                return Err(mismatch(
                    index,
                    format!("`field_mut` does not return a `{}`", field.type_name()),
                ));
            }
        }
    }

    if probe.field(fields.len()).is_some() {
        return Err(mismatch(
            fields.len(),
            format!("`{}` exposes more fields than it describes", type_name::<R>()),
        ));
    }
    Ok(())
}
