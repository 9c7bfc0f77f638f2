//! Runtime type labels.
//!
//! A label is bound once per type into a process-wide table and can then be queried
//! without an instance. The [`Named`] trait carries a type's label as a constant so the
//! type can bind itself with [`bind`]; [`bind_name`] binds any `'static` type.
//!
//! ```
//! use shared_singleton::{named, named_type, SingletonError};
//!
//! struct Sampler;
//! named_type!(Sampler, "Sampler");
//!
//! assert!(matches!(
//!     named::class_name::<Sampler>(),
//!     Err(SingletonError::UnboundType { .. })
//! ));
//!
//! named::bind::<Sampler>().unwrap();
//! assert_eq!(named::class_name::<Sampler>().unwrap(), "Sampler");
//! ```

use std::{
    any::TypeId,
    collections::HashMap,
    sync::{LazyLock, Mutex},
};

use crate::SingletonError;

/// Label table. Entries are only ever added.
static NAMES: LazyLock<Mutex<HashMap<TypeId, &'static str>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// A type with a human-readable label.
pub trait Named: 'static {
    const CLASS_NAME: &'static str;

    fn class_name(&self) -> &'static str {
        Self::CLASS_NAME
    }
}

/// Binds `label` to `T`.
///
/// Binding the label already bound to `T` is a no-op.
///
/// # Errors
///
/// `NameConflict` if `T` is bound to a different label.
pub fn bind_name<T: ?Sized + 'static>(label: &'static str) -> Result<(), SingletonError> {
    let type_name = std::any::type_name::<T>();

    let mut names = NAMES.lock().unwrap_or_else(|p| p.into_inner());
    let bound = *names.entry(TypeId::of::<T>()).or_insert(label);
    drop(names);

    if bound != label {
        return Err(SingletonError::NameConflict {
            type_name,
            bound,
            requested: label,
        });
    }

    tracing::trace!(type_name, label, "class name bound");
    Ok(())
}

/// Binds `T::CLASS_NAME` to `T`.
pub fn bind<T: Named>() -> Result<(), SingletonError> {
    bind_name::<T>(T::CLASS_NAME)
}

/// Returns the label bound to `T`.
///
/// # Errors
///
/// `UnboundType` if no label was bound for `T`.
pub fn class_name<T: ?Sized + 'static>() -> Result<&'static str, SingletonError> {
    NAMES
        .lock()
        .unwrap_or_else(|p| p.into_inner())
        .get(&TypeId::of::<T>())
        .copied()
        .ok_or(SingletonError::UnboundType {
            type_name: std::any::type_name::<T>(),
        })
}

/// Whether a label has been bound for `T`.
pub fn is_bound<T: ?Sized + 'static>() -> bool {
    NAMES
        .lock()
        .unwrap_or_else(|p| p.into_inner())
        .contains_key(&TypeId::of::<T>())
}
