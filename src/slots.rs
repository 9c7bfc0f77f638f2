//! The process-wide default singleton registry.
//!
//! Free functions here delegate to [`GlobalSlots`], a zero-sized type implementing
//! [`SingletonApi`] over this module's statics. Use `define_singletons!` when a set
//! of slots must be isolated from the default one.
//!
//! # Examples
//!
//! ```
//! use shared_singleton::{slots, Singleton};
//!
//! struct Mixer { channels: usize }
//!
//! impl Singleton for Mixer {
//!     fn init() -> Self {
//!         Mixer { channels: 8 }
//!     }
//! }
//!
//! slots::ensure::<Mixer>();
//! let mixer = slots::get::<Mixer>().unwrap();
//! assert_eq!(mixer.channels, 8);
//!
//! assert_eq!(slots::shutdown::<Mixer>(), Some(2));
//! assert!(slots::instance::<Mixer>(false, true).unwrap().is_none());
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, Mutex},
};

use crate::singleton_trait::{Singleton, SingletonApi, SlotStorage, TraceStorage};
use crate::{SingletonError, SingletonEvent};

/// Global slot storage, keyed by `TypeId`.
static GLOBAL_SLOTS: SlotStorage = LazyLock::new(|| Mutex::new(HashMap::new()));

/// Holds an optional user-defined tracing callback.
static TRACE_CALLBACK: TraceStorage = LazyLock::new(|| Mutex::new(None));

/// The default registry.
pub struct GlobalSlots;

impl SingletonApi for GlobalSlots {
    fn storage() -> &'static SlotStorage {
        &GLOBAL_SLOTS
    }

    fn trace() -> &'static TraceStorage {
        &TRACE_CALLBACK
    }
}

const API: GlobalSlots = GlobalSlots;

/// Sets a tracing callback that will be invoked on every interaction with the default
/// registry, and for every event payload types report about themselves.
///
/// # Example
/// ```rust
/// use shared_singleton::slots;
///
/// slots::set_trace_callback(|event| println!("[singleton-trace] {}", event));
/// # slots::clear_trace_callback();
/// ```
pub fn set_trace_callback(callback: impl Fn(&SingletonEvent) + Send + Sync + 'static) {
    API.set_trace_callback(callback)
}

/// Clears the tracing callback.
pub fn clear_trace_callback() {
    API.clear_trace_callback()
}

/// Emits an event through the default registry's callback.
///
/// Payload types use this to report construction, destruction and reference counts.
pub fn emit_event(event: &SingletonEvent) {
    API.emit_event(event)
}

/// Populates the slot for `T` unless it already holds an instance.
pub fn ensure<T: Singleton>() {
    API.ensure::<T>()
}

/// Retrieves a shared reference to the instance for `T`.
///
/// See [`SingletonApi::instance`] for the meaning of `create` and `allow_null`.
pub fn instance<T: Singleton>(
    create: bool,
    allow_null: bool,
) -> Result<Option<Arc<T>>, SingletonError> {
    API.instance::<T>(create, allow_null)
}

/// Retrieves the instance for `T`, failing with `NoInstance` if the slot is empty.
pub fn get<T: Singleton>() -> Result<Arc<T>, SingletonError> {
    API.get::<T>()
}

/// Clears the slot for `T`, returning the strong count seen before clearing.
pub fn shutdown<T: Singleton>() -> Option<usize> {
    API.shutdown::<T>()
}

/// Constructs a `T` outside the slot, refusing while the slot is populated.
pub fn construct<T: Singleton>() -> Result<Arc<T>, SingletonError> {
    API.construct::<T>()
}

/// Checks whether the slot for `T` is populated.
pub fn contains<T: Singleton>() -> bool {
    API.contains::<T>()
}

/// Current strong count of the instance held for `T`.
pub fn strong_count<T: Singleton>() -> Option<usize> {
    API.strong_count::<T>()
}

#[doc(hidden)]
pub fn clear() {
    API.clear()
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[derive(Debug, PartialEq)]
    struct Transport {
        tempo: u32,
    }

    impl Singleton for Transport {
        fn init() -> Self {
            Transport { tempo: 120 }
        }
    }

    #[test]
    #[serial]
    fn test_free_functions_round_trip() -> Result<(), SingletonError> {
        clear();

        assert!(!contains::<Transport>());
        ensure::<Transport>();
        assert!(contains::<Transport>());

        let transport = get::<Transport>()?;
        assert_eq!(transport.tempo, 120);
        assert_eq!(strong_count::<Transport>(), Some(2));

        drop(transport);
        assert_eq!(shutdown::<Transport>(), Some(1));
        assert!(instance::<Transport>(false, true)?.is_none());

        Ok(())
    }

    #[test]
    #[serial]
    fn test_construct_refused_while_populated() {
        clear();

        ensure::<Transport>();
        assert!(matches!(
            construct::<Transport>(),
            Err(SingletonError::DuplicateInstance { .. })
        ));

        shutdown::<Transport>();
        assert!(construct::<Transport>().is_ok());
        assert!(!contains::<Transport>());
    }

    #[test]
    #[serial]
    fn test_emit_event_reaches_callback() {
        clear();
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNT: AtomicUsize = AtomicUsize::new(0);
        set_trace_callback(|_e| {
            COUNT.fetch_add(1, Ordering::SeqCst);
        });
        emit_event(&SingletonEvent::Created { type_name: "Transport" });
        assert_eq!(COUNT.load(Ordering::SeqCst), 1);
        clear_trace_callback();
    }
}
