//! Core traits defining singleton slot behavior.
//!
//! This module provides the `Singleton` capability trait for payload types and the
//! `SingletonApi` trait, whose default methods implement the whole slot lifecycle
//! (`ensure`, `instance`, `shutdown`, guarded `construct`) on top of two static
//! accessors supplied by the implementor.
//!
//! Every type (`TypeId`) has one slot per registry. A slot is either empty or holds
//! exactly one `Arc<T>`. Clearing a slot releases the registry's own reference only;
//! clones handed out earlier keep the instance alive.

use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use crate::{SingletonError, SingletonEvent};

/// Signature of a user-supplied diagnostics callback.
pub type TraceCallback = dyn Fn(&SingletonEvent) + Send + Sync + 'static;

/// Static storage for a registry's trace callback.
pub type TraceStorage = LazyLock<Mutex<Option<Arc<TraceCallback>>>>;

/// Static storage for a registry's slots, keyed by type.
pub type SlotStorage = LazyLock<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>;

/// Marks a type as eligible for singleton management.
///
/// `init` is the raw constructor. Registries call it only after checking that the
/// slot for `Self` is empty, so implementations never need to guard themselves.
///
/// `init` runs while the registry's storage lock is held: it must not call back into
/// the registry that is constructing it.
pub trait Singleton: Send + Sync + Sized + 'static {
    fn init() -> Self;
}

/// Core trait defining singleton registry behavior.
///
/// Provides default implementations for all slot operations, requiring only
/// two accessor methods (`storage` and `trace`) to be implemented by the implementor.
pub trait SingletonApi {
    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Access the trace callback static.
    fn trace() -> &'static TraceStorage;

    /// Set a tracing callback for registry operations.
    ///
    /// The callback is invoked for every slot operation and for events that payload
    /// types emit about themselves.
    ///
    /// # Safety Restrictions
    ///
    /// The callback may be invoked from inside `Singleton::init`, while the storage
    /// lock is held. It must NOT call slot operations on the same registry.
    fn set_trace_callback(&self, callback: impl Fn(&SingletonEvent) + Send + Sync + 'static) {
        let mut guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    ///
    /// Slots are not affected.
    fn clear_trace_callback(&self) {
        let mut guard = Self::trace().lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Emit an event to the current callback, if any.
    ///
    /// The callback is cloned out of the trace lock before it runs, so it may replace
    /// or clear itself.
    fn emit_event(&self, event: &SingletonEvent) {
        let callback = Self::trace()
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Slots
    // -------------------------------------------------------------------------------------------------

    /// Access the storage static.
    fn storage() -> &'static SlotStorage;

    /// Populate the slot for `T` if it is empty.
    ///
    /// Idempotent: an existing instance is never replaced. The check and the insert
    /// happen under one lock, so `ensure` cannot interleave with `shutdown`.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// A panic inside `T::init` poisons the storage lock but leaves the slot empty: the
    /// insert only happens once `init` has returned. Every slot operation therefore
    /// recovers a poisoned lock instead of failing.
    fn ensure<T: Singleton>(&self) {
        let type_name = std::any::type_name::<T>();

        let created = {
            let mut map = Self::storage().lock().unwrap_or_else(|p| p.into_inner());
            match map.entry(TypeId::of::<T>()) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(T::init()));
                    true
                }
            }
        };

        if created {
            tracing::debug!(type_name, "singleton slot populated");
        } else {
            tracing::trace!(type_name, "singleton slot already populated");
        }

        self.emit_event(&SingletonEvent::Ensure { type_name, created });
    }

    /// Retrieve a shared reference to the instance in the slot for `T`.
    ///
    /// With `create` set, `ensure` runs first. An empty slot yields `Ok(None)` when
    /// `allow_null` is set and `NoInstance` otherwise. Every returned `Arc` is a new
    /// clone; the slot keeps its own reference.
    ///
    /// # Errors
    ///
    /// - `NoInstance` if the slot is empty and `allow_null` is false
    /// - `TypeMismatch` if the stored value is not a `T` (should be unreachable)
    fn instance<T: Singleton>(
        &self,
        create: bool,
        allow_null: bool,
    ) -> Result<Option<Arc<T>>, SingletonError> {
        if create {
            self.ensure::<T>();
        }

        let type_name = std::any::type_name::<T>();

        let map = Self::storage().lock().unwrap_or_else(|p| p.into_inner());

        let any_arc_opt = map.get(&TypeId::of::<T>()).cloned();

        drop(map);

        self.emit_event(&SingletonEvent::Instance {
            type_name,
            found: any_arc_opt.is_some(),
        });

        match any_arc_opt {
            Some(any_arc) => any_arc
                .downcast::<T>()
                .map(Some)
                .map_err(|_| SingletonError::TypeMismatch { type_name }),
            None if allow_null => Ok(None),
            None => Err(SingletonError::NoInstance { type_name }),
        }
    }

    /// Retrieve the instance for `T`, failing if the slot is empty.
    ///
    /// Equivalent to `instance::<T>(false, false)`.
    fn get<T: Singleton>(&self) -> Result<Arc<T>, SingletonError> {
        self.instance::<T>(false, false)?
            .ok_or(SingletonError::NoInstance {
                type_name: std::any::type_name::<T>(),
            })
    }

    /// Clear the slot for `T`.
    ///
    /// Returns the strong count observed just before the slot released its reference,
    /// or `None` if the slot was already empty. The instance is destroyed only if the
    /// slot held the last reference; outside holders keep it alive.
    fn shutdown<T: Singleton>(&self) -> Option<usize> {
        let type_name = std::any::type_name::<T>();

        let released = Self::storage()
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&TypeId::of::<T>());

        let Some(instance) = released else {
            tracing::trace!(type_name, "shutdown on empty singleton slot");
            return None;
        };

        let strong_count = Arc::strong_count(&instance);
        tracing::debug!(type_name, strong_count, "singleton slot cleared");

        self.emit_event(&SingletonEvent::Shutdown {
            type_name,
            strong_count,
        });

        // Dropped outside the storage lock so a payload's Drop may use the registry.
        drop(instance);

        Some(strong_count)
    }

    /// Construct a `T` directly, bypassing the slot.
    ///
    /// Fails while the slot for `T` is populated. On success the new instance is
    /// returned as an `Arc` and the slot is left untouched.
    ///
    /// # Errors
    ///
    /// `DuplicateInstance` if the slot for `T` is populated.
    fn construct<T: Singleton>(&self) -> Result<Arc<T>, SingletonError> {
        let type_name = std::any::type_name::<T>();

        let map = Self::storage().lock().unwrap_or_else(|p| p.into_inner());

        let allowed = !map.contains_key(&TypeId::of::<T>());
        let result = if allowed {
            Ok(Arc::new(T::init()))
        } else {
            Err(SingletonError::DuplicateInstance { type_name })
        };

        drop(map);

        if !allowed {
            tracing::debug!(type_name, "direct construction refused, slot is populated");
        }

        self.emit_event(&SingletonEvent::Construct { type_name, allowed });

        result
    }

    /// Check whether the slot for `T` is populated.
    fn contains<T: Singleton>(&self) -> bool {
        let found = Self::storage()
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(&TypeId::of::<T>());

        self.emit_event(&SingletonEvent::Contains {
            type_name: std::any::type_name::<T>(),
            found,
        });

        found
    }

    /// Current strong count of the instance in the slot for `T`, including the slot's
    /// own reference. `None` if the slot is empty.
    fn strong_count<T: Singleton>(&self) -> Option<usize> {
        Self::storage()
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&TypeId::of::<T>())
            .map(Arc::strong_count)
    }

    /// Clear every slot of the registry.
    ///
    /// Primarily intended for testing. Released instances are dropped after the
    /// storage lock is released. The tracing callback is kept.
    #[doc(hidden)]
    fn clear(&self) {
        self.emit_event(&SingletonEvent::Clear {});

        let released: Vec<_> = Self::storage()
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .drain()
            .map(|(_, instance)| instance)
            .collect();

        drop(released);
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{Singleton, SingletonApi, SlotStorage, TraceStorage};
    use crate::{SingletonError, SingletonEvent};

    use serial_test::serial;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, LazyLock, Mutex};

    static STORAGE: SlotStorage = LazyLock::new(|| Mutex::new(HashMap::new()));

    static TRACE: TraceStorage = LazyLock::new(|| Mutex::new(None));

    struct Api;

    impl SingletonApi for Api {
        fn storage() -> &'static SlotStorage {
            &STORAGE
        }

        fn trace() -> &'static TraceStorage {
            &TRACE
        }
    }

    const API: Api = Api;

    static INITS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct Counter {
        serial: usize,
    }

    impl Singleton for Counter {
        fn init() -> Self {
            Counter {
                serial: INITS.fetch_add(1, Ordering::SeqCst),
            }
        }
    }

    struct Other;

    impl Singleton for Other {
        fn init() -> Self {
            Other
        }
    }

    fn collect_events() -> Arc<Mutex<Vec<String>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        API.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(e.to_string());
        });
        events
    }

    #[test]
    #[serial]
    fn test_ensure_then_instance_returns_same_identity() -> Result<(), SingletonError> {
        API.clear();

        API.ensure::<Counter>();

        let first = API.get::<Counter>()?;
        let second = API.instance::<Counter>(false, false)?.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        Ok(())
    }

    #[test]
    #[serial]
    fn test_ensure_is_idempotent() {
        API.clear();

        let before = INITS.load(Ordering::SeqCst);
        API.ensure::<Counter>();
        API.ensure::<Counter>();
        assert_eq!(INITS.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    #[serial]
    fn test_instance_on_empty_slot() {
        API.clear();

        let result = API.instance::<Counter>(false, false);
        assert_eq!(
            result.unwrap_err(),
            SingletonError::NoInstance {
                type_name: std::any::type_name::<Counter>()
            }
        );

        assert!(API.instance::<Counter>(false, true).unwrap().is_none());
        assert!(API.get::<Counter>().is_err());
    }

    #[test]
    #[serial]
    fn test_instance_with_create_populates() {
        API.clear();

        let a = API.instance::<Counter>(true, false).unwrap();
        assert!(a.is_some());
        assert!(API.contains::<Counter>());
    }

    #[test]
    #[serial]
    fn test_shutdown_reports_count_before_clearing() {
        API.clear();

        API.ensure::<Counter>();
        let held = API.get::<Counter>().unwrap();

        assert_eq!(API.strong_count::<Counter>(), Some(2));
        assert_eq!(API.shutdown::<Counter>(), Some(2));
        assert_eq!(Arc::strong_count(&held), 1);

        assert_eq!(API.shutdown::<Counter>(), None);
        assert_eq!(API.strong_count::<Counter>(), None);
    }

    #[test]
    #[serial]
    fn test_ensure_after_shutdown_builds_new_identity() {
        API.clear();

        API.ensure::<Counter>();
        let old = API.get::<Counter>().unwrap();
        API.shutdown::<Counter>();
        API.ensure::<Counter>();
        let new = API.get::<Counter>().unwrap();

        assert!(!Arc::ptr_eq(&old, &new));
        assert_ne!(old.serial, new.serial);
    }

    #[test]
    #[serial]
    fn test_construct_guard() {
        API.clear();

        let loose = API.construct::<Counter>().unwrap();
        assert_eq!(Arc::strong_count(&loose), 1);
        assert!(API.instance::<Counter>(false, true).unwrap().is_none());

        API.ensure::<Counter>();
        assert_eq!(
            API.construct::<Counter>().unwrap_err(),
            SingletonError::DuplicateInstance {
                type_name: std::any::type_name::<Counter>()
            }
        );

        // Other types are unaffected
        assert!(API.construct::<Other>().is_ok());
    }

    #[test]
    #[serial]
    fn test_events_for_full_lifecycle() {
        API.clear();
        let events = collect_events();

        API.ensure::<Counter>();
        API.ensure::<Counter>();
        let _ = API.construct::<Counter>();
        API.shutdown::<Counter>();
        API.shutdown::<Counter>();
        let _ = API.instance::<Counter>(false, true);

        let name = std::any::type_name::<Counter>();
        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                format!("ensure {{ type_name: {}, created: true }}", name),
                format!("ensure {{ type_name: {}, created: false }}", name),
                format!("construct {{ type_name: {}, allowed: false }}", name),
                format!("shutdown {{ type_name: {}, strong_count: 1 }}", name),
                format!("instance {{ type_name: {}, found: false }}", name),
            ]
        );
        drop(captured);

        API.clear_trace_callback();
    }

    #[test]
    #[serial]
    fn test_clear_event_and_slots() {
        API.clear();
        API.ensure::<Counter>();
        API.ensure::<Other>();

        let events = collect_events();
        API.clear();

        assert!(!API.contains::<Counter>());
        assert!(!API.contains::<Other>());

        let captured = events.lock().unwrap();
        assert_eq!(captured[0], SingletonEvent::Clear {}.to_string());
        drop(captured);

        API.clear_trace_callback();
    }

    #[test]
    #[serial]
    fn test_callback_may_clear_itself() {
        API.clear();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();

        API.set_trace_callback(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
            API.clear_trace_callback();
        });

        API.ensure::<Other>();
        API.shutdown::<Other>();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
