//! Macros for creating isolated singleton registries and naming types.

/// Creates an isolated singleton registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - Slot storage static (hidden)
/// - Trace callback static (hidden)
/// - An `Api` struct that implements `SingletonApi`
/// - Free functions delegating to it
///
/// Slots in different registries are independent: populating `T` in one registry does
/// not block guarded construction of `T` through another.
///
/// # Examples
///
/// ```rust
/// use shared_singleton::{define_singletons, Singleton};
///
/// struct Engine { voices: usize }
///
/// impl Singleton for Engine {
///     fn init() -> Self {
///         Engine { voices: 32 }
///     }
/// }
///
/// define_singletons!(audio);
///
/// audio::ensure::<Engine>();
/// let engine = audio::get::<Engine>().unwrap();
/// assert_eq!(engine.voices, 32);
///
/// assert_eq!(audio::shutdown::<Engine>(), Some(2));
/// assert!(audio::instance::<Engine>(false, true).unwrap().is_none());
/// ```
#[macro_export]
macro_rules! define_singletons {
    ($name:ident) => {
        pub mod $name {
            use std::collections::HashMap;
            use std::sync::{Arc, LazyLock, Mutex};

            use $crate::{Singleton, SingletonError, SingletonEvent};

            // Slot storage (module-private)
            static STORAGE: $crate::SlotStorage = LazyLock::new(|| Mutex::new(HashMap::new()));

            // Trace callback storage (module-private)
            static TRACE: $crate::TraceStorage = LazyLock::new(|| Mutex::new(None));

            /// Zero-sized type that implements the singleton API.
            ///
            /// All slot operations are provided by the `SingletonApi` trait's
            /// default implementations. This struct only provides access to the statics.
            pub struct Api;

            impl $crate::SingletonApi for Api {
                fn storage() -> &'static $crate::SlotStorage {
                    &STORAGE
                }

                fn trace() -> &'static $crate::TraceStorage {
                    &TRACE
                }
            }

            /// Convenient constant for trait-based access.
            pub const API: Api = Api;

            /// Populate the slot for `T` unless it already holds an instance.
            pub fn ensure<T: Singleton>() {
                use $crate::SingletonApi;
                API.ensure::<T>()
            }

            /// Retrieve a shared reference to the instance for `T`.
            pub fn instance<T: Singleton>(
                create: bool,
                allow_null: bool,
            ) -> Result<Option<Arc<T>>, SingletonError> {
                use $crate::SingletonApi;
                API.instance::<T>(create, allow_null)
            }

            /// Retrieve the instance for `T`, failing if the slot is empty.
            pub fn get<T: Singleton>() -> Result<Arc<T>, SingletonError> {
                use $crate::SingletonApi;
                API.get::<T>()
            }

            /// Clear the slot for `T`.
            pub fn shutdown<T: Singleton>() -> Option<usize> {
                use $crate::SingletonApi;
                API.shutdown::<T>()
            }

            /// Construct a `T` outside the slot, refusing while the slot is populated.
            pub fn construct<T: Singleton>() -> Result<Arc<T>, SingletonError> {
                use $crate::SingletonApi;
                API.construct::<T>()
            }

            /// Check whether the slot for `T` is populated.
            pub fn contains<T: Singleton>() -> bool {
                use $crate::SingletonApi;
                API.contains::<T>()
            }

            /// Current strong count of the instance held for `T`.
            pub fn strong_count<T: Singleton>() -> Option<usize> {
                use $crate::SingletonApi;
                API.strong_count::<T>()
            }

            /// Set a tracing callback for this registry.
            pub fn set_trace_callback(callback: impl Fn(&SingletonEvent) + Send + Sync + 'static) {
                use $crate::SingletonApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::SingletonApi;
                API.clear_trace_callback()
            }

            #[doc(hidden)]
            pub fn clear() {
                use $crate::SingletonApi;
                API.clear()
            }
        }
    };
}

/// Implements [`Named`](crate::Named) for a type.
///
/// The label still has to be bound with [`named::bind`](crate::named::bind) before
/// [`named::class_name`](crate::named::class_name) can see it.
///
/// ```rust
/// use shared_singleton::{named_type, Named};
///
/// struct Drumkit;
/// named_type!(Drumkit, "Drumkit");
///
/// assert_eq!(Drumkit.class_name(), "Drumkit");
/// ```
#[macro_export]
macro_rules! named_type {
    ($ty:ty, $label:expr) => {
        impl $crate::Named for $ty {
            const CLASS_NAME: &'static str = $label;
        }
    };
}
