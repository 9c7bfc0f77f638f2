//! A worked shared-ownership hazard.
//!
//! [`A`] lives in a singleton slot of the default registry. [`B`] holds an `Arc<A>`
//! obtained from that slot. `slots::shutdown::<A>()` only releases the slot's own
//! reference, so a `B` that still holds its `Arc` keeps the old `A` alive, and a later
//! `ensure` builds a second, distinct `A` next to it.
//!
//! Both types report through [`slots::emit_event`]: `A` on construction and drop, `B`
//! with the strong count of its held reference before every forwarded call and on drop.
//! When a registry's `ensure` builds an `A` or a `B`, that callback runs while the
//! building registry holds its storage lock, so it must not call into that registry
//! (`slots::strong_count::<A>()` from inside it deadlocks).
//!
//! ```
//! use shared_singleton::hazard::{A, B};
//! use shared_singleton::slots;
//!
//! slots::ensure::<A>();
//! let b = B::with_a(slots::get::<A>().unwrap());
//! assert_eq!(slots::shutdown::<A>(), Some(2));
//!
//! // B still reaches the A the slot no longer holds
//! assert_eq!(b.hello_message().as_deref(), Some("Hello from std"));
//! assert!(slots::instance::<A>(false, true).unwrap().is_none());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::{named, slots, Named, Singleton, SingletonError, SingletonEvent};

/// A named type with no singleton capability.
#[derive(Debug, Default)]
pub struct O;

named_type!(O, "O");

/// Singleton-eligible leaf.
#[derive(Debug)]
pub struct A {
    greetings: AtomicUsize,
}

named_type!(A, "A");

impl Singleton for A {
    fn init() -> Self {
        tracing::info!("ctor<A>");
        slots::emit_event(&SingletonEvent::Created {
            type_name: A::CLASS_NAME,
        });
        A {
            greetings: AtomicUsize::new(0),
        }
    }
}

impl A {
    /// Guarded direct construction through the default registry.
    ///
    /// # Errors
    ///
    /// `DuplicateInstance` while the default registry holds an `A`.
    pub fn new() -> Result<Arc<A>, SingletonError> {
        slots::construct::<A>()
    }

    pub fn hello_message(&self) -> String {
        "Hello from std".to_string()
    }

    pub fn say_hello(&self, greetings: &str) {
        tracing::info!(greetings, "A greeted");
        self.greetings.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of `say_hello` calls this instance has received.
    pub fn greetings_received(&self) -> usize {
        self.greetings.load(Ordering::SeqCst)
    }
}

impl Drop for A {
    fn drop(&mut self) {
        tracing::info!("dtor<A>");
        slots::emit_event(&SingletonEvent::Dropped {
            type_name: A::CLASS_NAME,
        });
    }
}

/// Dependent holder of a shared `A`.
///
/// `B` never manages the lifetime of its `A`; dropping a `B` destroys the `A` only if
/// it held the last reference.
#[derive(Debug)]
pub struct B {
    my_a: Option<Arc<A>>,
}

named_type!(B, "B");

impl B {
    pub fn new() -> Self {
        Self::created(None)
    }

    pub fn with_a(a: Arc<A>) -> Self {
        Self::created(Some(a))
    }

    fn created(my_a: Option<Arc<A>>) -> Self {
        tracing::info!("ctor<B>");
        slots::emit_event(&SingletonEvent::Created {
            type_name: B::CLASS_NAME,
        });
        B { my_a }
    }

    pub fn get_a(&self) -> Option<Arc<A>> {
        self.my_a.clone()
    }

    pub fn set_a(&mut self, a: Option<Arc<A>>) {
        self.my_a = a;
    }

    /// Strong count of the held reference, read without cloning it.
    fn report(&self, site: &'static str) {
        let strong_count = self.my_a.as_ref().map(Arc::strong_count);
        tracing::debug!(site, ?strong_count, "B holds A");
        slots::emit_event(&SingletonEvent::SharedCount {
            holder: B::CLASS_NAME,
            site,
            strong_count,
        });
    }

    /// Forwards to `A::hello_message`; `None` if no `A` is held.
    pub fn hello_message(&self) -> Option<String> {
        self.report("hello_message");
        self.my_a.as_ref().map(|a| a.hello_message())
    }

    /// Forwards to `A::say_hello`; returns whether an `A` received the greeting.
    pub fn say_hello(&self, greetings: &str) -> bool {
        self.report("say_hello");
        match &self.my_a {
            Some(a) => {
                a.say_hello(greetings);
                true
            }
            None => false,
        }
    }
}

impl Singleton for B {
    fn init() -> Self {
        B::new()
    }
}

impl Default for B {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for B {
    // The held Arc is released after this returns, so any dtor<A> follows dtor<B>.
    fn drop(&mut self) {
        self.report("drop");
        tracing::info!("dtor<B>");
        slots::emit_event(&SingletonEvent::Dropped {
            type_name: B::CLASS_NAME,
        });
    }
}

/// Binds the labels of `O`, `A` and `B`.
pub fn bind_names() -> Result<(), SingletonError> {
    named::bind::<O>()?;
    named::bind::<A>()?;
    named::bind::<B>()
}
