//! # Shared Singleton
//!
//! Per-type singleton slots over `Arc`, with guarded direct construction, runtime
//! type labels and reference-count diagnostics.
//!
//! A slot holds at most one `Arc<T>`. Shutting a slot down releases only the slot's
//! reference: every clone handed out by [`slots::instance`] stays valid, and the
//! strong count at shutdown is reported so that lingering holders can be spotted.
//!
//! ## Quick Start
//!
//! ```rust
//! use shared_singleton::{slots, Singleton};
//! use std::sync::Arc;
//!
//! struct Preferences { volume: f32 }
//!
//! impl Singleton for Preferences {
//!     fn init() -> Self {
//!         Preferences { volume: 0.8 }
//!     }
//! }
//!
//! slots::ensure::<Preferences>();
//! let prefs: Arc<Preferences> = slots::get().unwrap();
//! assert_eq!(prefs.volume, 0.8);
//!
//! // The slot's own reference plus `prefs`
//! assert_eq!(slots::shutdown::<Preferences>(), Some(2));
//! ```
//!
//! ## Main Items
//!
//! - [`Singleton`] - marks a type as eligible for a slot
//! - [`SingletonApi`] - slot operations over caller-provided statics
//! - [`slots`] - the default process-wide registry
//! - [`define_singletons!`] - isolated registries
//! - [`named`] / [`Named`] / [`named_type!`] - runtime type labels
//! - [`hazard`] - a worked example of a holder outliving its slot

#[macro_use]
mod macros;
mod singleton_error;
mod singleton_event;
mod singleton_trait;

pub mod hazard;
pub mod named;
pub mod slots;

pub use named::Named;
pub use singleton_error::SingletonError;
pub use singleton_event::SingletonEvent;
pub use singleton_trait::{Singleton, SingletonApi, SlotStorage, TraceCallback, TraceStorage};
