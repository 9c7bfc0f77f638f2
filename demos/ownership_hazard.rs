//! The A/B ownership hazard, step by step.
//!
//! A `B` takes a shared reference to the singleton `A`. Shutting the slot down does not
//! destroy `A`: `B` keeps it alive until `B` itself goes away. Every event is printed
//! through the default registry's trace callback.
//!
//! Run with: `RUST_LOG=debug cargo run --example ownership_hazard`

use shared_singleton::hazard::{self, A, B};
use shared_singleton::{named, slots, SingletonError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), SingletonError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    hazard::bind_names()?;
    slots::set_trace_callback(|event| println!("   [event] {}", event));

    println!("=== shared-singleton: Ownership Hazard ===\n");

    println!("1. ensure::<{}>()", named::class_name::<A>()?);
    slots::ensure::<A>();

    println!("\n2. {} takes a reference from instance(true, false)", named::class_name::<B>()?);
    let a = slots::instance::<A>(true, false)?.ok_or(SingletonError::NoInstance {
        type_name: std::any::type_name::<A>(),
    })?;
    let b = B::with_a(a);
    b.say_hello("hello from B");

    println!("\n3. shutdown::<A>()");
    let released = slots::shutdown::<A>();
    println!("   released with strong count {:?}", released);

    println!("\n4. B after shutdown");
    b.say_hello("still here");
    println!(
        "   slot is empty: {}",
        slots::instance::<A>(false, true)?.is_none()
    );

    println!("\n5. ensure::<A>() again builds a second A");
    slots::ensure::<A>();

    println!("\n6. drop B; its A goes with it");
    drop(b);

    println!("\n7. shutdown::<A>() releases the second A");
    slots::shutdown::<A>();

    slots::clear_trace_callback();
    println!("\n=== Example Complete ===");
    Ok(())
}
