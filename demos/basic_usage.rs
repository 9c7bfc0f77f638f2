//! Basic usage example for shared-singleton.
//!
//! Demonstrates:
//! - Marking types as singleton-eligible with `Singleton`
//! - `ensure`, `instance` and `get` on an isolated registry
//! - Guarded direct construction with `construct`
//! - `shutdown` and the strong count it reports
//!
//! Run with: `RUST_LOG=debug cargo run --example basic_usage`

use shared_singleton::{define_singletons, Singleton};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// Create an isolated registry for this example
define_singletons!(app);

#[derive(Debug)]
struct Preferences {
    sample_rate: u32,
    buffer_size: usize,
}

impl Singleton for Preferences {
    fn init() -> Self {
        Preferences {
            sample_rate: 48_000,
            buffer_size: 256,
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== shared-singleton: Basic Usage ===\n");

    // -------------------------------------------------------------------------
    // 1. Empty slot
    // -------------------------------------------------------------------------
    println!("1. Querying an empty slot...");

    match app::get::<Preferences>() {
        Ok(prefs) => println!("   Found: {:?}", prefs),
        Err(e) => println!("   Error (expected): {}", e),
    }
    println!(
        "   instance(false, true) = {:?}",
        app::instance::<Preferences>(false, true).unwrap()
    );

    // -------------------------------------------------------------------------
    // 2. Populate with ensure()
    // -------------------------------------------------------------------------
    println!("\n2. Populating with ensure()...");

    app::ensure::<Preferences>();
    app::ensure::<Preferences>(); // no-op

    let prefs: Arc<Preferences> = app::get().unwrap();
    println!(
        "   {} Hz, {} frames",
        prefs.sample_rate, prefs.buffer_size
    );
    println!("   strong count: {:?}", app::strong_count::<Preferences>());

    // -------------------------------------------------------------------------
    // 3. Guarded construction
    // -------------------------------------------------------------------------
    println!("\n3. Constructing directly while the slot is populated...");

    match app::construct::<Preferences>() {
        Ok(_) => println!("   Constructed (unexpected)"),
        Err(e) => println!("   Error (expected): {}", e),
    }

    // -------------------------------------------------------------------------
    // 4. Shutdown
    // -------------------------------------------------------------------------
    println!("\n4. Shutting down while still holding a reference...");

    let released = app::shutdown::<Preferences>();
    println!("   strong count before clearing: {:?}", released);
    println!("   held reference still valid: {} Hz", prefs.sample_rate);
    println!("   contains = {}", app::contains::<Preferences>());

    println!("\n=== Example Complete ===");
}
