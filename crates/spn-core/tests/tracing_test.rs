//! Tests for the tracing setup.

use std::sync::Mutex;

use spn_core::tracing::{init_tracing, init_tracing_with_level};

static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn init_tracing_is_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    init_tracing_with_level("debug");
}

#[test]
fn garbage_filter_falls_back() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("SPN_LOG", "this_is_garbage_not_a_valid_filter[");
    init_tracing();
    std::env::remove_var("SPN_LOG");
}

#[test]
fn init_installs_the_global_subscriber() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
    tracing::info!(target: "spn", "subscriber installed");
}
