// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Capture of the process-wide fallback reporter.
//!
//! The undeliverable-error hook is global, so tests exercising it must not
//! run interleaved. [`with_captured_undeliverable`] serializes them behind a
//! static lock and restores the default reporter afterwards.

use parking_lot::Mutex;
use rill_core::{hooks, RillError};
use std::sync::Arc;

static HOOK_TESTS: Mutex<()> = Mutex::new(());

/// Run `f` with the fallback reporter replaced by a capturing hook.
///
/// Returns `f`'s result together with every error reported while it ran.
pub fn with_captured_undeliverable<R>(f: impl FnOnce() -> R) -> (R, Vec<RillError>) {
    let _serial = HOOK_TESTS.lock();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    hooks::set_undeliverable_hook(move |error| sink.lock().push(error));

    let result = f();

    hooks::reset_undeliverable_hook();
    let errors = std::mem::take(&mut *captured.lock());
    (result, errors)
}
