// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Process-wide fallback reporter for errors with nowhere downstream to go.
//!
//! At most one terminal signal ever reaches a subscriber. Everything that
//! cannot be delivered there — late errors, losers of the single-winner
//! race, release-action failures — is escalated here so operators retain
//! visibility. The default reporter logs the error; installing a hook
//! replaces that behavior process-wide.

use crate::RillError;
use parking_lot::RwLock;

type Hook = Box<dyn Fn(RillError) + Send + Sync>;

static HOOK: RwLock<Option<Hook>> = RwLock::new(None);

/// Install a process-wide hook receiving every undeliverable error.
pub fn set_undeliverable_hook<F>(hook: F)
where
    F: Fn(RillError) + Send + Sync + 'static,
{
    *HOOK.write() = Some(Box::new(hook));
}

/// Remove the installed hook, restoring the logging default.
pub fn reset_undeliverable_hook() {
    *HOOK.write() = None;
}

/// Report an error that has no downstream channel left.
///
/// Never silently drops: with no hook installed the error is logged.
pub fn report_undeliverable(error: RillError) {
    let hook = HOOK.read();
    match &*hook {
        Some(hook) => hook(error),
        None => crate::error!("undeliverable error: {error}"),
    }
}
