// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Idempotent cancellation handles.
//!
//! A [`Resource`] wraps one release action and guarantees it runs at most
//! once, no matter how many threads race to release it. [`ResourceCell`] is
//! the serial container emitters use to compose their own cleanup with a
//! resource attached later by the producer: releasing the cell releases the
//! current occupant, and a resource set after release is released on the
//! spot instead of being leaked.

use crate::{hooks, Result, RillError};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cancellable resource: one release action, at-most-once.
pub trait Resource: Send + Sync {
    /// Run the release action if it has not run yet.
    ///
    /// Concurrent callers after the first observe a no-op. Failures inside
    /// the action are reported to the fallback reporter, never propagated.
    fn release(&self);

    /// Returns `true` iff the action has already run or the handle was
    /// constructed already-released.
    fn is_released(&self) -> bool;
}

type Action = Box<dyn FnOnce() -> Result<()> + Send>;

/// Adapts a single release callback into the [`Resource`] contract.
pub struct ReleaseAction {
    action: Mutex<Option<Action>>,
}

impl ReleaseAction {
    /// Wrap `action` so it runs at most once.
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        Self {
            action: Mutex::new(Some(Box::new(action))),
        }
    }

    /// A handle that is already released; `release()` is a no-op.
    #[must_use]
    pub fn released() -> Self {
        Self {
            action: Mutex::new(None),
        }
    }
}

impl Resource for ReleaseAction {
    fn release(&self) {
        // Taking the action out of the slot claims it exactly once; the
        // action itself runs outside the lock so it may re-enter the handle.
        let action = self.action.lock().take();
        if let Some(action) = action {
            match catch_unwind(AssertUnwindSafe(action)) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => hooks::report_undeliverable(error),
                Err(_) => hooks::report_undeliverable(RillError::callback_panic(
                    "release action panicked",
                )),
            }
        }
    }

    fn is_released(&self) -> bool {
        self.action.lock().is_none()
    }
}

/// Serial container for at most one [`Resource`].
///
/// Emitters own one cell apiece: the producer may attach a resource at any
/// time, terminal delivery and cancellation release the cell, and whichever
/// happens first wins. Replacing the occupant releases the one replaced.
pub struct ResourceCell {
    released: AtomicBool,
    current: Mutex<Option<Arc<dyn Resource>>>,
}

impl ResourceCell {
    /// An empty, not-yet-released cell.
    #[must_use]
    pub fn new() -> Self {
        Self {
            released: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    /// Attach `resource`, releasing any previous occupant.
    ///
    /// If the cell was already released the incoming resource is released
    /// immediately.
    pub fn set(&self, resource: Arc<dyn Resource>) {
        let replaced = {
            let mut current = self.current.lock();
            // `released` only flips under this lock, so the check is not racy.
            if self.released.load(Ordering::Acquire) {
                drop(current);
                resource.release();
                return;
            }
            current.replace(resource)
        };
        if let Some(old) = replaced {
            old.release();
        }
    }

    /// Release the cell and its occupant. Idempotent.
    pub fn release(&self) {
        let taken = {
            let mut current = self.current.lock();
            if self.released.swap(true, Ordering::AcqRel) {
                return;
            }
            current.take()
        };
        if let Some(resource) = taken {
            resource.release();
        }
    }

    /// Returns `true` once [`release`](Self::release) has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Default for ResourceCell {
    fn default() -> Self {
        Self::new()
    }
}
