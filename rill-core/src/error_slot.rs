// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Single-winner terminal-error storage.
//!
//! Concurrent attempts to store an error succeed for exactly one caller;
//! later attempts are rejected and must be routed to the fallback reporter
//! by the caller. Once won the slot never accepts another error, even after
//! the stored one has been taken for delivery.

use crate::RillError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A storage location that accepts exactly one error among racing writers.
pub struct ErrorSlot {
    // Fast-path flag for drain loops; stays true forever once set.
    set: AtomicBool,
    slot: Mutex<Option<RillError>>,
}

impl ErrorSlot {
    /// An empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            set: AtomicBool::new(false),
            slot: Mutex::new(None),
        }
    }

    /// Attempt to store `error`.
    ///
    /// # Errors
    ///
    /// The single winner gets `Ok(())`; every later caller gets its error
    /// back so it can be reported elsewhere.
    pub fn try_store(&self, error: RillError) -> Result<(), RillError> {
        let mut slot = self.slot.lock();
        if self.set.load(Ordering::Acquire) {
            return Err(error);
        }
        *slot = Some(error);
        self.set.store(true, Ordering::Release);
        Ok(())
    }

    /// Cheap check whether an error has ever been stored.
    ///
    /// Remains `true` after [`take`](Self::take).
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }

    /// Take the stored error for delivery, leaving the slot won but empty.
    pub fn take(&self) -> Option<RillError> {
        self.slot.lock().take()
    }
}

impl Default for ErrorSlot {
    fn default() -> Self {
        Self::new()
    }
}
