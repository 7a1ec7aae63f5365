// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The lossy-coalescing strategy: bursts collapse to the most recent value.
//!
//! Same drain-loop shape as the buffering strategy, but the "buffer" is a
//! single slot the producer overwrites on every push. A value overwritten
//! before the drain loop takes it is never delivered; that is the intended
//! coalescing behavior, not a race. The slot lock is held only for the swap,
//! never across a subscriber callback.

use crate::base::BaseEmitter;
use crate::emitter::FlowEmitter;
use crate::serialized::SerializedEmitter;
use parking_lot::Mutex;
use rill_core::{hooks, ErrorSlot, Resource, RillError, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Keeps only the most recent undelivered value.
pub struct LatestEmitter<T> {
    base: BaseEmitter<T>,
    slot: Mutex<Option<T>>,
    error: ErrorSlot,
    done: AtomicBool,
    wip: AtomicUsize,
}

impl<T> LatestEmitter<T> {
    pub(crate) fn new(subscriber: Arc<dyn Subscriber<T>>) -> Self {
        Self {
            base: BaseEmitter::new(subscriber),
            slot: Mutex::new(None),
            error: ErrorSlot::new(),
            done: AtomicBool::new(false),
            wip: AtomicUsize::new(0),
        }
    }

    fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }
        self.drain_loop();
    }

    fn drain_loop(&self) {
        let mut missed = 1;
        loop {
            let r = self.base.requested();
            let mut emitted = 0u64;

            while emitted != r {
                if self.base.is_cancelled() {
                    self.clear();
                    return;
                }

                let done = self.done.load(Ordering::Acquire);

                // Bind before matching so the slot lock is dropped before
                // the subscriber callback runs.
                let taken = self.slot.lock().take();
                match taken {
                    Some(item) => {
                        self.base.deliver(item);
                        emitted += 1;
                    }
                    None => {
                        if done {
                            self.terminate();
                            return;
                        }
                        break;
                    }
                }
            }

            if emitted == r {
                if self.base.is_cancelled() {
                    self.clear();
                    return;
                }
                if self.done.load(Ordering::Acquire) && self.slot.lock().is_none() {
                    self.terminate();
                    return;
                }
            }

            if emitted != 0 {
                self.base.produced(emitted);
            }

            let previous = self.wip.fetch_sub(missed, Ordering::AcqRel);
            missed = previous - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn terminate(&self) {
        match self.error.take() {
            Some(error) => self.base.error(error),
            None => self.base.complete(),
        }
    }

    fn clear(&self) {
        *self.slot.lock() = None;
    }
}

impl<T: Send + 'static> FlowEmitter<T> for LatestEmitter<T> {
    fn on_next(&self, item: T) {
        if self.base.is_cancelled() || self.done.load(Ordering::Acquire) {
            return;
        }
        *self.slot.lock() = Some(item);
        self.drain();
    }

    fn on_error(&self, error: RillError) {
        if self.base.is_cancelled() || self.done.load(Ordering::Acquire) {
            hooks::report_undeliverable(error);
            return;
        }
        match self.error.try_store(error) {
            Ok(()) => {
                self.done.store(true, Ordering::Release);
                self.drain();
            }
            Err(rejected) => hooks::report_undeliverable(rejected),
        }
    }

    fn on_complete(&self) {
        if self.base.is_cancelled() || self.done.load(Ordering::Acquire) {
            return;
        }
        self.done.store(true, Ordering::Release);
        self.drain();
    }

    fn set_resource(&self, resource: Arc<dyn Resource>) {
        self.base.set_resource(resource);
    }

    fn requested(&self) -> u64 {
        self.base.requested()
    }

    fn is_cancelled(&self) -> bool {
        self.base.is_cancelled()
    }

    fn serialize(self: Arc<Self>) -> Arc<dyn FlowEmitter<T>> {
        Arc::new(SerializedEmitter::new(self))
    }
}

impl<T: Send + 'static> Subscription for LatestEmitter<T> {
    fn request(&self, n: u64) {
        match self.base.add_request(n) {
            Ok(()) => self.drain(),
            Err(violation) => self.on_error(violation),
        }
    }

    fn cancel(&self) {
        self.base.cancel();
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.clear();
        }
    }
}
