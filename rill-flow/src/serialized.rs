// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Serialization of concurrent producer calls.
//!
//! Any emitter accepts calls from one producer thread at a time; wrapping it
//! in a [`SerializedEmitter`] lifts that restriction. Calls funnel through
//! the same claim-or-defer ownership counter the buffering strategies use:
//! the claiming thread delivers, everyone else leaves its contribution in
//! the queue (or the single-winner error slot) for the owner to absorb.
//! Calls made by one thread are delivered in the order made; calls from
//! different threads interleave in an unspecified but non-overlapping order.

use crate::emitter::FlowEmitter;
use crossbeam_queue::SegQueue;
use rill_core::{hooks, ErrorSlot, Resource, RillError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Makes a wrapped emitter safe to call from multiple producer threads.
pub struct SerializedEmitter<T> {
    emitter: Arc<dyn FlowEmitter<T>>,
    queue: SegQueue<T>,
    error: ErrorSlot,
    done: AtomicBool,
    wip: AtomicUsize,
}

impl<T: Send + 'static> SerializedEmitter<T> {
    pub(crate) fn new(emitter: Arc<dyn FlowEmitter<T>>) -> Self {
        Self {
            emitter,
            queue: SegQueue::new(),
            error: ErrorSlot::new(),
            done: AtomicBool::new(false),
            wip: AtomicUsize::new(0),
        }
    }

    fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.drain_loop();
        }
    }

    fn drain_loop(&self) {
        let mut missed = 1;
        loop {
            loop {
                if self.emitter.is_cancelled() {
                    self.clear();
                    return;
                }

                if self.error.is_set() {
                    self.clear();
                    if let Some(error) = self.error.take() {
                        self.emitter.on_error(error);
                    }
                    return;
                }

                let done = self.done.load(Ordering::Acquire);

                match self.queue.pop() {
                    Some(item) => self.emitter.on_next(item),
                    None => {
                        if done {
                            self.emitter.on_complete();
                            return;
                        }
                        break;
                    }
                }
            }

            let previous = self.wip.fetch_sub(missed, Ordering::AcqRel);
            missed = previous - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn clear(&self) {
        while self.queue.pop().is_some() {}
    }
}

impl<T: Send + 'static> FlowEmitter<T> for SerializedEmitter<T> {
    fn on_next(&self, item: T) {
        if self.emitter.is_cancelled() || self.done.load(Ordering::Acquire) {
            return;
        }
        if self
            .wip
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            // Fast path: sole caller, deliver without touching the queue.
            self.emitter.on_next(item);
            if self.wip.fetch_sub(1, Ordering::AcqRel) == 1 {
                return;
            }
        } else {
            self.queue.push(item);
            if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
                return;
            }
        }
        self.drain_loop();
    }

    fn on_error(&self, error: RillError) {
        if self.emitter.is_cancelled() || self.done.load(Ordering::Acquire) {
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
        if self.emitter.is_cancelled() || self.done.load(Ordering::Acquire) {
            return;
        }
        self.done.store(true, Ordering::Release);
        self.drain();
    }

    fn set_resource(&self, resource: Arc<dyn Resource>) {
        self.emitter.set_resource(resource);
    }

    fn requested(&self) -> u64 {
        self.emitter.requested()
    }

    fn is_cancelled(&self) -> bool {
        self.emitter.is_cancelled()
    }

    fn serialize(self: Arc<Self>) -> Arc<dyn FlowEmitter<T>> {
        self
    }
}
