// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The buffering strategy: pushes always succeed, a drain loop reconciles
//! the backlog against demand.
//!
//! Producer pushes land in an unbounded lock-free queue; whichever thread
//! claims the work-in-progress counter (0 -> 1) owns the drain loop and
//! moves items downstream until demand or backlog runs out. Calls arriving
//! while a pass runs bump the counter; the owner keeps looping until it has
//! absorbed every missed call, so no push, request or terminal is ever lost
//! and no two threads deliver concurrently.

use crate::base::BaseEmitter;
use crate::emitter::FlowEmitter;
use crate::serialized::SerializedEmitter;
use crossbeam_queue::SegQueue;
use rill_core::{hooks, ErrorSlot, Resource, RillError, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Queues every push and delivers in push order as demand arrives.
pub struct BufferEmitter<T> {
    base: BaseEmitter<T>,
    queue: SegQueue<T>,
    error: ErrorSlot,
    done: AtomicBool,
    wip: AtomicUsize,
}

impl<T> BufferEmitter<T> {
    /// `capacity_hint` is advisory: the queue grows without bound and
    /// allocates in fixed blocks of its own sizing.
    pub(crate) fn new(subscriber: Arc<dyn Subscriber<T>>, capacity_hint: usize) -> Self {
        let _ = capacity_hint;
        Self {
            base: BaseEmitter::new(subscriber),
            queue: SegQueue::new(),
            error: ErrorSlot::new(),
            done: AtomicBool::new(false),
            wip: AtomicUsize::new(0),
        }
    }

    fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            // Another thread owns the loop; it will absorb this call's
            // effect because the buffer mutation happened before drain().
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

                // Read the terminal flag before popping so an empty pop
                // after `done` reliably means "backlog fully delivered".
                let done = self.done.load(Ordering::Acquire);

                match self.queue.pop() {
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
                if self.done.load(Ordering::Acquire) && self.queue.is_empty() {
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
        while self.queue.pop().is_some() {}
    }
}

impl<T: Send + 'static> FlowEmitter<T> for BufferEmitter<T> {
    fn on_next(&self, item: T) {
        if self.base.is_cancelled() || self.done.load(Ordering::Acquire) {
            return;
        }
        self.queue.push(item);
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

impl<T: Send + 'static> Subscription for BufferEmitter<T> {
    fn request(&self, n: u64) {
        match self.base.add_request(n) {
            Ok(()) => self.drain(),
            Err(violation) => self.on_error(violation),
        }
    }

    fn cancel(&self) {
        self.base.cancel();
        // Claim the drain loop if idle and clear the backlog ourselves;
        // otherwise the current owner observes cancellation on its next
        // iteration and clears then.
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.clear();
        }
    }
}
