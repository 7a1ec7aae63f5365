// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Overflow-on-zero-demand strategies.
//!
//! Drop and Error share one skeleton: a push is delivered iff a unit of
//! demand can be consumed atomically; with no demand outstanding the push
//! overflows. Drop discards the overflowing value silently, Error terminates
//! the stream with a distinguishable missing-backpressure error. Neither
//! buffers anything.

use crate::base::BaseEmitter;
use crate::emitter::FlowEmitter;
use crate::serialized::SerializedEmitter;
use rill_core::{Resource, RillError, Subscriber, Subscription};
use std::sync::Arc;

/// Discards pushes that arrive with zero outstanding demand.
pub struct DropEmitter<T> {
    base: BaseEmitter<T>,
}

impl<T> DropEmitter<T> {
    pub(crate) fn new(subscriber: Arc<dyn Subscriber<T>>) -> Self {
        Self {
            base: BaseEmitter::new(subscriber),
        }
    }
}

impl<T: Send + 'static> FlowEmitter<T> for DropEmitter<T> {
    fn on_next(&self, item: T) {
        if self.base.is_cancelled() {
            return;
        }
        if self.base.try_consume_one() {
            self.base.deliver(item);
        }
        // No demand: drop the value, no signal to anyone.
    }

    fn on_error(&self, error: RillError) {
        self.base.error(error);
    }

    fn on_complete(&self) {
        self.base.complete();
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

impl<T: Send + 'static> Subscription for DropEmitter<T> {
    fn request(&self, n: u64) {
        if let Err(violation) = self.base.add_request(n) {
            self.on_error(violation);
        }
    }

    fn cancel(&self) {
        self.base.cancel();
    }
}

/// Terminates the stream when a push arrives with zero outstanding demand.
pub struct ErrorEmitter<T> {
    base: BaseEmitter<T>,
}

impl<T> ErrorEmitter<T> {
    pub(crate) fn new(subscriber: Arc<dyn Subscriber<T>>) -> Self {
        Self {
            base: BaseEmitter::new(subscriber),
        }
    }
}

impl<T: Send + 'static> FlowEmitter<T> for ErrorEmitter<T> {
    fn on_next(&self, item: T) {
        if self.base.is_cancelled() {
            return;
        }
        if self.base.try_consume_one() {
            self.base.deliver(item);
        } else {
            self.on_error(RillError::overflow("no outstanding demand to emit"));
        }
    }

    fn on_error(&self, error: RillError) {
        self.base.error(error);
    }

    fn on_complete(&self) {
        self.base.complete();
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

impl<T: Send + 'static> Subscription for ErrorEmitter<T> {
    fn request(&self, n: u64) {
        if let Err(violation) = self.base.add_request(n) {
            self.on_error(violation);
        }
    }

    fn cancel(&self) {
        self.base.cancel();
    }
}
