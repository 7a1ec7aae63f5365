// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The no-backpressure escape hatch.

use crate::base::BaseEmitter;
use crate::emitter::FlowEmitter;
use crate::serialized::SerializedEmitter;
use rill_core::{Resource, RillError, Subscriber, Subscription};
use std::sync::Arc;

/// Delivers every push unconditionally, demand or not.
///
/// Exists for sources that are inherently demand-respecting; the demand
/// counter is still maintained (decrement only while positive, never into
/// deficit) so `requested()` stays meaningful to the producer.
pub struct NoneEmitter<T> {
    base: BaseEmitter<T>,
}

impl<T> NoneEmitter<T> {
    pub(crate) fn new(subscriber: Arc<dyn Subscriber<T>>) -> Self {
        Self {
            base: BaseEmitter::new(subscriber),
        }
    }
}

impl<T: Send + 'static> FlowEmitter<T> for NoneEmitter<T> {
    fn on_next(&self, item: T) {
        if self.base.is_cancelled() {
            return;
        }
        self.base.deliver(item);
        self.base.consume_one_if_positive();
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

impl<T: Send + 'static> Subscription for NoneEmitter<T> {
    fn request(&self, n: u64) {
        if let Err(violation) = self.base.add_request(n) {
            self.on_error(violation);
        }
    }

    fn cancel(&self) {
        self.base.cancel();
    }
}
