// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The capability handed to a producer's registration routine.

use rill_core::{ReleaseAction, Resource, Result, RillError};
use std::sync::Arc;

/// Push side of one subscription.
///
/// A `FlowEmitter` accepts values and terminal signals from the producer and
/// reconciles them against downstream demand according to the configured
/// backpressure strategy. Unless wrapped by [`serialize`](Self::serialize),
/// producer calls must come from one thread at a time.
pub trait FlowEmitter<T>: Send + Sync {
    /// Push a value toward the subscriber.
    fn on_next(&self, item: T);

    /// Terminate the stream with `error`.
    ///
    /// If the stream is already terminated or cancelled the error is routed
    /// to the fallback reporter instead of being dropped.
    fn on_error(&self, error: RillError);

    /// Terminate the stream normally.
    fn on_complete(&self);

    /// Attach a resource released on terminal delivery or cancellation.
    ///
    /// Replaces (and releases) any previously attached resource.
    fn set_resource(&self, resource: Arc<dyn Resource>);

    /// Convenience: attach a plain callback as the release action.
    fn set_cancel_action(&self, action: Box<dyn FnOnce() -> Result<()> + Send>) {
        self.set_resource(Arc::new(ReleaseAction::new(action)));
    }

    /// Current outstanding demand.
    fn requested(&self) -> u64;

    /// True once the subscription has been cancelled or terminated.
    fn is_cancelled(&self) -> bool;

    /// Wrap this emitter so it is safe to call from multiple producer
    /// threads concurrently.
    ///
    /// Repeated calls on a strategy emitter return independent wrappers
    /// sharing the underlying emitter; concurrency safety is per wrapper
    /// instance, so funnel all producers through one consistent wrapper.
    fn serialize(self: Arc<Self>) -> Arc<dyn FlowEmitter<T>>;
}
