// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The push-pull streaming contract consumed by rill.
//!
//! Downstream advertises demand through [`Subscription::request`] and may
//! terminate early through [`Subscription::cancel`]; upstream must never
//! deliver more unconsumed items than the outstanding demand. Both sides are
//! shared across threads behind `Arc`, so every callback takes `&self`.

use crate::RillError;
use std::sync::Arc;

/// Demand-control capability handed to a subscriber at subscription time.
pub trait Subscription: Send + Sync {
    /// Add `n` items to the demand budget.
    ///
    /// `n` must be positive; a zero request is a protocol violation and is
    /// reported to the subscriber as a terminal error.
    fn request(&self, n: u64);

    /// Terminate the subscription early.
    ///
    /// Cancellation is one-shot and idempotent. After it takes effect no
    /// further callbacks are invoked and any buffered data is discarded.
    fn cancel(&self);
}

/// A downstream consumer of one subscription.
///
/// The emitter guarantees callbacks are never invoked concurrently and that
/// at most one terminal signal (`on_error` or `on_complete`) is ever
/// delivered. No data item follows a terminal signal.
pub trait Subscriber<T>: Send + Sync {
    /// Called exactly once, before any data flows, with the demand handle.
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>);

    /// Called for each delivered item.
    fn on_next(&self, item: T);

    /// Terminal failure signal.
    fn on_error(&self, error: RillError);

    /// Terminal completion signal.
    fn on_complete(&self);
}
