// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! State shared by every backpressure strategy.
//!
//! A [`BaseEmitter`] composes the demand counter, the resource cell and the
//! downstream subscriber reference. Strategies embed one and layer their own
//! buffering and drain logic on top; nothing here blocks, all demand
//! accounting is a compare-and-swap on a single atomic counter.

use rill_core::{hooks, Resource, ResourceCell, RillError, Subscriber};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Demand counter, cancellation state and terminal dispatch for one
/// subscription.
///
/// A demand of `u64::MAX` means effectively unbounded: consumption leaves
/// the counter saturated.
pub(crate) struct BaseEmitter<T> {
    subscriber: Arc<dyn Subscriber<T>>,
    requested: AtomicU64,
    resource: ResourceCell,
}

impl<T> BaseEmitter<T> {
    pub(crate) fn new(subscriber: Arc<dyn Subscriber<T>>) -> Self {
        Self {
            subscriber,
            requested: AtomicU64::new(0),
            resource: ResourceCell::new(),
        }
    }

    /// Hand one item to the subscriber. Demand accounting is the caller's
    /// responsibility.
    pub(crate) fn deliver(&self, item: T) {
        self.subscriber.on_next(item);
    }

    /// Deliver completion downstream once, then release the resource cell.
    pub(crate) fn complete(&self) {
        if self.is_cancelled() {
            return;
        }
        self.subscriber.on_complete();
        self.resource.release();
    }

    /// Deliver `error` downstream once, then release the resource cell.
    ///
    /// An error arriving after cancellation or a prior terminal has no
    /// downstream channel left and goes to the fallback reporter.
    pub(crate) fn error(&self, error: RillError) {
        if self.is_cancelled() {
            hooks::report_undeliverable(error);
            return;
        }
        self.subscriber.on_error(error);
        self.resource.release();
    }

    pub(crate) fn cancel(&self) {
        self.resource.release();
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.resource.is_released()
    }

    pub(crate) fn set_resource(&self, resource: Arc<dyn Resource>) {
        self.resource.set(resource);
    }

    pub(crate) fn requested(&self) -> u64 {
        self.requested.load(Ordering::Acquire)
    }

    /// Validate and add a demand request, saturating at `u64::MAX`.
    ///
    /// # Errors
    ///
    /// A zero request is the demand-protocol violation; the caller delivers
    /// the returned error through its own terminal path.
    pub(crate) fn add_request(&self, n: u64) -> Result<(), RillError> {
        if n == 0 {
            return Err(RillError::invalid_request(n));
        }
        let _ = self
            .requested
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| {
                Some(r.saturating_add(n))
            });
        Ok(())
    }

    /// Subtract `n` delivered items from the demand counter.
    ///
    /// Never drives the counter negative and leaves a saturated (unbounded)
    /// counter untouched.
    pub(crate) fn produced(&self, n: u64) {
        let _ = self
            .requested
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| match r {
                u64::MAX => None,
                _ => Some(r.saturating_sub(n)),
            });
    }

    /// Atomically consume one unit of demand iff any is outstanding.
    ///
    /// The positivity check and the decrement are one compare-and-swap, so
    /// a delivery can never ride on stale demand.
    pub(crate) fn try_consume_one(&self) -> bool {
        self.requested
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| match r {
                0 => None,
                u64::MAX => Some(r),
                _ => Some(r - 1),
            })
            .is_ok()
    }

    /// Decrement the demand counter by one only if it is currently positive.
    ///
    /// The None strategy's accounting: it has already delivered regardless
    /// of demand, so the counter must never go into deficit.
    pub(crate) fn consume_one_if_positive(&self) {
        let _ = self
            .requested
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| match r {
                0 => None,
                _ => Some(r - 1),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_core::Subscription;
    use std::sync::Arc;

    struct Discard;

    impl Subscriber<i32> for Discard {
        fn on_subscribe(&self, _subscription: Arc<dyn Subscription>) {}
        fn on_next(&self, _item: i32) {}
        fn on_error(&self, _error: RillError) {}
        fn on_complete(&self) {}
    }

    fn base() -> BaseEmitter<i32> {
        BaseEmitter::new(Arc::new(Discard))
    }

    #[test]
    fn request_saturates_at_max() {
        let base = base();
        base.add_request(u64::MAX).unwrap();
        base.add_request(5).unwrap();
        assert_eq!(base.requested(), u64::MAX);
    }

    #[test]
    fn zero_request_is_rejected() {
        let base = base();
        assert!(base.add_request(0).is_err());
        assert_eq!(base.requested(), 0);
    }

    #[test]
    fn produced_never_goes_negative() {
        let base = base();
        base.add_request(2).unwrap();
        base.produced(5);
        assert_eq!(base.requested(), 0);
    }

    #[test]
    fn produced_keeps_unbounded_demand() {
        let base = base();
        base.add_request(u64::MAX).unwrap();
        base.produced(1_000);
        assert_eq!(base.requested(), u64::MAX);
    }

    #[test]
    fn try_consume_one_stops_at_zero() {
        let base = base();
        base.add_request(2).unwrap();
        assert!(base.try_consume_one());
        assert!(base.try_consume_one());
        assert!(!base.try_consume_one());
    }

    #[test]
    fn consume_if_positive_allows_deficit_free_delivery() {
        let base = base();
        base.consume_one_if_positive();
        assert_eq!(base.requested(), 0);
        base.add_request(1).unwrap();
        base.consume_one_if_positive();
        assert_eq!(base.requested(), 0);
    }
}
