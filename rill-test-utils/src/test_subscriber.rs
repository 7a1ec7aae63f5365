// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A recording subscriber for exercising emitters in tests.

use parking_lot::Mutex;
use rill_core::{RillError, Subscriber, Subscription};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct Recorded<T> {
    items: Vec<T>,
    errors: Vec<RillError>,
    completions: usize,
}

/// Records every event it receives and asserts callbacks never overlap.
///
/// The overlap guard covers `on_next`/`on_error`/`on_complete`: two threads
/// inside any of them at once is a serialization violation and panics the
/// test. `on_subscribe` is exempt because issuing the initial request from
/// inside it may legitimately deliver items while it is still on the stack.
pub struct TestSubscriber<T> {
    recorded: Mutex<Recorded<T>>,
    subscription: Mutex<Option<Arc<dyn Subscription>>>,
    initial_request: u64,
    in_callback: AtomicBool,
}

impl<T: Send> TestSubscriber<T> {
    /// A subscriber that issues no initial demand.
    pub fn new() -> Arc<Self> {
        Self::with_initial_request(0)
    }

    /// A subscriber that requests `n` items as soon as it is subscribed.
    pub fn with_initial_request(n: u64) -> Arc<Self> {
        Arc::new(Self {
            recorded: Mutex::new(Recorded {
                items: Vec::new(),
                errors: Vec::new(),
                completions: 0,
            }),
            subscription: Mutex::new(None),
            initial_request: n,
            in_callback: AtomicBool::new(false),
        })
    }

    fn enter_callback(&self) -> CallbackGuard<'_> {
        assert!(
            !self.in_callback.swap(true, Ordering::SeqCst),
            "overlapping subscriber callbacks observed"
        );
        CallbackGuard {
            flag: &self.in_callback,
        }
    }

    /// Request `n` more items through the stored subscription.
    pub fn request(&self, n: u64) {
        self.subscription
            .lock()
            .as_ref()
            .expect("not subscribed yet")
            .request(n);
    }

    /// Cancel through the stored subscription.
    pub fn cancel(&self) {
        self.subscription
            .lock()
            .as_ref()
            .expect("not subscribed yet")
            .cancel();
    }

    /// Snapshot of all delivered items.
    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.recorded.lock().items.clone()
    }

    /// Number of delivered items.
    pub fn value_count(&self) -> usize {
        self.recorded.lock().items.len()
    }

    /// Number of terminal errors received (more than one is a bug).
    pub fn error_count(&self) -> usize {
        self.recorded.lock().errors.len()
    }

    /// Number of completions received (more than one is a bug).
    pub fn completion_count(&self) -> usize {
        self.recorded.lock().completions
    }

    /// Drain the recorded errors for inspection.
    pub fn take_errors(&self) -> Vec<RillError> {
        std::mem::take(&mut self.recorded.lock().errors)
    }

    /// True once any terminal signal arrived.
    pub fn is_terminated(&self) -> bool {
        let recorded = self.recorded.lock();
        recorded.completions > 0 || !recorded.errors.is_empty()
    }

    /// Assert exactly these items were delivered, in order.
    pub fn assert_values(&self, expected: &[T])
    where
        T: PartialEq + std::fmt::Debug,
    {
        let recorded = self.recorded.lock();
        assert_eq!(recorded.items, expected);
    }

    /// Assert no terminal signal has been delivered yet.
    pub fn assert_not_terminated(&self) {
        let recorded = self.recorded.lock();
        assert_eq!(recorded.completions, 0, "unexpected completion");
        assert!(recorded.errors.is_empty(), "unexpected error");
    }

    /// Assert exactly one completion and no errors.
    pub fn assert_completed(&self) {
        let recorded = self.recorded.lock();
        assert_eq!(recorded.completions, 1, "expected exactly one completion");
        assert!(recorded.errors.is_empty(), "unexpected error");
    }

    /// Assert exactly one error and no completion, returning nothing but
    /// leaving the error in place for variant checks via [`take_errors`].
    ///
    /// [`take_errors`]: Self::take_errors
    pub fn assert_errored(&self) {
        let recorded = self.recorded.lock();
        assert_eq!(recorded.errors.len(), 1, "expected exactly one error");
        assert_eq!(recorded.completions, 0, "unexpected completion");
    }
}

impl<T: Send> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&self, subscription: Arc<dyn Subscription>) {
        *self.subscription.lock() = Some(subscription.clone());
        if self.initial_request > 0 {
            subscription.request(self.initial_request);
        }
    }

    fn on_next(&self, item: T) {
        let _guard = self.enter_callback();
        self.recorded.lock().items.push(item);
    }

    fn on_error(&self, error: RillError) {
        let _guard = self.enter_callback();
        self.recorded.lock().errors.push(error);
    }

    fn on_complete(&self) {
        let _guard = self.enter_callback();
        self.recorded.lock().completions += 1;
    }
}

struct CallbackGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for CallbackGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
