// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Source adapter: wiring order, registration failures, resource cleanup.

mod common;

use common::capturing_flow;
use rill_core::{Result, RillError};
use rill_flow::{Backpressure, Flow, FlowEmitter};
use rill_test_utils::{with_captured_undeliverable, TestSubscriber};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn subscriber_holds_subscription_before_source_runs() {
    // With the Error strategy an immediate push only succeeds if the initial
    // request was already placed, i.e. on_subscribe ran before the source.
    let flow = Flow::create(
        |emitter: Arc<dyn FlowEmitter<i32>>| -> Result<()> {
            assert_eq!(emitter.requested(), 1);
            emitter.on_next(42);
            emitter.on_complete();
            Ok(())
        },
        Backpressure::Error,
    );
    let subscriber = TestSubscriber::with_initial_request(1);
    flow.subscribe(subscriber.clone());

    subscriber.assert_values(&[42]);
    subscriber.assert_completed();
}

#[test]
fn registration_failure_becomes_terminal_error() {
    let flow = Flow::create(
        |_emitter: Arc<dyn FlowEmitter<i32>>| -> Result<()> {
            Err(RillError::stream_error("connect refused"))
        },
        Backpressure::default(),
    );
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    subscriber.assert_errored();
}

#[test]
fn registration_failure_after_terminal_goes_to_fallback() {
    let ((), reported) = with_captured_undeliverable(|| {
        let flow = Flow::create(
            |emitter: Arc<dyn FlowEmitter<i32>>| -> Result<()> {
                emitter.on_complete();
                Err(RillError::stream_error("failed after completing"))
            },
            Backpressure::default(),
        );
        let subscriber = TestSubscriber::new();
        flow.subscribe(subscriber.clone());

        subscriber.assert_completed();
    });
    assert_eq!(reported.len(), 1);
}

#[test]
fn registration_panic_becomes_terminal_error() {
    let flow = Flow::create(
        |_emitter: Arc<dyn FlowEmitter<i32>>| -> Result<()> { panic!("producer blew up") },
        Backpressure::default(),
    );
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    subscriber.assert_errored();
    assert!(matches!(
        subscriber.take_errors()[0],
        RillError::CallbackPanic { .. }
    ));
}

#[test]
fn cancel_action_runs_on_cancellation() {
    let released = Arc::new(AtomicUsize::new(0));
    let (flow, captured) = capturing_flow::<i32>(Backpressure::default());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    let counted = Arc::clone(&released);
    captured.get().set_cancel_action(Box::new(move || {
        counted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));

    subscriber.cancel();
    assert_eq!(released.load(Ordering::SeqCst), 1);

    // Already released; a later terminal must not run it again.
    captured.get().on_complete();
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn cancel_action_runs_after_terminal_delivery() {
    let released = Arc::new(AtomicUsize::new(0));
    let (flow, captured) = capturing_flow::<i32>(Backpressure::default());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    let counted = Arc::clone(&released);
    captured.get().set_cancel_action(Box::new(move || {
        counted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));

    captured.get().on_complete();
    subscriber.assert_completed();
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_cancels_release_exactly_once() {
    let released = Arc::new(AtomicUsize::new(0));
    let (flow, captured) = capturing_flow::<i32>(Backpressure::default());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    let counted = Arc::clone(&released);
    captured.get().set_cancel_action(Box::new(move || {
        counted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));

    let cancellers: Vec<_> = (0..8)
        .map(|_| {
            let subscriber = subscriber.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    subscriber.cancel();
                }
            })
        })
        .collect();
    for c in cancellers {
        c.join().unwrap();
    }

    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn replacing_a_resource_releases_the_old_one() {
    let first = Arc::new(AtomicUsize::new(0));
    let (flow, captured) = capturing_flow::<i32>(Backpressure::default());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    let counted = Arc::clone(&first);
    captured.get().set_cancel_action(Box::new(move || {
        counted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    captured.get().set_cancel_action(Box::new(|| Ok(())));

    assert_eq!(first.load(Ordering::SeqCst), 1);
}

#[test]
fn each_subscription_gets_its_own_emitter() {
    let (flow, captured) = capturing_flow::<i32>(Backpressure::default());

    let first = TestSubscriber::with_initial_request(10);
    flow.subscribe(first.clone());
    let first_emitter = captured.get();
    first_emitter.on_next(1);

    let second = TestSubscriber::with_initial_request(10);
    flow.subscribe(second.clone());
    let second_emitter = captured.get();
    second_emitter.on_next(2);

    first.assert_values(&[1]);
    second.assert_values(&[2]);
}
