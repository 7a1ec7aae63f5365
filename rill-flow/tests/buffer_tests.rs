// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Buffer strategy: every push is retained and delivered in order as demand
//! arrives; terminals wait behind the backlog.

mod common;

use common::capturing_flow;
use rill_core::RillError;
use rill_flow::Backpressure;
use rill_test_utils::{with_captured_undeliverable, TestSubscriber};
use std::sync::Arc;
use std::thread;

fn buffer() -> Backpressure {
    Backpressure::Buffer { capacity_hint: 16 }
}

#[test]
fn backlog_drains_against_demand_in_order() {
    let (flow, captured) = capturing_flow::<i32>(buffer());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    let emitter = captured.get();
    emitter.on_next(1);
    emitter.on_next(2);
    emitter.on_next(3);
    subscriber.assert_values(&[]);

    subscriber.request(2);
    subscriber.assert_values(&[1, 2]);
    subscriber.assert_not_terminated();

    subscriber.request(1);
    subscriber.assert_values(&[1, 2, 3]);

    emitter.on_complete();
    subscriber.assert_completed();

    // Terminated: further producer calls are inert.
    emitter.on_next(4);
    subscriber.assert_values(&[1, 2, 3]);
    assert_eq!(subscriber.completion_count(), 1);
}

#[test]
fn completion_waits_for_backlog() {
    let (flow, captured) = capturing_flow::<i32>(buffer());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    let emitter = captured.get();
    emitter.on_next(1);
    emitter.on_complete();
    subscriber.assert_not_terminated();

    subscriber.request(1);
    subscriber.assert_values(&[1]);
    subscriber.assert_completed();
}

#[test]
fn error_waits_for_backlog() {
    let (flow, captured) = capturing_flow::<i32>(buffer());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    let emitter = captured.get();
    emitter.on_next(1);
    emitter.on_error(RillError::stream_error("source failed"));
    subscriber.assert_not_terminated();

    subscriber.request(1);
    subscriber.assert_values(&[1]);
    subscriber.assert_errored();
}

#[test]
fn terminal_needs_no_demand_once_backlog_is_empty() {
    let (flow, captured) = capturing_flow::<i32>(buffer());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    captured.get().on_complete();
    subscriber.assert_completed();
}

#[test]
fn prefetched_demand_delivers_immediately() {
    let (flow, captured) = capturing_flow::<i32>(buffer());
    let subscriber = TestSubscriber::with_initial_request(10);
    flow.subscribe(subscriber.clone());

    let emitter = captured.get();
    emitter.on_next(7);
    emitter.on_next(8);
    subscriber.assert_values(&[7, 8]);
}

#[test]
fn late_error_goes_to_fallback_reporter() {
    let ((), errors) = with_captured_undeliverable(|| {
        let (flow, captured) = capturing_flow::<i32>(buffer());
        let subscriber = TestSubscriber::new();
        flow.subscribe(subscriber.clone());

        let emitter = captured.get();
        emitter.on_complete();
        subscriber.assert_completed();

        emitter.on_error(RillError::stream_error("too late"));
        subscriber.assert_completed();
    });
    assert_eq!(errors.len(), 1);
}

#[test]
fn cancel_discards_backlog() {
    let (flow, captured) = capturing_flow::<i32>(buffer());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    let emitter = captured.get();
    emitter.on_next(1);
    emitter.on_next(2);
    subscriber.cancel();

    subscriber.request(10);
    subscriber.assert_values(&[]);
    subscriber.assert_not_terminated();
    assert!(emitter.is_cancelled());
}

#[test]
fn zero_request_terminates_with_protocol_violation() {
    let (flow, captured) = capturing_flow::<i32>(buffer());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    subscriber.request(0);
    subscriber.assert_errored();
    assert!(subscriber.take_errors()[0].is_protocol_violation());
    assert!(captured.get().is_cancelled());
}

#[test]
fn concurrent_pushes_and_requests_lose_nothing() {
    let (flow, captured) = capturing_flow::<u32>(buffer());
    let subscriber = TestSubscriber::new();
    flow.subscribe(subscriber.clone());

    let emitter = captured.get();
    const TOTAL: u32 = 10_000;

    let producer = thread::spawn({
        let emitter = Arc::clone(&emitter);
        move || {
            for i in 0..TOTAL {
                emitter.on_next(i);
            }
            emitter.on_complete();
        }
    });
    let requester = thread::spawn({
        let subscriber = subscriber.clone();
        move || {
            for _ in 0..(TOTAL / 10) {
                subscriber.request(10);
            }
        }
    });

    producer.join().unwrap();
    requester.join().unwrap();
    // All demand has been granted by now, so the backlog is fully drained.
    subscriber.request(1);

    let values = subscriber.values();
    assert_eq!(values, (0..TOTAL).collect::<Vec<_>>());
    subscriber.assert_completed();
}

#[test]
fn unbounded_request_streams_everything() {
    let (flow, captured) = capturing_flow::<u32>(buffer());
    let subscriber = TestSubscriber::with_initial_request(u64::MAX);
    flow.subscribe(subscriber.clone());

    let emitter = captured.get();
    for i in 0..1_000 {
        emitter.on_next(i);
    }
    emitter.on_complete();

    assert_eq!(subscriber.value_count(), 1_000);
    subscriber.assert_completed();
    assert_eq!(emitter.requested(), u64::MAX);
}
