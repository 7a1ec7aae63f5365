// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Shared test plumbing: a registration routine that hands the emitter out
//! to the test body so pushes can happen after `subscribe` returns.

#![allow(dead_code)]

use parking_lot::Mutex;
use rill_core::Result;
use rill_flow::{Backpressure, Flow, FlowEmitter};
use std::sync::Arc;

pub struct CapturedEmitter<T> {
    slot: Mutex<Option<Arc<dyn FlowEmitter<T>>>>,
}

impl<T> CapturedEmitter<T> {
    pub fn get(&self) -> Arc<dyn FlowEmitter<T>> {
        self.slot
            .lock()
            .clone()
            .expect("source was not subscribed yet")
    }
}

/// A flow whose registration routine only stashes the emitter for the test.
pub fn capturing_flow<T: Send + 'static>(
    strategy: Backpressure,
) -> (Flow<T>, Arc<CapturedEmitter<T>>) {
    let captured = Arc::new(CapturedEmitter {
        slot: Mutex::new(None),
    });
    let sink = Arc::clone(&captured);
    let flow = Flow::create(
        move |emitter: Arc<dyn FlowEmitter<T>>| -> Result<()> {
            *sink.slot.lock() = Some(emitter);
            Ok(())
        },
        strategy,
    );
    (flow, captured)
}

/// Like [`capturing_flow`], but the producer declares concurrent calls, so
/// the captured emitter is the serializing wrapper.
pub fn capturing_flow_serialized<T: Send + 'static>(
    strategy: Backpressure,
) -> (Flow<T>, Arc<CapturedEmitter<T>>) {
    let (flow, captured) = capturing_flow(strategy);
    (flow.serialized(), captured)
}
