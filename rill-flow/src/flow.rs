// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The entry point: wire a raw emission source to one subscriber.
//!
//! A [`Flow`] pairs a producer registration routine with a [`Backpressure`]
//! strategy. Subscribing instantiates the matching emitter, hands it to the
//! subscriber as its [`Subscription`] before any data flows, then invokes
//! the registration routine with the emitter (wrapped for serialization if
//! the producer declared its calls may be concurrent).

use crate::buffer::BufferEmitter;
use crate::emitter::FlowEmitter;
use crate::latest::LatestEmitter;
use crate::none::NoneEmitter;
use crate::overflow::{DropEmitter, ErrorEmitter};
use rill_core::{Result, RillError, Subscriber, Subscription};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Overflow policy applied when the producer outruns downstream demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backpressure {
    /// Deliver unconditionally; the producer is trusted to self-regulate.
    None,
    /// Terminate with a missing-backpressure error on a zero-demand push.
    Error,
    /// Silently discard zero-demand pushes.
    Drop,
    /// Coalesce bursts: only the most recent undelivered value survives.
    Latest,
    /// Queue everything and deliver as demand arrives.
    Buffer {
        /// Advisory sizing hint for the backlog; the buffer stays unbounded.
        capacity_hint: usize,
    },
}

impl Backpressure {
    /// Default backlog sizing hint for the Buffer strategy.
    pub const DEFAULT_CAPACITY_HINT: usize = 128;
}

impl Default for Backpressure {
    fn default() -> Self {
        Self::Buffer {
            capacity_hint: Self::DEFAULT_CAPACITY_HINT,
        }
    }
}

/// A producer's registration routine.
///
/// Invoked once per subscription with the emitter to push into. A
/// synchronous failure terminates the stream with the returned error.
pub trait FlowSource<T>: Send + Sync {
    /// Start producing into `emitter`.
    ///
    /// # Errors
    ///
    /// Any error returned here is delivered downstream as the terminal
    /// signal, provided the emitter can still accept one.
    fn subscribe(&self, emitter: Arc<dyn FlowEmitter<T>>) -> Result<()>;
}

impl<T, F> FlowSource<T> for F
where
    F: Fn(Arc<dyn FlowEmitter<T>>) -> Result<()> + Send + Sync,
{
    fn subscribe(&self, emitter: Arc<dyn FlowEmitter<T>>) -> Result<()> {
        self(emitter)
    }
}

/// A cold push stream: each subscriber gets its own emitter and its own run
/// of the registration routine.
pub struct Flow<T> {
    source: Arc<dyn FlowSource<T>>,
    strategy: Backpressure,
    serialize_producer: bool,
}

impl<T: Send + 'static> Flow<T> {
    /// Create a flow from a registration routine and a strategy.
    pub fn create(source: impl FlowSource<T> + 'static, strategy: Backpressure) -> Self {
        Self {
            source: Arc::new(source),
            strategy,
            serialize_producer: false,
        }
    }

    /// Declare that the producer may call the emitter from multiple threads
    /// concurrently; it will receive a serializing wrapper.
    #[must_use]
    pub fn serialized(mut self) -> Self {
        self.serialize_producer = true;
        self
    }

    /// Subscribe `subscriber` and start the producer.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) {
        match self.strategy {
            Backpressure::None => self.connect(Arc::new(NoneEmitter::new(subscriber.clone())), &subscriber),
            Backpressure::Error => {
                self.connect(Arc::new(ErrorEmitter::new(subscriber.clone())), &subscriber);
            }
            Backpressure::Drop => {
                self.connect(Arc::new(DropEmitter::new(subscriber.clone())), &subscriber);
            }
            Backpressure::Latest => {
                self.connect(Arc::new(LatestEmitter::new(subscriber.clone())), &subscriber);
            }
            Backpressure::Buffer { capacity_hint } => self.connect(
                Arc::new(BufferEmitter::new(subscriber.clone(), capacity_hint)),
                &subscriber,
            ),
        }
    }

    fn connect<E>(&self, emitter: Arc<E>, subscriber: &Arc<dyn Subscriber<T>>)
    where
        E: FlowEmitter<T> + Subscription + 'static,
    {
        let subscription: Arc<dyn Subscription> = emitter.clone();
        subscriber.on_subscribe(subscription);

        let producer: Arc<dyn FlowEmitter<T>> = if self.serialize_producer {
            emitter.serialize()
        } else {
            emitter
        };

        // The registration routine is user code; a panic must not unwind
        // past the emitter boundary.
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.source.subscribe(Arc::clone(&producer))
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => producer.on_error(error),
            Err(_) => {
                producer.on_error(RillError::callback_panic("source registration panicked"));
            }
        }
    }
}
