// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Demand-aware push streams with pluggable backpressure.
//!
//! A producer — possibly several threads of one — pushes values into an
//! emitter; a single subscriber advertises how many items it is willing to
//! receive. The emitter family reconciles the two without blocking: no more
//! items than requested, no events out of order, never two downstream
//! callbacks at once, and no terminal signal lost under races.
//!
//! # Example
//!
//! ```
//! use rill_core::Result;
//! use rill_flow::{Backpressure, Flow, FlowEmitter};
//! use rill_test_utils::TestSubscriber;
//! use std::sync::Arc;
//!
//! let flow = Flow::create(
//!     |emitter: Arc<dyn FlowEmitter<i32>>| -> Result<()> {
//!         emitter.on_next(1);
//!         emitter.on_next(2);
//!         emitter.on_complete();
//!         Ok(())
//!     },
//!     Backpressure::default(),
//! );
//!
//! let subscriber = TestSubscriber::with_initial_request(10);
//! flow.subscribe(subscriber.clone());
//!
//! subscriber.assert_values(&[1, 2]);
//! subscriber.assert_completed();
//! ```

mod base;
pub mod buffer;
pub mod emitter;
pub mod flow;
pub mod latest;
pub mod none;
pub mod overflow;
pub mod serialized;

pub use self::buffer::BufferEmitter;
pub use self::emitter::FlowEmitter;
pub use self::flow::{Backpressure, Flow, FlowSource};
pub use self::latest::LatestEmitter;
pub use self::none::NoneEmitter;
pub use self::overflow::{DropEmitter, ErrorEmitter};
pub use self::serialized::SerializedEmitter;
