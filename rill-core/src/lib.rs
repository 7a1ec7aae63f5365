// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
//! Core contracts and collaborators for the rill push-stream library.
//!
//! This crate holds everything the emitter family in `rill-flow` consumes
//! with a fixed contract: the [`Subscriber`]/[`Subscription`] streaming
//! protocol, the [`RillError`] family, the single-winner [`ErrorSlot`], the
//! idempotent [`Resource`] handles, and the process-wide fallback reporter
//! in [`hooks`].

pub mod error;
pub mod error_slot;
pub mod hooks;
mod logging;
pub mod resource;
pub mod subscriber;

pub use self::error::{Result, RillError};
pub use self::error_slot::ErrorSlot;
pub use self::resource::{ReleaseAction, Resource, ResourceCell};
pub use self::subscriber::{Subscriber, Subscription};
