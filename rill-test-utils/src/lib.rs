// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
//! Test utilities for the rill workspace.

pub mod hook_capture;
pub mod test_subscriber;

pub use self::hook_capture::with_captured_undeliverable;
pub use self::test_subscriber::TestSubscriber;
