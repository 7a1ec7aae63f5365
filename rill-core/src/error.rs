// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the rill push-stream library
//!
//! This module defines the root [`RillError`] type with specific variants for
//! the failure modes a demand-aware push stream can encounter, allowing
//! library users to handle each appropriately.
//!
//! # Examples
//!
//! ```
//! use rill_core::{RillError, Result};
//!
//! fn push_value() -> Result<()> {
//!     // Operation that might fail
//!     Err(RillError::overflow("no outstanding demand to emit"))
//! }
//! ```

/// Root error type for all rill operations
///
/// This enum encompasses all error conditions that can reach a subscriber or
/// the process-wide fallback reporter.
#[derive(Debug, thiserror::Error)]
pub enum RillError {
    /// A value was pushed while no demand was outstanding
    ///
    /// Emitted by the Error backpressure strategy when the producer outruns
    /// the subscriber's requests. Terminal for the stream.
    #[error("Missing backpressure: {context}")]
    MissingBackpressure {
        /// Description of the push that could not be honored
        context: String,
    },

    /// Downstream issued a demand request that violates the protocol
    ///
    /// Requests must be for at least one item. The violation is delivered
    /// to the subscriber as a terminal error rather than crashing the
    /// process.
    #[error("Invalid request: n must be positive, got {n}")]
    InvalidRequest {
        /// The offending request amount
        n: u64,
    },

    /// User-provided callback panicked
    ///
    /// When a registration routine or release action unwinds, the panic is
    /// caught at the emitter boundary and converted to this variant.
    #[error("User callback panicked: {context}")]
    CallbackPanic {
        /// Information about where the panic surfaced
        context: String,
    },

    /// Custom error from user code
    ///
    /// This wraps errors produced by user-provided registration routines and
    /// release actions, allowing them to be propagated through the rill
    /// error system.
    #[error("User error: {0}")]
    UserError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Stream processing encountered an error
    ///
    /// General error for conditions that don't fit other categories.
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong
        context: String,
    },
}

impl RillError {
    /// Create a missing-backpressure (overflow) error with the given context
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::MissingBackpressure {
            context: context.into(),
        }
    }

    /// Create an invalid-request protocol violation for the given amount
    #[must_use]
    pub const fn invalid_request(n: u64) -> Self {
        Self::InvalidRequest { n }
    }

    /// Create a callback-panic error with the given context
    pub fn callback_panic(context: impl Into<String>) -> Self {
        Self::CallbackPanic {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UserError(Box::new(error))
    }

    /// Create a general stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Check if this error is the overflow kind
    ///
    /// Overflow errors are distinguishable so subscribers can tell "the
    /// producer outran my demand" apart from other terminal failures.
    #[must_use]
    pub const fn is_overflow(&self) -> bool {
        matches!(self, Self::MissingBackpressure { .. })
    }

    /// Check if this error is a demand-protocol violation
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. })
    }
}

/// Specialized Result type for rill operations
///
/// This is a type alias for `std::result::Result<T, RillError>`, providing
/// a convenient shorthand for functions that return rill errors.
pub type Result<T> = std::result::Result<T, RillError>;
