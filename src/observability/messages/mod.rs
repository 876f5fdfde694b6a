// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same information as structured fields at
//! the message's own level. Worker messages that open a unit of work
//! (`WorkerStarted`, `TaskAttempt`) also build the span the work runs in.
//!
//! # Organization
//!
//! * `compiler` - Expression submission and compilation events
//! * `store` - Dispatch, task transitions and aggregation events
//! * `worker` - Worker lifecycle and compute events
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_abacus::observability::messages::compiler::ExpressionRejected;
//! use the_abacus::errors::CompileError;
//!
//! let error = CompileError::InsufficientOperands;
//! let msg = ExpressionRejected {
//!     owner: "alice",
//!     source: "2++2",
//!     error: &error,
//! };
//!
//! tracing::warn!("{}", msg);
//! ```

use tracing::Span;

pub mod compiler;
pub mod store;
pub mod worker;

/// Emits a message as a structured `tracing` event or span.
pub trait StructuredLog {
    /// Emit the message as an event at its documented level
    fn log(&self);

    /// Build a span carrying the message's fields.
    ///
    /// Only messages that open a unit of work scope one; the rest return
    /// a disabled span.
    fn span(&self, _name: &str) -> Span {
        Span::none()
    }
}
