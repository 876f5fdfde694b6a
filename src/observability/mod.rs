// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout The Abacus. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names consistent between the human-readable line and the structured event
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::compiler` - Expression submission and compilation events
//! * `messages::store` - Task dispatch, state transitions and expression aggregation
//! * `messages::worker` - Worker lifecycle, dependency waits and compute outcomes
//!
//! # Usage
//!
//! ```rust
//! use the_abacus::observability::messages::worker::WorkerStarted;
//! use the_abacus::observability::messages::StructuredLog;
//!
//! WorkerStarted { worker_id: 0 }.log();
//! ```

pub mod messages;
