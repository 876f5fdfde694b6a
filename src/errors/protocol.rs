// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::model::TaskId;

/// Errors exchanged between workers and the store while resolving or reporting tasks.
///
/// `NotReady` and `Unavailable` are recoverable by retrying with backoff.
/// `UpstreamFailed`, `NotRunning` and `TaskNotFound` end the current task attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// The referenced task has not completed yet.
    #[error("Task {0} has not completed yet")]
    NotReady(TaskId),

    /// The referenced task failed, so its result will never exist.
    #[error("Upstream task {0} failed")]
    UpstreamFailed(TaskId),

    /// A result was submitted for a task that was never dispatched.
    #[error("Task {0} is not running")]
    NotRunning(TaskId),

    /// No task with this id is registered.
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    /// The task source did not answer; treated exactly like `NotReady`.
    #[error("Task source unavailable: {0}")]
    Unavailable(String),
}

impl ProtocolError {
    /// Whether a caller should back off and try the same call again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProtocolError::NotReady(_) | ProtocolError::Unavailable(_))
    }
}
