// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for worker lifecycle and compute events.
//!
//! This module contains message types for logging events related to:
//! * Worker start and stop
//! * Task attempts, each scoped by its own span
//! * Waiting on unresolved dependencies
//! * Compute outcomes reported back to the task source
//! * Task attempts abandoned on shutdown or upstream failure

use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

use crate::model::TaskId;
use crate::observability::messages::StructuredLog;

/// Worker loop started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_abacus::observability::messages::worker::WorkerStarted;
///
/// let msg = WorkerStarted { worker_id: 3 };
/// assert_eq!(msg.to_string(), "Worker 3 started");
/// ```
pub struct WorkerStarted {
    pub worker_id: usize,
}

impl Display for WorkerStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} started", self.worker_id)
    }
}

impl StructuredLog for WorkerStarted {
    fn log(&self) {
        tracing::info!(worker_id = self.worker_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("worker", span_name = name, worker_id = self.worker_id)
    }
}

/// A worker picked up a task; the attempt runs inside this message's span.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct TaskAttempt<'a> {
    pub worker_id: usize,
    pub task_id: &'a TaskId,
    pub operator: &'a str,
}

impl Display for TaskAttempt<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} picked up task {} ({})",
            self.worker_id, self.task_id, self.operator
        )
    }
}

impl StructuredLog for TaskAttempt<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_id = self.worker_id,
            task_id = %self.task_id,
            operator = self.operator,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "task_attempt",
            span_name = name,
            task_id = %self.task_id,
            operator = self.operator,
        )
    }
}

/// Worker loop exited after cancellation.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkerStopped {
    pub worker_id: usize,
    pub tasks_processed: usize,
}

impl Display for WorkerStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} stopped after processing {} tasks",
            self.worker_id, self.tasks_processed
        )
    }
}

impl StructuredLog for WorkerStopped {
    fn log(&self) {
        tracing::info!(
            worker_id = self.worker_id,
            tasks_processed = self.tasks_processed,
            "{}", self
        );
    }
}

/// A dependency is not resolved yet; the worker backs off before asking again.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct DependencyWaiting<'a> {
    pub worker_id: usize,
    pub task_id: &'a TaskId,
    pub dependency: &'a TaskId,
    pub delay: Duration,
}

impl Display for DependencyWaiting<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} waiting {:?} for dependency {} of task {}",
            self.worker_id, self.delay, self.dependency, self.task_id
        )
    }
}

impl StructuredLog for DependencyWaiting<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_id = self.worker_id,
            task_id = %self.task_id,
            dependency = %self.dependency,
            delay_ms = self.delay.as_millis() as u64,
            "{}", self
        );
    }
}

/// Task computed and its result reported.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct TaskComputed<'a> {
    pub worker_id: usize,
    pub task_id: &'a TaskId,
    pub expression: String,
    pub result: f64,
}

impl Display for TaskComputed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} computed task {}: {} = {}",
            self.worker_id, self.task_id, self.expression, self.result
        )
    }
}

impl StructuredLog for TaskComputed<'_> {
    fn log(&self) {
        tracing::debug!(
            worker_id = self.worker_id,
            task_id = %self.task_id,
            result = self.result,
            "{}", self
        );
    }
}

/// Task could not be computed; the failure was reported.
///
/// # Log Level
/// `warn!` - The owning expression will fail
pub struct TaskComputeFailed<'a> {
    pub worker_id: usize,
    pub task_id: &'a TaskId,
    pub reason: &'a str,
}

impl Display for TaskComputeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} failed task {}: {}",
            self.worker_id, self.task_id, self.reason
        )
    }
}

impl StructuredLog for TaskComputeFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            worker_id = self.worker_id,
            task_id = %self.task_id,
            reason = self.reason,
            "{}", self
        );
    }
}

/// Task attempt dropped without a report.
///
/// # Log Level
/// `warn!` - The task stays `running` until something else resolves it
pub struct TaskAbandoned<'a> {
    pub worker_id: usize,
    pub task_id: &'a TaskId,
    pub reason: &'a str,
}

impl Display for TaskAbandoned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} abandoned task {}: {}",
            self.worker_id, self.task_id, self.reason
        )
    }
}

impl StructuredLog for TaskAbandoned<'_> {
    fn log(&self) {
        tracing::warn!(
            worker_id = self.worker_id,
            task_id = %self.task_id,
            reason = self.reason,
            "{}", self
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_message_shows_the_operation() {
        let id = TaskId::new();
        let msg = TaskComputed {
            worker_id: 1,
            task_id: &id,
            expression: "3 * 4".to_string(),
            result: 12.0,
        };
        assert!(msg.to_string().ends_with("3 * 4 = 12"));
    }

    #[test]
    fn only_units_of_work_open_spans() {
        let id = TaskId::new();
        let _default = tracing::subscriber::set_default(
            tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_test_writer()
                .finish(),
        );

        let attempt = TaskAttempt {
            worker_id: 2,
            task_id: &id,
            operator: "+",
        };
        assert!(!attempt.span("attempt").is_disabled());
        assert!(!WorkerStarted { worker_id: 2 }.span("worker").is_disabled());

        let stopped = WorkerStopped {
            worker_id: 2,
            tasks_processed: 0,
        };
        assert!(stopped.span("worker").is_disabled());
    }
}
