// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for state store events.
//!
//! This module contains message types for logging events related to:
//! * Expression registration
//! * Task dispatch (pending to running)
//! * Task completion and failure
//! * Late submissions against terminal tasks
//! * Expression aggregation to a terminal status

use std::fmt::{Display, Formatter};

use crate::model::{ExpressionId, ExpressionStatus, Operator, TaskId, TaskStatus};
use crate::observability::messages::StructuredLog;

/// Expression and its tasks registered atomically.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct ExpressionRegistered<'a> {
    pub expression_id: &'a ExpressionId,
    pub task_count: usize,
    pub ready_count: usize,
}

impl Display for ExpressionRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered expression {} with {} tasks ({} immediately dispatchable)",
            self.expression_id, self.task_count, self.ready_count
        )
    }
}

impl StructuredLog for ExpressionRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            expression_id = %self.expression_id,
            task_count = self.task_count,
            ready_count = self.ready_count,
            "{}", self
        );
    }
}

/// Task claimed by a worker.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct TaskDispatched<'a> {
    pub task_id: &'a TaskId,
    pub expression_id: &'a ExpressionId,
    pub operator: Operator,
}

impl Display for TaskDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatched task {} ({}) of expression {}",
            self.task_id, self.operator, self.expression_id
        )
    }
}

impl StructuredLog for TaskDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            task_id = %self.task_id,
            expression_id = %self.expression_id,
            operator = %self.operator,
            "{}", self
        );
    }
}

/// Task reached `completed`.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct TaskCompleted<'a> {
    pub task_id: &'a TaskId,
    pub result: f64,
    pub unblocked: usize,
}

impl Display for TaskCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task {} completed with result {} ({} dependents now dispatchable)",
            self.task_id, self.result, self.unblocked
        )
    }
}

impl StructuredLog for TaskCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            task_id = %self.task_id,
            result = self.result,
            unblocked = self.unblocked,
            "{}", self
        );
    }
}

/// Task reached `failed`.
///
/// # Log Level
/// `warn!` - Degraded outcome for one expression
pub struct TaskFailed<'a> {
    pub task_id: &'a TaskId,
    pub expression_id: &'a ExpressionId,
    pub reason: &'a str,
}

impl Display for TaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task {} of expression {} failed: {}",
            self.task_id, self.expression_id, self.reason
        )
    }
}

impl StructuredLog for TaskFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            task_id = %self.task_id,
            expression_id = %self.expression_id,
            reason = self.reason,
            "{}", self
        );
    }
}

/// A write arrived for a task that is already terminal and was ignored.
///
/// # Log Level
/// `warn!` - Potential duplicate dispatch or misbehaving worker
pub struct LateSubmissionIgnored<'a> {
    pub task_id: &'a TaskId,
    pub status: TaskStatus,
}

impl Display for LateSubmissionIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring late submission for task {}: already {:?}",
            self.task_id, self.status
        )
    }
}

impl StructuredLog for LateSubmissionIgnored<'_> {
    fn log(&self) {
        tracing::warn!(
            task_id = %self.task_id,
            status = ?self.status,
            "{}", self
        );
    }
}

/// Expression aggregated to a terminal status.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExpressionFinalized<'a> {
    pub expression_id: &'a ExpressionId,
    pub status: ExpressionStatus,
    pub result: Option<f64>,
}

impl Display for ExpressionFinalized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.result {
            Some(result) => write!(
                f,
                "Expression {} {:?} with result {}",
                self.expression_id, self.status, result
            ),
            None => write!(f, "Expression {} {:?}", self.expression_id, self.status),
        }
    }
}

impl StructuredLog for ExpressionFinalized<'_> {
    fn log(&self) {
        tracing::info!(
            expression_id = %self.expression_id,
            status = ?self.status,
            result = ?self.result,
            "{}", self
        );
    }
}
