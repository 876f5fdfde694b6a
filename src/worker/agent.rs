// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The worker side of the resolution protocol.
//!
//! A worker loops over four steps until cancelled:
//!
//! 1. Pull a dispatchable task; back off when there is none.
//! 2. Resolve each placeholder operand, backing off while it is not ready.
//! 3. Compute the operator and wait out the task's operation time.
//! 4. Report the result or the failure once.
//!
//! Cancellation is checked between iterations and at every wait. An attempt
//! interrupted by cancellation is abandoned without a report.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::errors::ProtocolError;
use crate::model::{Operand, TaskId, TaskReport, TaskView};
use crate::observability::messages::worker::{
    DependencyWaiting, TaskAbandoned, TaskAttempt, TaskComputeFailed, TaskComputed,
    WorkerStarted, WorkerStopped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::TaskSource;
use crate::worker::backoff::{sleep_or_cancel, BackoffPolicy};
use crate::worker::compute::compute;

/// Why a task attempt ended without a report.
#[derive(Debug)]
enum Interrupted {
    Cancelled,
    Protocol(ProtocolError),
}

pub struct Worker {
    id: usize,
    source: Arc<dyn TaskSource>,
    backoff: BackoffPolicy,
    cancel: CancellationToken,
}

impl Worker {
    pub fn new(
        id: usize,
        source: Arc<dyn TaskSource>,
        backoff: BackoffPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            source,
            backoff,
            cancel,
        }
    }

    /// Runs until the cancellation token fires. Returns the number of tasks
    /// this worker reported.
    pub async fn run(self) -> usize {
        let started = WorkerStarted { worker_id: self.id };
        started.log();
        let span = started.span("worker_loop");
        self.poll_until_cancelled().instrument(span).await
    }

    async fn poll_until_cancelled(&self) -> usize {
        let mut processed = 0;
        let mut idle_polls: u32 = 0;
        while !self.cancel.is_cancelled() {
            let pulled = match self.source.pull_task().await {
                Ok(pulled) => pulled,
                Err(error) => {
                    tracing::warn!(worker_id = self.id, error = %error, "Failed to pull task: {}", error);
                    None
                }
            };

            match pulled {
                Some(task) => {
                    idle_polls = 0;
                    let attempt = TaskAttempt {
                        worker_id: self.id,
                        task_id: &task.id,
                        operator: &task.operator,
                    };
                    attempt.log();
                    let span = attempt.span("task_attempt");
                    if self.process(task).instrument(span).await {
                        processed += 1;
                    }
                }
                None => {
                    if !sleep_or_cancel(self.backoff.delay(idle_polls), &self.cancel).await {
                        break;
                    }
                    idle_polls = idle_polls.saturating_add(1);
                }
            }
        }

        WorkerStopped {
            worker_id: self.id,
            tasks_processed: processed,
        }
        .log();
        processed
    }

    /// One task attempt. Returns `true` if an outcome was reported.
    async fn process(&self, task: TaskView) -> bool {
        let operands = match self.resolve(&task.id, &task.operand_a).await {
            Ok(a) => self.resolve(&task.id, &task.operand_b).await.map(|b| (a, b)),
            Err(interrupted) => Err(interrupted),
        };

        let report = match operands {
            Ok((a, b)) => match compute(&task.operator, a, b) {
                Ok(result) => {
                    if !sleep_or_cancel(task.operation_time(), &self.cancel).await {
                        self.abandon(&task.id, "shutdown during operation");
                        return false;
                    }
                    TaskComputed {
                        worker_id: self.id,
                        task_id: &task.id,
                        expression: format!("{} {} {}", a, task.operator, b),
                        result,
                    }
                    .log();
                    TaskReport::Completed { result }
                }
                Err(error) => TaskReport::Failed {
                    error: error.to_string(),
                },
            },
            // An upstream failure means this task can never be computed
            Err(Interrupted::Protocol(error @ ProtocolError::UpstreamFailed(_))) => {
                TaskReport::Failed {
                    error: error.to_string(),
                }
            }
            Err(Interrupted::Protocol(error)) => {
                self.abandon(&task.id, &error.to_string());
                return false;
            }
            Err(Interrupted::Cancelled) => {
                self.abandon(&task.id, "shutdown while waiting for a dependency");
                return false;
            }
        };

        if let TaskReport::Failed { error } = &report {
            TaskComputeFailed {
                worker_id: self.id,
                task_id: &task.id,
                reason: error,
            }
            .log();
        }
        self.report(&task.id, report).await
    }

    /// Turns an operand into a number, polling while the dependency is not ready.
    async fn resolve(&self, task_id: &TaskId, operand: &Operand) -> Result<f64, Interrupted> {
        let dependency = match operand {
            Operand::Literal { value } => return Ok(*value),
            Operand::Result { task_id } => task_id,
        };

        let mut attempt: u32 = 0;
        loop {
            match self.source.resolve(dependency).await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() => {
                    let delay = self.backoff.delay(attempt);
                    DependencyWaiting {
                        worker_id: self.id,
                        task_id,
                        dependency,
                        delay,
                    }
                    .log();
                    if !sleep_or_cancel(delay, &self.cancel).await {
                        return Err(Interrupted::Cancelled);
                    }
                    attempt = attempt.saturating_add(1);
                }
                Err(error) => return Err(Interrupted::Protocol(error)),
            }
        }
    }

    /// Sends the outcome, retrying while the source does not answer.
    async fn report(&self, task_id: &TaskId, report: TaskReport) -> bool {
        let mut attempt: u32 = 0;
        loop {
            match self.source.report(task_id, report.clone()).await {
                Ok(_) => return true,
                Err(error) if error.is_retryable() => {
                    if !sleep_or_cancel(self.backoff.delay(attempt), &self.cancel).await {
                        self.abandon(task_id, "shutdown while reporting");
                        return false;
                    }
                    attempt = attempt.saturating_add(1);
                }
                Err(error) => {
                    self.abandon(task_id, &error.to_string());
                    return false;
                }
            }
        }
    }

    fn abandon(&self, task_id: &TaskId, reason: &str) {
        TaskAbandoned {
            worker_id: self.id,
            task_id,
            reason,
        }
        .log();
    }
}
