// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Entry points for submitters and workers over a [`StateStore`].
//!
//! The orchestrator compiles submitted text, registers the resulting task
//! graph, answers read-only queries with views, and implements the
//! worker-facing [`TaskSource`] contract in-process. Transport layers (HTTP,
//! RPC) wrap these calls; they are not part of this crate.

use async_trait::async_trait;
use std::sync::Arc;

use crate::compiler::decompose;
use crate::config::OperationTimes;
use crate::errors::{ProtocolError, StoreError, SubmitError};
use crate::model::{
    Expression, ExpressionId, ExpressionView, OwnerId, TaskId, TaskReport, TaskView,
};
use crate::observability::messages::compiler::{ExpressionAccepted, ExpressionRejected};
use crate::observability::messages::StructuredLog;
use crate::traits::{StateStore, SubmitOutcome, TaskSource};

/// Store failures look like transport silence to a worker.
fn unavailable(error: StoreError) -> ProtocolError {
    ProtocolError::Unavailable(error.to_string())
}

pub struct Orchestrator {
    store: Arc<dyn StateStore>,
    operation_times: OperationTimes,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn StateStore>, operation_times: OperationTimes) -> Self {
        Self {
            store,
            operation_times,
        }
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    /// Compiles `text` and registers the expression with its tasks.
    ///
    /// On a compile error nothing is registered.
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use the_abacus::config::OperationTimes;
    /// use the_abacus::engine::{InMemoryStore, Orchestrator};
    /// use the_abacus::errors::{CompileError, SubmitError};
    /// use the_abacus::model::{ExpressionStatus, OwnerId};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let orchestrator = Orchestrator::new(Arc::new(InMemoryStore::new()), OperationTimes::default());
    /// let owner = OwnerId::from("alice");
    ///
    /// let id = orchestrator.submit("2+2", &owner).await.unwrap();
    /// let view = orchestrator.get_expression(&id).await.unwrap();
    /// assert_eq!(view.status, ExpressionStatus::Pending);
    ///
    /// let err = orchestrator.submit("2++2", &owner).await.unwrap_err();
    /// assert_eq!(err, SubmitError::Compile(CompileError::InsufficientOperands));
    /// # }
    /// ```
    pub async fn submit(&self, text: &str, owner: &OwnerId) -> Result<ExpressionId, SubmitError> {
        let expression_id = ExpressionId::new();
        let tasks = match decompose(text, &expression_id) {
            Ok(tasks) => tasks,
            Err(error) => {
                ExpressionRejected {
                    owner: owner.as_str(),
                    source: text,
                    error: &error,
                }
                .log();
                return Err(error.into());
            }
        };

        let task_count = tasks.len();
        let task_ids = tasks.iter().map(|t| t.id.clone()).collect();
        let expression = Expression::new(expression_id.clone(), owner.clone(), text, task_ids);
        self.store.put(expression, tasks).await?;

        ExpressionAccepted {
            expression_id: &expression_id,
            owner: owner.as_str(),
            source: text,
            task_count,
        }
        .log();
        Ok(expression_id)
    }

    pub async fn get_expression(&self, id: &ExpressionId) -> Result<ExpressionView, StoreError> {
        self.store
            .expression(id)
            .await?
            .map(|e| ExpressionView::from(&e))
            .ok_or_else(|| StoreError::ExpressionNotFound(id.clone()))
    }

    /// Like [`Orchestrator::get_expression`], but an expression owned by
    /// someone else is reported as not found.
    pub async fn get_expression_for(
        &self,
        owner: &OwnerId,
        id: &ExpressionId,
    ) -> Result<ExpressionView, StoreError> {
        self.store
            .expression(id)
            .await?
            .filter(|e| &e.owner == owner)
            .map(|e| ExpressionView::from(&e))
            .ok_or_else(|| StoreError::ExpressionNotFound(id.clone()))
    }

    /// The owner's expressions, newest first.
    pub async fn list_expressions(&self, owner: &OwnerId) -> Result<Vec<ExpressionView>, StoreError> {
        Ok(self
            .store
            .expressions_for(owner)
            .await?
            .iter()
            .map(ExpressionView::from)
            .collect())
    }
}

#[async_trait]
impl TaskSource for Orchestrator {
    async fn pull_task(&self) -> Result<Option<TaskView>, ProtocolError> {
        let task = self.store.dispatch_next().await.map_err(unavailable)?;
        Ok(task.map(|t| {
            let operation_time = self.operation_times.for_operator(t.operator);
            TaskView::from_task(&t, operation_time)
        }))
    }

    async fn resolve(&self, task_id: &TaskId) -> Result<f64, ProtocolError> {
        self.store.resolve_operand(task_id).await
    }

    async fn report(&self, task_id: &TaskId, report: TaskReport) -> Result<SubmitOutcome, ProtocolError> {
        match report {
            TaskReport::Completed { result } => self.store.submit_result(task_id, result).await,
            TaskReport::Failed { error } => self.store.submit_failure(task_id, &error).await,
        }
    }
}
