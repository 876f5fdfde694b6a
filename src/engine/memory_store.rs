// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory [`StateStore`] implementation.
//!
//! All state sits behind a single `tokio::sync::RwLock`. Reads take the
//! shared lock; every transition (registration, dispatch, result, failure)
//! takes the exclusive lock for the whole step, so the registration of an
//! expression with its tasks and each compare-and-swap on task status are
//! atomic with respect to every other caller.
//!
//! Dispatch is driven by a [`ReadyIndex`] that is updated incrementally on
//! each completion, so finding the next task never scans the task table.
//!
//! # Example
//! ```rust
//! use the_abacus::compiler::decompose;
//! use the_abacus::engine::InMemoryStore;
//! use the_abacus::model::{Expression, ExpressionId, ExpressionStatus, OwnerId};
//! use the_abacus::traits::StateStore;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryStore::new();
//! let id = ExpressionId::new();
//! let tasks = decompose("6*7", &id)?;
//! let ids = tasks.iter().map(|t| t.id.clone()).collect();
//! store.put(Expression::new(id.clone(), OwnerId::from("alice"), "6*7", ids), tasks).await?;
//!
//! let task = store.dispatch_next().await?.expect("one task is ready");
//! store.submit_result(&task.id, 42.0).await?;
//!
//! let expression = store.expression(&id).await?.expect("registered");
//! assert_eq!(expression.status, ExpressionStatus::Completed);
//! assert_eq!(expression.result, Some(42.0));
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::engine::ready_index::ReadyIndex;
use crate::errors::{ProtocolError, StoreError};
use crate::model::{
    terminal_tasks, Expression, ExpressionId, ExpressionStatus, OwnerId, Task, TaskId, TaskStatus,
};
use crate::observability::messages::store::{
    ExpressionFinalized, ExpressionRegistered, LateSubmissionIgnored, TaskCompleted,
    TaskDispatched, TaskFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{StateStore, SubmitOutcome};

#[derive(Debug, Default)]
struct StoreState {
    expressions: HashMap<ExpressionId, Expression>,
    tasks: HashMap<TaskId, Task>,
    /// Task whose result is the expression's value
    terminal: HashMap<ExpressionId, TaskId>,
    /// Submission order per owner
    by_owner: HashMap<OwnerId, Vec<ExpressionId>>,
    ready: ReadyIndex,
}

/// Process-local state store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks currently dispatchable.
    pub async fn ready_count(&self) -> usize {
        self.state.read().await.ready.len()
    }
}

/// Checks the registration contract without touching the state.
///
/// Returns the id of the expression's terminal task.
fn validate_graph(
    state: &StoreState,
    expression: &Expression,
    tasks: &[Task],
) -> Result<TaskId, StoreError> {
    if state.expressions.contains_key(&expression.id) {
        return Err(StoreError::DuplicateExpression(expression.id.clone()));
    }
    if tasks.is_empty() {
        return Err(StoreError::EmptyGraph(expression.id.clone()));
    }

    let mut seen: HashSet<&TaskId> = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if task.expression_id != expression.id {
            return Err(StoreError::ForeignTask {
                task: task.id.clone(),
                expected: expression.id.clone(),
                found: task.expression_id.clone(),
            });
        }
        // Only earlier tasks of the same batch may be referenced, which also rules out cycles
        if let Some(dependency) = task.dependencies().find(|dep| !seen.contains(dep)) {
            return Err(StoreError::DanglingDependency {
                task: task.id.clone(),
                dependency: dependency.clone(),
            });
        }
        if state.tasks.contains_key(&task.id) || !seen.insert(&task.id) {
            return Err(StoreError::DuplicateTask(task.id.clone()));
        }
    }

    match terminal_tasks(tasks).as_slice() {
        [terminal] => Ok((*terminal).clone()),
        others => Err(StoreError::AmbiguousTerminal {
            expression: expression.id.clone(),
            found: others.len(),
        }),
    }
}

/// Recomputes an expression's status from its tasks.
///
/// Failed wins over everything else; completed requires every task to be
/// completed. A terminal expression is never recomputed.
fn aggregate_locked(
    state: &mut StoreState,
    expression_id: &ExpressionId,
) -> Result<ExpressionStatus, StoreError> {
    let StoreState {
        expressions,
        tasks,
        terminal,
        ..
    } = state;

    let expression = expressions
        .get_mut(expression_id)
        .ok_or_else(|| StoreError::ExpressionNotFound(expression_id.clone()))?;
    if expression.status.is_terminal() {
        return Ok(expression.status);
    }

    let owned: Vec<&Task> = expression
        .task_ids
        .iter()
        .filter_map(|id| tasks.get(id))
        .collect();

    if let Some(failed) = owned.iter().find(|t| t.status == TaskStatus::Failed) {
        expression.status = ExpressionStatus::Failed;
        expression.error = Some(
            failed
                .failure
                .clone()
                .unwrap_or_else(|| format!("Task {} failed", failed.id)),
        );
    } else if owned.iter().all(|t| t.status == TaskStatus::Completed) {
        expression.status = ExpressionStatus::Completed;
        expression.result = terminal
            .get(expression_id)
            .and_then(|id| tasks.get(id))
            .and_then(|t| t.result);
    } else {
        return Ok(ExpressionStatus::Pending);
    }

    expression.finished_at = Some(Utc::now());
    ExpressionFinalized {
        expression_id,
        status: expression.status,
        result: expression.result,
    }
    .log();
    Ok(expression.status)
}

/// Claims a ready task by id under the write lock.
fn dispatch_locked(state: &mut StoreState, task_id: &TaskId) -> Option<Task> {
    let pending = state
        .tasks
        .get(task_id)
        .is_some_and(|t| t.status == TaskStatus::Pending);
    if !pending || !state.ready.claim(task_id) {
        return None;
    }
    start_locked(state, task_id)
}

/// Moves an already claimed task from `pending` to `running`.
fn start_locked(state: &mut StoreState, task_id: &TaskId) -> Option<Task> {
    let task = state.tasks.get_mut(task_id)?;
    if task.status != TaskStatus::Pending {
        return None;
    }

    task.status = TaskStatus::Running;
    task.started_at = Some(Utc::now());
    TaskDispatched {
        task_id: &task.id,
        expression_id: &task.expression_id,
        operator: task.operator,
    }
    .log();
    Some(task.clone())
}

/// Moves a task to a terminal status, or reports that it already was.
fn finish_locked(
    state: &mut StoreState,
    task_id: &TaskId,
    outcome: Result<f64, &str>,
) -> Result<SubmitOutcome, ProtocolError> {
    let task = state
        .tasks
        .get_mut(task_id)
        .ok_or_else(|| ProtocolError::TaskNotFound(task_id.clone()))?;

    if task.status.is_terminal() {
        LateSubmissionIgnored {
            task_id,
            status: task.status,
        }
        .log();
        return Ok(SubmitOutcome::Ignored);
    }
    // Only a dispatched task can have computed a result
    if outcome.is_ok() && task.status != TaskStatus::Running {
        return Err(ProtocolError::NotRunning(task_id.clone()));
    }

    task.finished_at = Some(Utc::now());
    let expression_id = task.expression_id.clone();
    match outcome {
        Ok(result) => {
            task.status = TaskStatus::Completed;
            task.result = Some(result);
            let unblocked = state.ready.complete(task_id);
            TaskCompleted {
                task_id,
                result,
                unblocked: unblocked.len(),
            }
            .log();
        }
        Err(reason) => {
            task.status = TaskStatus::Failed;
            task.failure = Some(reason.to_string());
            state.ready.settle(task_id);
            TaskFailed {
                task_id,
                expression_id: &expression_id,
                reason,
            }
            .log();
        }
    }

    // The owning expression was registered with the task, so this cannot miss
    aggregate_locked(state, &expression_id)
        .map_err(|e| ProtocolError::Unavailable(e.to_string()))?;
    Ok(SubmitOutcome::Applied)
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn put(&self, mut expression: Expression, tasks: Vec<Task>) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let terminal = validate_graph(&state, &expression, &tasks)?;

        expression.task_ids = tasks.iter().map(|t| t.id.clone()).collect();
        let mut ready_count = 0;
        for task in &tasks {
            if state.ready.register(&task.id, task.dependencies()) {
                ready_count += 1;
            }
        }
        state
            .tasks
            .extend(tasks.into_iter().map(|t| (t.id.clone(), t)));
        state.terminal.insert(expression.id.clone(), terminal);
        state
            .by_owner
            .entry(expression.owner.clone())
            .or_default()
            .push(expression.id.clone());

        ExpressionRegistered {
            expression_id: &expression.id,
            task_count: expression.task_ids.len(),
            ready_count,
        }
        .log();
        state.expressions.insert(expression.id.clone(), expression);
        Ok(())
    }

    async fn next_dispatchable(&self) -> Result<Option<Task>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .ready
            .peek()
            .and_then(|id| state.tasks.get(id))
            .cloned())
    }

    async fn try_dispatch(&self, task_id: &TaskId) -> Result<Option<Task>, ProtocolError> {
        let mut state = self.state.write().await;
        if !state.tasks.contains_key(task_id) {
            return Err(ProtocolError::TaskNotFound(task_id.clone()));
        }
        Ok(dispatch_locked(&mut state, task_id))
    }

    async fn dispatch_next(&self) -> Result<Option<Task>, StoreError> {
        let mut state = self.state.write().await;
        while let Some(task_id) = state.ready.pop() {
            if let Some(task) = start_locked(&mut state, &task_id) {
                return Ok(Some(task));
            }
        }
        Ok(None)
    }

    async fn resolve_operand(&self, task_id: &TaskId) -> Result<f64, ProtocolError> {
        let state = self.state.read().await;
        let task = state
            .tasks
            .get(task_id)
            .ok_or_else(|| ProtocolError::TaskNotFound(task_id.clone()))?;

        match (task.status, task.result) {
            (TaskStatus::Completed, Some(result)) => Ok(result),
            (TaskStatus::Failed, _) => Err(ProtocolError::UpstreamFailed(task_id.clone())),
            _ => Err(ProtocolError::NotReady(task_id.clone())),
        }
    }

    async fn submit_result(
        &self,
        task_id: &TaskId,
        result: f64,
    ) -> Result<SubmitOutcome, ProtocolError> {
        let mut state = self.state.write().await;
        finish_locked(&mut state, task_id, Ok(result))
    }

    async fn submit_failure(
        &self,
        task_id: &TaskId,
        reason: &str,
    ) -> Result<SubmitOutcome, ProtocolError> {
        let mut state = self.state.write().await;
        finish_locked(&mut state, task_id, Err(reason))
    }

    async fn aggregate(&self, expression_id: &ExpressionId) -> Result<ExpressionStatus, StoreError> {
        let mut state = self.state.write().await;
        aggregate_locked(&mut state, expression_id)
    }

    async fn expression(&self, expression_id: &ExpressionId) -> Result<Option<Expression>, StoreError> {
        Ok(self.state.read().await.expressions.get(expression_id).cloned())
    }

    async fn expressions_for(&self, owner: &OwnerId) -> Result<Vec<Expression>, StoreError> {
        let state = self.state.read().await;
        let ids = match state.by_owner.get(owner) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .rev()
            .filter_map(|id| state.expressions.get(id).cloned())
            .collect())
    }

    async fn task(&self, task_id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.state.read().await.tasks.get(task_id).cloned())
    }
}
