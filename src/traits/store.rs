use async_trait::async_trait;

use crate::errors::{ProtocolError, StoreError};
use crate::model::{Expression, ExpressionId, ExpressionStatus, OwnerId, Task, TaskId};

/// Result of a status write against a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The task transitioned and its expression was re-aggregated.
    Applied,
    /// The task was already terminal; nothing changed.
    Ignored,
}

/// Authoritative state of expressions and their tasks.
///
/// Every call is a single atomic step against the store: a reader never sees
/// an expression whose tasks are only partly registered, and a dispatch is a
/// compare-and-swap from `pending` to `running`. Implementations may keep the
/// state in memory or in a transactional database.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Registers an expression together with all of its tasks, or nothing.
    async fn put(&self, expression: Expression, tasks: Vec<Task>) -> Result<(), StoreError>;

    /// Returns a dispatchable task without claiming it.
    async fn next_dispatchable(&self) -> Result<Option<Task>, StoreError>;

    /// Claims `task_id` if it is still pending and dispatchable.
    ///
    /// `Ok(None)` means another caller claimed it first or it is not
    /// dispatchable yet.
    async fn try_dispatch(&self, task_id: &TaskId) -> Result<Option<Task>, ProtocolError>;

    /// Claims the next dispatchable task, if any.
    async fn dispatch_next(&self) -> Result<Option<Task>, StoreError>;

    /// Reads the result of a completed task.
    async fn resolve_operand(&self, task_id: &TaskId) -> Result<f64, ProtocolError>;

    async fn submit_result(
        &self,
        task_id: &TaskId,
        result: f64,
    ) -> Result<SubmitOutcome, ProtocolError>;

    async fn submit_failure(
        &self,
        task_id: &TaskId,
        reason: &str,
    ) -> Result<SubmitOutcome, ProtocolError>;

    /// Recomputes an expression's status from its tasks. A no-op once the
    /// expression is terminal.
    async fn aggregate(&self, expression_id: &ExpressionId) -> Result<ExpressionStatus, StoreError>;

    async fn expression(&self, expression_id: &ExpressionId) -> Result<Option<Expression>, StoreError>;

    /// All expressions of one owner, newest first.
    async fn expressions_for(&self, owner: &OwnerId) -> Result<Vec<Expression>, StoreError>;

    async fn task(&self, task_id: &TaskId) -> Result<Option<Task>, StoreError>;
}
