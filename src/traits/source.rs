use async_trait::async_trait;

use crate::errors::ProtocolError;
use crate::model::{TaskId, TaskReport, TaskView};
use crate::traits::store::SubmitOutcome;

/// Worker-facing side of the resolution protocol.
///
/// Each call is one request/response cycle. Callers poll: an empty
/// `pull_task` or a retryable error means back off and ask again.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Claims a dispatchable task, if one is available.
    async fn pull_task(&self) -> Result<Option<TaskView>, ProtocolError>;

    /// Resolves a dependency placeholder to the referenced task's result.
    async fn resolve(&self, task_id: &TaskId) -> Result<f64, ProtocolError>;

    /// Reports the outcome of one task attempt.
    async fn report(&self, task_id: &TaskId, report: TaskReport) -> Result<SubmitOutcome, ProtocolError>;
}
