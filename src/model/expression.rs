// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExpressionId, OwnerId, TaskId};

/// Expression lifecycle. Derived from the statuses of the owned tasks, never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionStatus {
    Pending,
    Completed,
    Failed,
}

impl ExpressionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExpressionStatus::Pending)
    }
}

/// The root-level unit of work submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub id: ExpressionId,
    pub owner: OwnerId,
    /// Source text as submitted
    pub source: String,
    pub status: ExpressionStatus,
    /// Set only once the expression is `Completed`
    pub result: Option<f64>,
    /// Failure reason of the first failed task, once the expression is `Failed`
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Owned tasks in decomposition order
    pub task_ids: Vec<TaskId>,
}

impl Expression {
    pub fn new(id: ExpressionId, owner: OwnerId, source: impl Into<String>, task_ids: Vec<TaskId>) -> Self {
        Self {
            id,
            owner,
            source: source.into(),
            status: ExpressionStatus::Pending,
            result: None,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
            task_ids,
        }
    }
}
