// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{ExpressionId, Operator, TaskId};

/// One side of a binary task: a literal number, or the future result of another task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operand {
    Literal { value: f64 },
    Result { task_id: TaskId },
}

impl Operand {
    pub fn literal(value: f64) -> Self {
        Operand::Literal { value }
    }

    pub fn result_of(task_id: TaskId) -> Self {
        Operand::Result { task_id }
    }

    /// The task this operand waits on, if it is a dependency reference
    pub fn dependency(&self) -> Option<&TaskId> {
        match self {
            Operand::Literal { .. } => None,
            Operand::Result { task_id } => Some(task_id),
        }
    }
}

/// Task lifecycle. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// An atomic binary operation belonging to one expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub expression_id: ExpressionId,
    pub operand_a: Operand,
    pub operand_b: Operand,
    pub operator: Operator,
    pub status: TaskStatus,
    /// Set only once the task is `Completed`
    pub result: Option<f64>,
    /// Set only once the task is `Failed`
    pub failure: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a pending task with a fresh id.
    pub fn new(
        expression_id: ExpressionId,
        operand_a: Operand,
        operand_b: Operand,
        operator: Operator,
    ) -> Self {
        Self {
            id: TaskId::new(),
            expression_id,
            operand_a,
            operand_b,
            operator,
            status: TaskStatus::Pending,
            result: None,
            failure: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Tasks whose results this task consumes, in operand order
    pub fn dependencies(&self) -> impl Iterator<Item = &TaskId> {
        self.operand_a
            .dependency()
            .into_iter()
            .chain(self.operand_b.dependency())
    }
}

/// Finds the tasks whose results are never consumed by another task of the same set.
///
/// A well-formed expression graph has exactly one such task, and its result
/// is the expression's result.
pub fn terminal_tasks(tasks: &[Task]) -> Vec<&TaskId> {
    let consumed: HashSet<&TaskId> = tasks.iter().flat_map(|t| t.dependencies()).collect();
    tasks
        .iter()
        .map(|t| &t.id)
        .filter(|id| !consumed.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_skip_literals() {
        let expr = ExpressionId::new();
        let first = Task::new(expr.clone(), Operand::literal(1.0), Operand::literal(2.0), Operator::Add);
        let second = Task::new(
            expr,
            Operand::literal(3.0),
            Operand::result_of(first.id.clone()),
            Operator::Multiply,
        );

        assert_eq!(first.dependencies().count(), 0);
        assert_eq!(second.dependencies().collect::<Vec<_>>(), vec![&first.id]);
    }

    #[test]
    fn terminal_task_is_the_unconsumed_one() {
        let expr = ExpressionId::new();
        let left = Task::new(expr.clone(), Operand::literal(1.0), Operand::literal(2.0), Operator::Add);
        let right = Task::new(expr.clone(), Operand::literal(3.0), Operand::literal(4.0), Operator::Add);
        let root = Task::new(
            expr,
            Operand::result_of(left.id.clone()),
            Operand::result_of(right.id.clone()),
            Operator::Multiply,
        );
        let root_id = root.id.clone();
        let tasks = vec![left, right, root];

        assert_eq!(terminal_tasks(&tasks), vec![&root_id]);
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }
}
