// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed read projections and worker wire messages.
//!
//! These are what the transport layer serializes. Query views hide the
//! internal task wiring; the task view carries just enough for a worker to
//! resolve its operands and compute.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Expression, ExpressionId, ExpressionStatus, Operand, Task, TaskId};

/// Read-only projection of an expression, excluding its task graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionView {
    pub id: ExpressionId,
    pub expression: String,
    pub status: ExpressionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<&Expression> for ExpressionView {
    fn from(expr: &Expression) -> Self {
        Self {
            id: expr.id.clone(),
            expression: expr.source.clone(),
            status: expr.status,
            result: expr.result,
            error: expr.error.clone(),
            created_at: expr.created_at,
            finished_at: expr.finished_at,
        }
    }
}

/// A dispatched task as handed to a worker.
///
/// The operator travels as text so that a worker validates it on receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: TaskId,
    pub expression_id: ExpressionId,
    pub operand_a: Operand,
    pub operand_b: Operand,
    pub operator: String,
    /// Simulated compute latency the worker honours before reporting
    pub operation_time_ms: u64,
}

impl TaskView {
    pub fn from_task(task: &Task, operation_time: Duration) -> Self {
        Self {
            id: task.id.clone(),
            expression_id: task.expression_id.clone(),
            operand_a: task.operand_a.clone(),
            operand_b: task.operand_b.clone(),
            operator: task.operator.to_string(),
            operation_time_ms: operation_time.as_millis() as u64,
        }
    }

    pub fn operation_time(&self) -> Duration {
        Duration::from_millis(self.operation_time_ms)
    }
}

/// Outcome a worker reports for one task attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskReport {
    Completed { result: f64 },
    Failed { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Operator, OwnerId};

    #[test]
    fn pending_view_omits_result_fields() {
        let expr = Expression::new(ExpressionId::new(), OwnerId::from("alice"), "2+2", vec![]);
        let json = serde_json::to_value(ExpressionView::from(&expr)).unwrap();

        assert_eq!(json["status"], "pending");
        assert_eq!(json["expression"], "2+2");
        assert!(json.get("result").is_none());
        assert!(json.get("finished_at").is_none());
    }

    #[test]
    fn task_view_carries_operator_symbol_and_operands() {
        let dep = TaskId::new();
        let task = Task::new(
            ExpressionId::new(),
            Operand::literal(2.0),
            Operand::result_of(dep.clone()),
            Operator::Subtract,
        );
        let view = TaskView::from_task(&task, Duration::from_millis(250));
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["operator"], "-");
        assert_eq!(json["operation_time_ms"], 250);
        assert_eq!(json["operand_a"]["kind"], "literal");
        assert_eq!(json["operand_b"]["kind"], "result");
        assert_eq!(json["operand_b"]["task_id"], dep.to_string());
    }

    #[test]
    fn report_is_tagged_by_outcome() {
        let report: TaskReport =
            serde_json::from_str(r#"{"outcome":"failed","error":"Division by zero"}"#).unwrap();
        assert_eq!(
            report,
            TaskReport::Failed {
                error: "Division by zero".to_string()
            }
        );
    }
}
