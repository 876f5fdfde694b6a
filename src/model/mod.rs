// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod expression;
mod ids;
mod operator;
mod task;
mod views;

pub use expression::{Expression, ExpressionStatus};
pub use ids::{ExpressionId, OwnerId, TaskId};
pub use operator::Operator;
pub use task::{terminal_tasks, Operand, Task, TaskStatus};
pub use views::{ExpressionView, TaskReport, TaskView};
