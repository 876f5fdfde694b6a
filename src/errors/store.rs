// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for expression registration and lookup.

use thiserror::Error;

use crate::errors::CompileError;
use crate::model::{ExpressionId, TaskId};

/// Violations of the store's registration contract, plus failed lookups.
///
/// A registration that fails leaves no partial state behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Expression {0} is already registered")]
    DuplicateExpression(ExpressionId),

    #[error("Task {0} is already registered")]
    DuplicateTask(TaskId),

    #[error("Expression {0} has no tasks")]
    EmptyGraph(ExpressionId),

    #[error("Task {task} belongs to expression {found}, not {expected}")]
    ForeignTask {
        task: TaskId,
        expected: ExpressionId,
        found: ExpressionId,
    },

    #[error("Task {task} depends on {dependency}, which is not an earlier task of the same expression")]
    DanglingDependency { task: TaskId, dependency: TaskId },

    #[error("Expression {expression} must have exactly one terminal task, found {found}")]
    AmbiguousTerminal {
        expression: ExpressionId,
        found: usize,
    },

    #[error("Expression {0} not found")]
    ExpressionNotFound(ExpressionId),
}

/// Failure of the submission entry point: either the text did not compile
/// or the resulting graph could not be registered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Expression is not valid: {0}")]
    Compile(#[from] CompileError),

    #[error("Failed to save expression: {0}")]
    Store(#[from] StoreError),
}
