// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised while a worker evaluates a single task.
///
/// A compute error never crashes the worker; it is reported back as a task
/// failure and propagates to the owning expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    /// Right-hand operand of `/` was zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// The task carried an operator outside `+ - * /`.
    #[error("Unsupported operator '{0}'")]
    UnsupportedOperator(String),
}
