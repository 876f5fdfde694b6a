// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for expression submission and compilation.

use std::fmt::{Display, Formatter};

use crate::model::ExpressionId;
use crate::observability::messages::StructuredLog;

/// Expression compiled and registered.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExpressionAccepted<'a> {
    pub expression_id: &'a ExpressionId,
    pub owner: &'a str,
    pub source: &'a str,
    pub task_count: usize,
}

impl Display for ExpressionAccepted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Expression {} accepted for '{}': \"{}\" decomposed into {} tasks",
            self.expression_id, self.owner, self.source, self.task_count
        )
    }
}

impl StructuredLog for ExpressionAccepted<'_> {
    fn log(&self) {
        tracing::info!(
            expression_id = %self.expression_id,
            owner = self.owner,
            task_count = self.task_count,
            "{}", self
        );
    }
}

/// Expression rejected at submission; nothing was registered.
///
/// # Log Level
/// `warn!` - Client error, not a system fault
pub struct ExpressionRejected<'a> {
    pub owner: &'a str,
    pub source: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ExpressionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Expression \"{}\" from '{}' rejected: {}",
            self.source, self.owner, self.error
        )
    }
}

impl StructuredLog for ExpressionRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            owner = self.owner,
            error = %self.error,
            "{}", self
        );
    }
}
