// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Decomposition of a postfix sequence into a graph of binary tasks.
//!
//! Walking the postfix tokens with a value stack, each operator pops its
//! right operand (top) then its left operand (second-to-top) and emits one
//! task computing `left op right`. A placeholder for that task's result is
//! pushed back, so later tasks reference it instead of a literal. Because a
//! task can only reference tasks emitted before it, the result is always a
//! finite DAG rooted at literals.

use crate::compiler::postfix::to_postfix;
use crate::compiler::token::Token;
use crate::errors::CompileError;
use crate::model::{ExpressionId, Operand, Task};

/// Parses a literal exactly as written: digits with at most one `.`.
pub(crate) fn parse_literal(text: &str) -> Result<f64, CompileError> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CompileError::InvalidOperand {
            literal: text.to_string(),
        })
}

/// Compiles infix text into the tasks of one expression.
///
/// Tasks are returned in creation order; the last one is the terminal task
/// whose result is the value of the whole expression. An expression without
/// any operator does not form a task graph and is rejected with
/// `InsufficientOperands`.
///
/// ```
/// use the_abacus::compiler::decompose;
/// use the_abacus::model::{ExpressionId, Operand, Operator};
///
/// let tasks = decompose("2+2", &ExpressionId::new()).unwrap();
/// assert_eq!(tasks.len(), 1);
/// assert_eq!(tasks[0].operand_a, Operand::literal(2.0));
/// assert_eq!(tasks[0].operand_b, Operand::literal(2.0));
/// assert_eq!(tasks[0].operator, Operator::Add);
/// ```
pub fn decompose(text: &str, expression_id: &ExpressionId) -> Result<Vec<Task>, CompileError> {
    let postfix = to_postfix(text)?;
    decompose_postfix(&postfix, expression_id)
}

/// Builds tasks from an already converted postfix sequence.
pub fn decompose_postfix(
    postfix: &[Token],
    expression_id: &ExpressionId,
) -> Result<Vec<Task>, CompileError> {
    let mut tasks: Vec<Task> = Vec::new();
    let mut stack: Vec<Operand> = Vec::new();

    for token in postfix {
        match token {
            Token::Number(text) => stack.push(Operand::literal(parse_literal(text)?)),
            Token::Operator(op) => {
                let b = stack.pop().ok_or(CompileError::InsufficientOperands)?;
                let a = stack.pop().ok_or(CompileError::InsufficientOperands)?;
                let task = Task::new(expression_id.clone(), a, b, *op);
                stack.push(Operand::result_of(task.id.clone()));
                tasks.push(task);
            }
            // Brackets never survive postfix conversion
            Token::LeftParen | Token::RightParen => return Err(CompileError::InsufficientOperands),
        }
    }

    match stack.as_slice() {
        [Operand::Result { .. }] => Ok(tasks),
        _ => Err(CompileError::InsufficientOperands),
    }
}
