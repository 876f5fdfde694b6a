// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::compiler::decomposer::parse_literal;
use crate::compiler::postfix::to_postfix;
use crate::compiler::token::Token;
use crate::errors::{CompileError, ComputeError};

/// Failure of a local, single-process evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Compute(#[from] ComputeError),
}

/// Evaluates a postfix sequence directly, with the same numeric semantics as workers.
///
/// This is the local counterpart of distributed evaluation: for every
/// expression that decomposes, both must agree on the result. Inputs that
/// decompose into no task, such as a lone literal, are rejected the same way.
pub fn evaluate_postfix(postfix: &[Token]) -> Result<f64, EvaluationError> {
    let mut stack: Vec<f64> = Vec::new();
    let mut applied = 0usize;

    for token in postfix {
        match token {
            Token::Number(text) => stack.push(parse_literal(text)?),
            Token::Operator(op) => {
                let b = stack.pop().ok_or(CompileError::InsufficientOperands)?;
                let a = stack.pop().ok_or(CompileError::InsufficientOperands)?;
                stack.push(op.apply(a, b)?);
                applied += 1;
            }
            Token::LeftParen | Token::RightParen => {
                return Err(CompileError::InsufficientOperands.into())
            }
        }
    }

    match stack.as_slice() {
        [value] if applied > 0 => Ok(*value),
        _ => Err(CompileError::InsufficientOperands.into()),
    }
}

/// Converts and evaluates infix text in one step.
pub fn evaluate(text: &str) -> Result<f64, EvaluationError> {
    let postfix = to_postfix(text)?;
    evaluate_postfix(&postfix)
}
