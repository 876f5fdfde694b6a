// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Infix to postfix conversion by operator-precedence reduction.
//!
//! Operators pass through a stack. An incoming operator first pops every
//! stacked operator whose precedence is greater than or equal to its own,
//! which makes equal-precedence operators left-associative: `2-3-1` becomes
//! `2 3 - 1 -`. An open bracket sits on the stack as a sentinel of
//! precedence 0, so nothing pops past it until its `)` arrives.

use crate::compiler::token::{Token, Tokenizer};
use crate::errors::CompileError;
use crate::model::Operator;

enum Stacked {
    Operator(Operator),
    /// Byte offset of the `(` for error reporting
    Open(usize),
}

impl Stacked {
    fn precedence(&self) -> u8 {
        match self {
            Stacked::Operator(op) => op.precedence(),
            Stacked::Open(_) => 0,
        }
    }
}

/// Converts infix text into a postfix token sequence.
///
/// The output holds only `Number` and `Operator` tokens. Operand count is not
/// checked here; that is the decomposer's job.
///
/// ```
/// use the_abacus::compiler::{to_postfix, Token};
/// use the_abacus::model::Operator;
///
/// let postfix = to_postfix("(2+3)*4").unwrap();
/// assert_eq!(postfix, vec![
///     Token::number("2"),
///     Token::number("3"),
///     Token::Operator(Operator::Add),
///     Token::number("4"),
///     Token::Operator(Operator::Multiply),
/// ]);
/// ```
pub fn to_postfix(text: &str) -> Result<Vec<Token>, CompileError> {
    let mut output = Vec::new();
    let mut stack: Vec<Stacked> = Vec::new();

    for spanned in Tokenizer::new(text) {
        let (position, token) = spanned?;
        match token {
            Token::Number(_) => output.push(token),
            Token::Operator(op) => {
                while let Some(top) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    if let Some(Stacked::Operator(popped)) = stack.pop() {
                        output.push(Token::Operator(popped));
                    }
                }
                stack.push(Stacked::Operator(op));
            }
            Token::LeftParen => stack.push(Stacked::Open(position)),
            Token::RightParen => loop {
                match stack.pop() {
                    Some(Stacked::Operator(op)) => output.push(Token::Operator(op)),
                    Some(Stacked::Open(_)) => break,
                    None => return Err(CompileError::BracketMismatch { position }),
                }
            },
        }
    }

    while let Some(top) = stack.pop() {
        match top {
            Stacked::Operator(op) => output.push(Token::Operator(op)),
            Stacked::Open(position) => return Err(CompileError::BracketMismatch { position }),
        }
    }

    Ok(output)
}
