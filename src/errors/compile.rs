// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors raised while compiling an infix expression into a task graph.
///
/// Compile errors are surfaced synchronously to the submitter. An expression
/// that fails to compile is never registered with the store.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A `)` without a matching `(`, or a `(` left open at end of input
    BracketMismatch {
        /// Byte offset of the offending bracket in the source text
        position: usize,
    },
    /// A character that is not a digit, `.`, operator, bracket or whitespace
    InvalidCharacter {
        /// The rejected character
        character: char,
        /// Byte offset of the character in the source text
        position: usize,
    },
    /// An operator without two operands, or a graph that does not reduce to a single task
    InsufficientOperands,
    /// A numeric literal that does not parse as a finite decimal number
    InvalidOperand {
        /// The literal as written
        literal: String,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::BracketMismatch { position } => {
                write!(f, "Number of brackets doesn't match (at offset {})", position)
            }
            CompileError::InvalidCharacter {
                character,
                position,
            } => {
                write!(
                    f,
                    "Invalid character '{}' at offset {}: only numbers and ( ) + - * / allowed",
                    character, position
                )
            }
            CompileError::InsufficientOperands => {
                write!(f, "Not enough values to apply every operator")
            }
            CompileError::InvalidOperand { literal } => {
                write!(f, "Operand '{}' is not a finite decimal number", literal)
            }
        }
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_offending_character() {
        let err = CompileError::InvalidCharacter {
            character: 'x',
            position: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("'x'"));
        assert!(msg.contains("offset 2"));
    }

    #[test]
    fn display_mentions_literal() {
        let err = CompileError::InvalidOperand {
            literal: "1.2.3".to_string(),
        };
        assert!(err.to_string().contains("1.2.3"));
    }
}
