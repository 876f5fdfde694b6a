// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lexical tokens and a lazy tokenizer over infix text.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::errors::CompileError;
use crate::model::Operator;

/// A lexical unit of an arithmetic expression.
///
/// Numbers keep their source spelling; they are only parsed when the
/// decomposer turns them into operands.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(String),
    Operator(Operator),
    LeftParen,
    RightParen,
}

impl Token {
    pub fn number(text: impl Into<String>) -> Self {
        Token::Number(text.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(text) => f.write_str(text),
            Token::Operator(op) => write!(f, "{}", op),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
        }
    }
}

/// A token together with the byte offset where it starts.
pub type Spanned = (usize, Token);

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Single left-to-right scan producing tokens on demand.
///
/// Runs of digits and `.` become one `Number`; whitespace is skipped. Any
/// other character yields `InvalidCharacter` at the point it is reached, so
/// errors surface in source order.
pub struct Tokenizer<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Spanned, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }

        let (start, c) = self.chars.next()?;

        if is_number_char(c) {
            let mut end = start + c.len_utf8();
            while let Some(&(offset, next)) = self.chars.peek() {
                if !is_number_char(next) {
                    break;
                }
                end = offset + next.len_utf8();
                self.chars.next();
            }
            return Some(Ok((start, Token::number(&self.text[start..end]))));
        }

        let token = match c {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            _ => match Operator::from_char(c) {
                Some(op) => Token::Operator(op),
                None => {
                    return Some(Err(CompileError::InvalidCharacter {
                        character: c,
                        position: start,
                    }))
                }
            },
        };
        Some(Ok((start, token)))
    }
}
