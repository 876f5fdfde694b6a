// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Binary operators and their numeric semantics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ComputeError;

/// One of the four supported binary operators.
///
/// Every task applies exactly one operator as `a op b`, where `a` is the
/// left operand and `b` the right operand as written in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    /// Maps an operator character, if it is one.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// Binding strength used by the postfix converter. `(` sits below both at 0.
    pub fn precedence(&self) -> u8 {
        match self {
            Operator::Add | Operator::Subtract => 1,
            Operator::Multiply | Operator::Divide => 2,
        }
    }

    /// Applies the operator to two resolved operands.
    ///
    /// Division by an operand equal to zero fails instead of producing an
    /// infinite or NaN result.
    ///
    /// ```
    /// use the_abacus::model::Operator;
    ///
    /// assert_eq!(Operator::Subtract.apply(2.0, 3.0), Ok(-1.0));
    /// assert!(Operator::Divide.apply(3.0, 0.0).is_err());
    /// ```
    pub fn apply(&self, a: f64, b: f64) -> Result<f64, ComputeError> {
        match self {
            Operator::Add => Ok(a + b),
            Operator::Subtract => Ok(a - b),
            Operator::Multiply => Ok(a * b),
            Operator::Divide => {
                if b == 0.0 {
                    Err(ComputeError::DivisionByZero)
                } else {
                    Ok(a / b)
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Operator::from_char(c).ok_or_else(|| ComputeError::UnsupportedOperator(s.to_string()))
            }
            _ => Err(ComputeError::UnsupportedOperator(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        assert!(Operator::Multiply.precedence() > Operator::Add.precedence());
        assert_eq!(Operator::Multiply.precedence(), Operator::Divide.precedence());
        assert_eq!(Operator::Add.precedence(), Operator::Subtract.precedence());
    }

    #[test]
    fn apply_uses_left_then_right_operand() {
        assert_eq!(Operator::Add.apply(2.0, 2.0), Ok(4.0));
        assert_eq!(Operator::Subtract.apply(5.0, 2.0), Ok(3.0));
        assert_eq!(Operator::Multiply.apply(3.0, 4.0), Ok(12.0));
        assert_eq!(Operator::Divide.apply(5.0, 2.0), Ok(2.5));
    }

    #[test]
    fn divide_by_zero_fails() {
        assert_eq!(Operator::Divide.apply(3.0, 0.0), Err(ComputeError::DivisionByZero));
        assert_eq!(Operator::Divide.apply(3.0, -0.0), Err(ComputeError::DivisionByZero));
    }

    #[test]
    fn parse_rejects_unknown_operators() {
        assert_eq!("*".parse::<Operator>(), Ok(Operator::Multiply));
        assert_eq!(
            "^".parse::<Operator>(),
            Err(ComputeError::UnsupportedOperator("^".to_string()))
        );
        assert_eq!(
            "++".parse::<Operator>(),
            Err(ComputeError::UnsupportedOperator("++".to_string()))
        );
    }

    #[test]
    fn serializes_as_symbol() {
        assert_eq!(serde_json::to_string(&Operator::Divide).unwrap(), "\"/\"");
    }
}
