// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::str::FromStr;

use crate::errors::ComputeError;
use crate::model::Operator;

/// Applies an operator received over the wire to two resolved operands.
///
/// The operator arrives as text, so anything outside `+ - * /` is rejected
/// here rather than trusted.
pub fn compute(operator: &str, a: f64, b: f64) -> Result<f64, ComputeError> {
    Operator::from_str(operator)?.apply(a, b)
}
