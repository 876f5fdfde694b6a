// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Expression compiler: infix text to postfix tokens to a task graph.
//!
//! Compilation is pure. Nothing here touches the store; the orchestrator
//! registers the resulting tasks only once compilation has fully succeeded,
//! so a malformed submission leaves no state behind.
//!
//! ```text
//! "2+3*4-5/2"
//!     │ to_postfix
//!     ▼
//! 2 3 4 * + 5 2 / -
//!     │ decompose
//!     ▼
//! t1 = 3 * 4
//! t2 = 2 + t1
//! t3 = 5 / 2
//! t4 = t2 - t3      (terminal)
//! ```

mod decomposer;
mod evaluate;
mod postfix;
mod token;

pub use decomposer::{decompose, decompose_postfix};
pub use evaluate::{evaluate, evaluate_postfix, EvaluationError};
pub use postfix::to_postfix;
pub use token::{Spanned, Token, Tokenizer};
