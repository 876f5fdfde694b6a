// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod compiler;   // infix -> postfix -> task graph
pub mod config;     // runtime configuration
pub mod engine;     // state store + orchestrator
pub mod errors;     // error handling
pub mod model;      // expressions, tasks, wire views
pub mod observability;
pub mod traits;     // store and task source contracts
pub mod worker;     // polling workers
