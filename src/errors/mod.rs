// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod compile;
mod compute;
mod config;
mod protocol;
mod store;

pub use compile::CompileError;
pub use compute::ComputeError;
pub use config::ConfigError;
pub use protocol::ProtocolError;
pub use store::{StoreError, SubmitError};
