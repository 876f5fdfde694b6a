// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process workers that poll a [`crate::traits::TaskSource`].

mod agent;
mod backoff;
mod compute;
mod pool;

pub use agent::Worker;
pub use backoff::{sleep_or_cancel, BackoffPolicy};
pub use compute::compute;
pub use pool::WorkerPool;
