// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Number of in-process workers when `workers.computing_power` is not set
pub const DEFAULT_COMPUTING_POWER: usize = 1;
/// Simulated latency of any operator when not configured
pub const DEFAULT_OPERATION_TIME_MS: u64 = 0;
/// First poll delay after an empty pull or an unresolved dependency
pub const DEFAULT_BACKOFF_INITIAL_MS: u64 = 50;
/// Ceiling for the poll delay
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 1_000;
/// Growth factor applied per consecutive empty poll
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Environment variable overriding `workers.computing_power`
pub const ENV_COMPUTING_POWER: &str = "COMPUTING_POWER";
pub const ENV_TIME_ADDITION_MS: &str = "TIME_ADDITION_MS";
pub const ENV_TIME_SUBTRACTION_MS: &str = "TIME_SUBTRACTION_MS";
pub const ENV_TIME_MULTIPLICATIONS_MS: &str = "TIME_MULTIPLICATIONS_MS";
pub const ENV_TIME_DIVISIONS_MS: &str = "TIME_DIVISIONS_MS";
