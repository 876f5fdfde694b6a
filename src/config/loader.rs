// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_BACKOFF_INITIAL_MS, DEFAULT_BACKOFF_MAX_MS, DEFAULT_BACKOFF_MULTIPLIER,
    DEFAULT_COMPUTING_POWER, DEFAULT_OPERATION_TIME_MS, ENV_COMPUTING_POWER,
    ENV_TIME_ADDITION_MS, ENV_TIME_DIVISIONS_MS, ENV_TIME_MULTIPLICATIONS_MS,
    ENV_TIME_SUBTRACTION_MS,
};
use crate::errors::ConfigError;
use crate::model::Operator;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration for the evaluator.
///
/// Every section is optional; missing values fall back to the constants in
/// [`crate::config::consts`]. The configuration is built once and handed to
/// the orchestrator and worker pool explicitly.
///
/// # Fields
/// * `workers` - How many in-process workers to run
/// * `operation_times` - Simulated compute latency per operator
/// * `backoff` - Poll delay policy for idle workers and dependency waits
///
/// # Example
/// ```yaml
/// workers:
///   computing_power: 4
/// operation_times:
///   addition_ms: 100
///   multiplication_ms: 250
/// backoff:
///   initial_ms: 25
///   max_ms: 500
///   multiplier: 2.0
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub workers: WorkerOptions,
    #[serde(default)]
    pub operation_times: OperationTimes,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

/// Worker pool sizing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkerOptions {
    pub computing_power: Option<usize>,
}

impl WorkerOptions {
    /// Number of workers to spawn, using the built-in default if not configured.
    pub fn get_computing_power(&self) -> usize {
        self.computing_power.unwrap_or(DEFAULT_COMPUTING_POWER)
    }
}

/// Simulated latency a worker spends on each operator before reporting.
///
/// ```
/// use the_abacus::config::OperationTimes;
/// use the_abacus::model::Operator;
/// use std::time::Duration;
///
/// let times = OperationTimes {
///     multiplication_ms: Some(250),
///     ..Default::default()
/// };
/// assert_eq!(times.for_operator(Operator::Multiply), Duration::from_millis(250));
/// assert_eq!(times.for_operator(Operator::Add), Duration::ZERO);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationTimes {
    pub addition_ms: Option<u64>,
    pub subtraction_ms: Option<u64>,
    pub multiplication_ms: Option<u64>,
    pub division_ms: Option<u64>,
}

impl OperationTimes {
    pub fn for_operator(&self, operator: Operator) -> Duration {
        let configured = match operator {
            Operator::Add => self.addition_ms,
            Operator::Subtract => self.subtraction_ms,
            Operator::Multiply => self.multiplication_ms,
            Operator::Divide => self.division_ms,
        };
        Duration::from_millis(configured.unwrap_or(DEFAULT_OPERATION_TIME_MS))
    }
}

/// Capped exponential backoff settings.
///
/// The n-th consecutive wait lasts `initial_ms * multiplier^n`, never more
/// than `max_ms`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackoffConfig {
    pub initial_ms: Option<u64>,
    pub max_ms: Option<u64>,
    pub multiplier: Option<f64>,
}

impl BackoffConfig {
    pub fn get_initial(&self) -> Duration {
        Duration::from_millis(self.initial_ms.unwrap_or(DEFAULT_BACKOFF_INITIAL_MS))
    }

    pub fn get_max(&self) -> Duration {
        Duration::from_millis(self.max_ms.unwrap_or(DEFAULT_BACKOFF_MAX_MS))
    }

    pub fn get_multiplier(&self) -> f64 {
        self.multiplier.unwrap_or(DEFAULT_BACKOFF_MULTIPLIER)
    }
}

impl Config {
    /// Applies overrides from a variable lookup, keyed by the variable names
    /// in [`crate::config::consts`]. Values that do not parse are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: FromStr>(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            lookup(key).and_then(|raw| raw.trim().parse().ok())
        }

        if let Some(power) = parsed(&lookup, ENV_COMPUTING_POWER) {
            self.workers.computing_power = Some(power);
        }

        let times = &mut self.operation_times;
        for (key, slot) in [
            (ENV_TIME_ADDITION_MS, &mut times.addition_ms),
            (ENV_TIME_SUBTRACTION_MS, &mut times.subtraction_ms),
            (ENV_TIME_MULTIPLICATIONS_MS, &mut times.multiplication_ms),
            (ENV_TIME_DIVISIONS_MS, &mut times.division_ms),
        ] {
            if let Some(ms) = parsed(&lookup, key) {
                *slot = Some(ms);
            }
        }
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Rejects values the worker pool and backoff policy cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers.get_computing_power() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workers.computing_power",
                reason: "must be at least 1".to_string(),
            });
        }

        let multiplier = self.backoff.get_multiplier();
        // Also rejects NaN
        if !(multiplier >= 1.0) || !multiplier.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "backoff.multiplier",
                reason: format!("must be a finite number >= 1.0, got {}", multiplier),
            });
        }

        let (initial, max) = (self.backoff.get_initial(), self.backoff.get_max());
        if max.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "backoff.max_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        if initial > max {
            return Err(ConfigError::InvalidValue {
                field: "backoff.initial_ms",
                reason: format!(
                    "{}ms exceeds backoff.max_ms ({}ms)",
                    initial.as_millis(),
                    max.as_millis()
                ),
            });
        }

        Ok(())
    }
}

/// Load a config from a YAML (`.yaml`/`.yml`) or TOML (`.toml`) file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let cfg = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };
    Ok(cfg)
}

/// Load a config file, apply environment overrides, and validate the result.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let mut cfg = load_config(path)?;
    cfg.apply_env_overrides();
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::Builder;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();

        assert_eq!(cfg.workers.get_computing_power(), DEFAULT_COMPUTING_POWER);
        assert_eq!(cfg.operation_times.for_operator(Operator::Divide), Duration::ZERO);
        assert_eq!(cfg.backoff.get_initial(), Duration::from_millis(DEFAULT_BACKOFF_INITIAL_MS));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn loads_yaml_by_extension() {
        let file = write_config(
            ".yaml",
            r#"
workers:
  computing_power: 3
operation_times:
  subtraction_ms: 40
backoff:
  initial_ms: 10
  max_ms: 80
"#,
        );

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.workers.get_computing_power(), 3);
        assert_eq!(
            cfg.operation_times.for_operator(Operator::Subtract),
            Duration::from_millis(40)
        );
        assert_eq!(cfg.backoff.get_max(), Duration::from_millis(80));
        assert_eq!(cfg.backoff.get_multiplier(), DEFAULT_BACKOFF_MULTIPLIER);
    }

    #[test]
    fn loads_toml_by_extension() {
        let file = write_config(
            ".toml",
            r#"
[workers]
computing_power = 2

[operation_times]
division_ms = 500
"#,
        );

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.workers.get_computing_power(), 2);
        assert_eq!(
            cfg.operation_times.for_operator(Operator::Divide),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_config(".ini", "computing_power=2");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "ini"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("here.yaml"));
    }

    #[test]
    fn overrides_replace_configured_values() {
        let mut cfg = Config::default();
        cfg.operation_times.addition_ms = Some(5);

        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_COMPUTING_POWER, "8"),
            (ENV_TIME_ADDITION_MS, "1000"),
            (ENV_TIME_MULTIPLICATIONS_MS, " 300 "),
            (ENV_TIME_DIVISIONS_MS, "slow"),
        ]);
        cfg.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.workers.get_computing_power(), 8);
        assert_eq!(cfg.operation_times.addition_ms, Some(1000));
        assert_eq!(cfg.operation_times.multiplication_ms, Some(300));
        // Unparsable keeps the configured value
        assert_eq!(cfg.operation_times.division_ms, None);
        assert_eq!(cfg.operation_times.subtraction_ms, None);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut cfg = Config::default();
        cfg.workers.computing_power = Some(0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { field: "workers.computing_power", .. })
        ));

        let mut cfg = Config::default();
        cfg.backoff.multiplier = Some(0.5);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { field: "backoff.multiplier", .. })
        ));

        let mut cfg = Config::default();
        cfg.backoff.initial_ms = Some(500);
        cfg.backoff.max_ms = Some(100);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { field: "backoff.initial_ms", .. })
        ));

        let mut cfg = Config::default();
        cfg.backoff.initial_ms = Some(0);
        cfg.backoff.max_ms = Some(0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { field: "backoff.max_ms", .. })
        ));
    }
}
