//! Engine configuration and fixed safety constants
//!
//! The numeric constants are the contract the whole engine is written
//! against; [`EngineConfig`] carries them at runtime so embedders and tests
//! can tighten or relax them, and `from_env` applies `FIBERWATCH_*` overrides
//! the way the original deployment loaded its environment.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use fiberwatch_ml::ForestConfig;

use crate::error::{EngineError, EngineResult};

/// Fiber concentration considered safe (fibers/cc); informational only,
/// never used for branching
pub const SAFE_THRESHOLD: f32 = 0.1;

/// Concentration at or above which a WARNING alert is raised (fibers/cc)
pub const WARNING_THRESHOLD: f32 = 0.5;

/// Concentration at or above which a DANGER alert is raised (fibers/cc)
pub const DANGER_THRESHOLD: f32 = 1.0;

/// Buffered readings a location needs before trend/anomaly analysis activates
pub const WARMUP_SIZE: usize = 50;

/// Readings used to fit a location's anomaly model (fewer if not yet buffered)
pub const TRAINING_WINDOW: usize = 100;

/// Most recent readings considered for trend classification
pub const TREND_WINDOW: usize = 10;

/// Readings averaged for the short-horizon prediction
pub const PREDICTION_WINDOW: usize = 3;

/// Decision scores below this raise an ANOMALY alert
pub const ANOMALY_ALERT_CUTOFF: f32 = -0.5;

/// Relative mean shift that separates increasing/decreasing from stable
pub const TREND_SENSITIVITY: f32 = 0.10;

/// Default per-location ring capacity; covers the training window with headroom
pub const DEFAULT_RETENTION: usize = 256;

/// Default capacity of the alert and analysis logs
pub const DEFAULT_LOG_CAPACITY: usize = 1024;

/// Runtime configuration for [`crate::engine::MonitorEngine`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// WARNING tier threshold (fibers/cc)
    pub warning_threshold: f32,
    /// DANGER tier threshold (fibers/cc)
    pub danger_threshold: f32,
    /// Buffered readings before analysis activates for a location
    pub warmup_size: usize,
    /// Readings used to fit a location's model
    pub training_window: usize,
    /// Most recent readings considered for trend classification
    pub trend_window: usize,
    /// Decision scores below this raise an ANOMALY alert
    pub anomaly_cutoff: f32,
    /// Relative mean shift separating directional trends from stable
    pub trend_sensitivity: f32,
    /// Per-location ring capacity
    pub retention: usize,
    /// Capacity of the alert and analysis logs
    pub log_capacity: usize,
    /// Refit a location's model after this many further readings;
    /// `None` trains exactly once per location
    pub retrain_every: Option<u32>,
    /// Anomaly model configuration
    pub forest: ForestConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            warning_threshold: WARNING_THRESHOLD,
            danger_threshold: DANGER_THRESHOLD,
            warmup_size: WARMUP_SIZE,
            training_window: TRAINING_WINDOW,
            trend_window: TREND_WINDOW,
            anomaly_cutoff: ANOMALY_ALERT_CUTOFF,
            trend_sensitivity: TREND_SENSITIVITY,
            retention: DEFAULT_RETENTION,
            log_capacity: DEFAULT_LOG_CAPACITY,
            retrain_every: None,
            forest: ForestConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by any `FIBERWATCH_*` environment variables
    ///
    /// Recognized: `FIBERWATCH_WARNING_THRESHOLD`, `FIBERWATCH_DANGER_THRESHOLD`,
    /// `FIBERWATCH_WARMUP_SIZE`, `FIBERWATCH_TRAINING_WINDOW`,
    /// `FIBERWATCH_TREND_WINDOW`, `FIBERWATCH_ANOMALY_CUTOFF`,
    /// `FIBERWATCH_RETENTION`, `FIBERWATCH_RETRAIN_EVERY`.
    pub fn from_env() -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(v) = parse_env("FIBERWATCH_WARNING_THRESHOLD")? {
            config.warning_threshold = v;
        }
        if let Some(v) = parse_env("FIBERWATCH_DANGER_THRESHOLD")? {
            config.danger_threshold = v;
        }
        if let Some(v) = parse_env("FIBERWATCH_WARMUP_SIZE")? {
            config.warmup_size = v;
        }
        if let Some(v) = parse_env("FIBERWATCH_TRAINING_WINDOW")? {
            config.training_window = v;
        }
        if let Some(v) = parse_env("FIBERWATCH_TREND_WINDOW")? {
            config.trend_window = v;
        }
        if let Some(v) = parse_env("FIBERWATCH_ANOMALY_CUTOFF")? {
            config.anomaly_cutoff = v;
        }
        if let Some(v) = parse_env("FIBERWATCH_RETENTION")? {
            config.retention = v;
        }
        if let Some(v) = parse_env("FIBERWATCH_RETRAIN_EVERY")? {
            config.retrain_every = Some(v);
        }

        Ok(config)
    }
}

/// Parse an optional environment override
fn parse_env<T>(key: &'static str) -> EngineResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| EngineError::Config {
                key,
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.warning_threshold, WARNING_THRESHOLD);
        assert_eq!(config.danger_threshold, DANGER_THRESHOLD);
        assert_eq!(config.warmup_size, 50);
        assert_eq!(config.training_window, 100);
        assert_eq!(config.trend_window, 10);
        assert_eq!(config.anomaly_cutoff, -0.5);
        assert_eq!(config.retrain_every, None);
        assert!(config.retention >= config.training_window);
    }

    // Env is process-global and tests run in parallel, so every from_env
    // assertion lives in this one test.
    #[test]
    fn env_overrides_and_failures() {
        std::env::set_var("FIBERWATCH_TREND_WINDOW", "20");
        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.trend_window, 20);
        assert_eq!(config.warmup_size, WARMUP_SIZE); // untouched keys keep defaults
        std::env::remove_var("FIBERWATCH_TREND_WINDOW");

        std::env::set_var("FIBERWATCH_RETENTION", "not-a-number");
        let err = EngineConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config {
                key: "FIBERWATCH_RETENTION",
                ..
            }
        ));
        std::env::remove_var("FIBERWATCH_RETENTION");
    }
}
