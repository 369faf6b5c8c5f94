//! Threshold evaluation
//!
//! A pure classifier from one reading's concentration to a severity tier.
//! Boundaries are inclusive of the higher tier: exactly 1.0 is DANGER,
//! exactly 0.5 is WARNING. Emission to sinks happens in the orchestrator;
//! this module only decides.

use core::fmt;

use serde::Serialize;

use crate::config::{DANGER_THRESHOLD, WARNING_THRESHOLD};
use crate::events::{Alert, SensorReading};

/// Current standing of a location, derived from its latest reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusLevel {
    /// Below the warning threshold
    Safe,
    /// At or above the warning threshold
    Warning,
    /// At or above the danger threshold
    Danger,
}

impl StatusLevel {
    /// Wire/display form
    pub const fn as_str(&self) -> &'static str {
        match self {
            StatusLevel::Safe => "SAFE",
            StatusLevel::Warning => "WARNING",
            StatusLevel::Danger => "DANGER",
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless severity classifier
#[derive(Debug, Clone, Copy)]
pub struct ThresholdEvaluator {
    warning: f32,
    danger: f32,
}

impl Default for ThresholdEvaluator {
    fn default() -> Self {
        Self {
            warning: WARNING_THRESHOLD,
            danger: DANGER_THRESHOLD,
        }
    }
}

impl ThresholdEvaluator {
    /// Create with custom thresholds; swapped if supplied inverted
    pub fn new(warning: f32, danger: f32) -> Self {
        let (warning, danger) = if warning > danger {
            (danger, warning)
        } else {
            (warning, danger)
        };

        Self { warning, danger }
    }

    /// Classify one reading; `None` below the warning threshold
    pub fn evaluate(&self, reading: &SensorReading) -> Option<Alert> {
        if reading.level >= self.danger {
            Some(Alert::danger(reading))
        } else if reading.level >= self.warning {
            Some(Alert::warning(reading))
        } else {
            None
        }
    }

    /// Status tier for a bare concentration value, same boundaries
    pub fn status_for(&self, level: f32) -> StatusLevel {
        if level >= self.danger {
            StatusLevel::Danger
        } else if level >= self.warning {
            StatusLevel::Warning
        } else {
            StatusLevel::Safe
        }
    }
}
