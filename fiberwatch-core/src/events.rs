//! Domain types flowing through the analysis engine
//!
//! ## Overview
//!
//! Three entities move through the system, all created by the orchestrator in
//! response to one incoming reading and never mutated afterward:
//!
//! 1. **Readings**: a [`RawReading`] arrives from the feed, is stamped with
//!    ingest time if it carries none, and becomes an immutable
//!    [`SensorReading`] in the store.
//! 2. **Alerts**: threshold breaches and anomalous score patterns produce an
//!    [`Alert`] with a severity tier and operator-facing message.
//! 3. **Analysis results**: once a location is warm, every reading yields an
//!    [`AnalysisResult`] summarizing the rolling window.
//!
//! Everything serializes with serde; the severity and trend tags use the
//! exact wire strings downstream consumers already match on.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discrete alert severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Elevated concentration; investigate immediately
    Warning,
    /// Safety limit exceeded; evacuate
    Danger,
    /// Model flagged an unusual reading pattern
    Anomaly,
}

impl Severity {
    /// Wire/display form
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Danger => "DANGER",
            Severity::Anomaly => "ANOMALY",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directional classification of a location's recent readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Latest readings run more than the sensitivity above the earlier mean
    #[serde(rename = "increasing")]
    Increasing,
    /// Latest readings run more than the sensitivity below the earlier mean
    #[serde(rename = "decreasing")]
    Decreasing,
    /// Within the sensitivity band
    #[serde(rename = "stable")]
    Stable,
    /// Fewer than five readings available; no classification
    #[serde(rename = "insufficient data")]
    InsufficientData,
}

impl Trend {
    /// Wire/display form
    pub const fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
            Trend::InsufficientData => "insufficient data",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reading as delivered by the inbound feed
///
/// The timestamp is optional on the wire; it is defaulted to ingest time the
/// moment the engine accepts the reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Originating sensor
    pub sensor_id: String,
    /// Physical location label
    pub location: String,
    /// Capture time, if the sensor supplied one
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Fiber concentration (fibers/cc)
    pub level: f32,
    /// Ambient temperature (°C)
    pub temperature: f32,
    /// Relative humidity (%)
    pub humidity: f32,
    /// Barometric pressure (kPa)
    pub pressure: f32,
}

impl RawReading {
    /// Finalize into a stored reading, stamping `default_timestamp` when the
    /// sensor supplied none
    pub fn into_reading(self, default_timestamp: DateTime<Utc>) -> SensorReading {
        SensorReading {
            sensor_id: self.sensor_id,
            location: self.location,
            timestamp: self.timestamp.unwrap_or(default_timestamp),
            level: self.level,
            temperature: self.temperature,
            humidity: self.humidity,
            pressure: self.pressure,
        }
    }
}

/// One timestamped sample from a sensor; immutable once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Originating sensor
    pub sensor_id: String,
    /// Physical location label
    pub location: String,
    /// Capture or ingest time
    pub timestamp: DateTime<Utc>,
    /// Fiber concentration (fibers/cc)
    pub level: f32,
    /// Ambient temperature (°C)
    pub temperature: f32,
    /// Relative humidity (%)
    pub humidity: f32,
    /// Barometric pressure (kPa)
    pub pressure: f32,
}

impl SensorReading {
    /// The 4-channel feature vector the anomaly model consumes
    pub fn features(&self) -> [f32; 4] {
        [self.level, self.temperature, self.humidity, self.pressure]
    }
}

/// Operator-facing alert derived from one reading or one anomaly score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Sensor whose reading triggered the alert
    pub sensor_id: String,
    /// Location the alert applies to
    pub location: String,
    /// When the alert was raised
    pub timestamp: DateTime<Utc>,
    /// Concentration at trigger time (fibers/cc)
    pub level: f32,
    /// Severity tier
    pub severity: Severity,
    /// Human-readable description
    pub message: String,
}

impl Alert {
    /// DANGER alert for a reading at or above the safety limit
    pub fn danger(reading: &SensorReading) -> Self {
        Self {
            sensor_id: reading.sensor_id.clone(),
            location: reading.location.clone(),
            timestamp: reading.timestamp,
            level: reading.level,
            severity: Severity::Danger,
            message: format!(
                "DANGER: Fiber concentration ({}) exceeds safety limit. Immediate evacuation required.",
                reading.level
            ),
        }
    }

    /// WARNING alert for an elevated reading below the safety limit
    pub fn warning(reading: &SensorReading) -> Self {
        Self {
            sensor_id: reading.sensor_id.clone(),
            location: reading.location.clone(),
            timestamp: reading.timestamp,
            level: reading.level,
            severity: Severity::Warning,
            message: format!(
                "WARNING: Elevated fiber concentration ({}) detected. Investigate immediately.",
                reading.level
            ),
        }
    }

    /// ANOMALY alert for a reading the model scored as an outlier
    pub fn anomaly(reading: &SensorReading, timestamp: DateTime<Utc>) -> Self {
        Self {
            sensor_id: reading.sensor_id.clone(),
            location: reading.location.clone(),
            timestamp,
            level: reading.level,
            severity: Severity::Anomaly,
            message: format!(
                "Anomalous pattern detected in fiber readings at {}. Investigation recommended.",
                reading.location
            ),
        }
    }
}

/// Per-location rolling summary emitted once a location is warm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// When the analysis ran
    pub timestamp: DateTime<Utc>,
    /// Location summarized
    pub location: String,
    /// Mean concentration over the active trend window
    pub average_level: f32,
    /// Directional classification
    pub trend: Trend,
    /// Signed anomaly score; more negative = more anomalous
    pub anomaly_score: f32,
    /// Mean of the latest three readings
    pub prediction: f32,
}
