//! Outbound sink boundary
//!
//! The engine hands every alert and analysis result to its sinks in
//! production order and moves on: a sink that fails is logged and skipped,
//! never retried. Transport implementations (message bus, HTTP fan-out) live
//! outside this crate behind these traits; what ships here is an in-memory
//! sink for tests and embedding, and a JSON-lines sink for anything that
//! speaks newline-delimited JSON.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::{EngineError, EngineResult};
use crate::events::{Alert, AnalysisResult};

/// Receives every alert the engine raises, in production order
pub trait AlertSink: Send {
    /// Deliver one alert
    fn emit_alert(&mut self, alert: &Alert) -> EngineResult<()>;
}

/// Receives every analysis result the engine produces, in production order
pub trait AnalysisSink: Send {
    /// Deliver one analysis result
    fn emit_analysis(&mut self, result: &AnalysisResult) -> EngineResult<()>;
}

/// In-memory sink with a cloneable inspection handle
///
/// Clones share the same storage, so a test can keep one handle and register
/// another with the engine.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemorySinkInner>>,
}

#[derive(Debug, Default)]
struct MemorySinkInner {
    alerts: Vec<Alert>,
    analyses: Vec<AnalysisResult>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of delivered alerts, in production order
    pub fn alerts(&self) -> Vec<Alert> {
        self.inner
            .lock()
            .map(|inner| inner.alerts.clone())
            .unwrap_or_default()
    }

    /// Snapshot of delivered analysis results, in production order
    pub fn analyses(&self) -> Vec<AnalysisResult> {
        self.inner
            .lock()
            .map(|inner| inner.analyses.clone())
            .unwrap_or_default()
    }
}

impl AlertSink for MemorySink {
    fn emit_alert(&mut self, alert: &Alert) -> EngineResult<()> {
        self.inner
            .lock()
            .map_err(|e| EngineError::Sink {
                sink: "memory",
                reason: e.to_string(),
            })?
            .alerts
            .push(alert.clone());
        Ok(())
    }
}

impl AnalysisSink for MemorySink {
    fn emit_analysis(&mut self, result: &AnalysisResult) -> EngineResult<()> {
        self.inner
            .lock()
            .map_err(|e| EngineError::Sink {
                sink: "memory",
                reason: e.to_string(),
            })?
            .analyses
            .push(result.clone());
        Ok(())
    }
}

/// Serializes each emission as one JSON line to any writer
///
/// The line format matches the payloads the original system published to its
/// message bus, so downstream consumers parse either unchanged.
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, json: String) -> EngineResult<()> {
        writeln!(self.writer, "{json}").map_err(|e| EngineError::Sink {
            sink: "json-lines",
            reason: e.to_string(),
        })
    }
}

impl<W: Write + Send> AlertSink for JsonLinesSink<W> {
    fn emit_alert(&mut self, alert: &Alert) -> EngineResult<()> {
        let json = serde_json::to_string(alert).map_err(|e| EngineError::Sink {
            sink: "json-lines",
            reason: e.to_string(),
        })?;
        self.write_line(json)
    }
}

impl<W: Write + Send> AnalysisSink for JsonLinesSink<W> {
    fn emit_analysis(&mut self, result: &AnalysisResult) -> EngineResult<()> {
        let json = serde_json::to_string(result).map_err(|e| EngineError::Sink {
            sink: "json-lines",
            reason: e.to_string(),
        })?;
        self.write_line(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{SensorReading, Severity, Trend};
    use chrono::{TimeZone, Utc};

    fn reading(level: f32) -> SensorReading {
        SensorReading {
            sensor_id: "s1".into(),
            location: "MillA".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            level,
            temperature: 22.0,
            humidity: 45.0,
            pressure: 101.3,
        }
    }

    #[test]
    fn memory_sink_handles_share_storage() {
        let sink = MemorySink::new();
        let mut registered = sink.clone();

        registered.emit_alert(&Alert::danger(&reading(1.5))).unwrap();
        registered
            .emit_analysis(&AnalysisResult {
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
                location: "MillA".into(),
                average_level: 0.3,
                trend: Trend::Stable,
                anomaly_score: -0.1,
                prediction: 0.3,
            })
            .unwrap();

        assert_eq!(sink.alerts().len(), 1);
        assert_eq!(sink.alerts()[0].severity, Severity::Danger);
        assert_eq!(sink.analyses().len(), 1);
    }

    #[test]
    fn json_lines_sink_writes_one_line_per_emission() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.emit_alert(&Alert::warning(&reading(0.7))).unwrap();
        sink.emit_alert(&Alert::danger(&reading(1.2))).unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Alert = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.severity, Severity::Warning);
        assert_eq!(first.level, 0.7);
    }
}
