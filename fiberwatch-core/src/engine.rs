//! Analysis orchestrator
//!
//! ## Overview
//!
//! [`MonitorEngine`] is the single owner of all mutable analysis state: the
//! reading store, the alert and analysis logs, and one detector per location.
//! It sequences every incoming reading through the same steps:
//!
//! 1. Stamp a missing timestamp with the engine clock and append to the
//!    store.
//! 2. Threshold-check the reading; record and emit any alert.
//! 3. Once the location is warm (≥ 50 buffered readings): advance the
//!    location's model lifecycle, score the reading, classify the trend
//!    window, record and emit an [`AnalysisResult`], and raise an ANOMALY
//!    alert when the score crosses the cutoff.
//!
//! Each reading runs to completion before the next is considered. Producers
//! feed the engine through a [`ReadingQueue`] and the engine drains it as the
//! queue's single consumer, which is the entire locking story: no shared
//! mutable state, no per-location locks.
//!
//! The engine also backs the read-only query surface (recent readings,
//! alerts, analyses, and the per-location status summary) that an API layer
//! exposes to operators.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::detector::LocationDetector;
use crate::error::EngineResult;
use crate::events::{Alert, AnalysisResult, RawReading, SensorReading, Severity};
use crate::queue::ReadingQueue;
use crate::sinks::{AlertSink, AnalysisSink};
use crate::store::{AlertLog, AnalysisLog, ReadingStore};
use crate::thresholds::{StatusLevel, ThresholdEvaluator};
use crate::time::{Clock, SystemClock};
use crate::trend;

/// Everything one reading produced, for embedders and tests
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    /// Alert from the threshold check, if the reading breached a tier
    pub threshold_alert: Option<Alert>,
    /// Rolling summary, once the location is warm
    pub analysis: Option<AnalysisResult>,
    /// Alert from the anomaly score, if it crossed the cutoff
    pub anomaly_alert: Option<Alert>,
}

/// Standing of one location, derived from its most recent reading
#[derive(Debug, Clone, Serialize)]
pub struct LocationStatus {
    /// Severity tier of the latest reading
    pub status: StatusLevel,
    /// Latest concentration (fibers/cc)
    pub latest_level: f32,
    /// Timestamp of the latest reading
    pub last_updated: DateTime<Utc>,
}

/// Snapshot for the operator status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    /// Per-location standing
    pub locations: HashMap<String, LocationStatus>,
    /// Distinct sensors seen since start
    pub total_sensors: usize,
    /// Readings ingested since start, including evicted ones
    pub total_readings: u64,
    /// Alerts raised since start, including evicted ones
    pub total_alerts: u64,
}

/// The streaming analysis engine
pub struct MonitorEngine<C: Clock = SystemClock> {
    config: EngineConfig,
    clock: C,
    thresholds: ThresholdEvaluator,
    store: ReadingStore,
    alerts: AlertLog,
    analyses: AnalysisLog,
    detectors: HashMap<String, LocationDetector>,
    alert_sinks: Vec<Box<dyn AlertSink>>,
    analysis_sinks: Vec<Box<dyn AnalysisSink>>,
}

impl MonitorEngine<SystemClock> {
    /// Create on the system clock
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> MonitorEngine<C> {
    /// Create on an explicit clock
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        let thresholds =
            ThresholdEvaluator::new(config.warning_threshold, config.danger_threshold);
        let store = ReadingStore::new(config.retention);
        let alerts = AlertLog::new(config.log_capacity);
        let analyses = AnalysisLog::new(config.log_capacity);

        Self {
            config,
            clock,
            thresholds,
            store,
            alerts,
            analyses,
            detectors: HashMap::new(),
            alert_sinks: Vec::new(),
            analysis_sinks: Vec::new(),
        }
    }

    /// Register a sink for alerts
    pub fn add_alert_sink(&mut self, sink: impl AlertSink + 'static) {
        self.alert_sinks.push(Box::new(sink));
    }

    /// Register a sink for analysis results
    pub fn add_analysis_sink(&mut self, sink: impl AnalysisSink + 'static) {
        self.analysis_sinks.push(Box::new(sink));
    }

    /// Run one reading through the full pipeline
    pub fn process(&mut self, raw: RawReading) -> EngineResult<ProcessOutcome> {
        let reading = raw.into_reading(self.clock.now());
        log::info!(
            "processed reading from {} at {}",
            reading.sensor_id,
            reading.location
        );

        let buffered = self.store.append(reading.clone());

        let threshold_alert = self.thresholds.evaluate(&reading);
        if let Some(alert) = &threshold_alert {
            self.record_alert(alert);
        }

        let mut analysis = None;
        let mut anomaly_alert = None;

        if buffered >= self.config.warmup_size {
            let now = self.clock.now();
            let history: Vec<&SensorReading> =
                self.store.readings_for(&reading.location).collect();
            let detector = self
                .detectors
                .entry(reading.location.clone())
                .or_default();

            if let Some(score) = detector.observe(&history, &self.config)? {
                let window =
                    &history[history.len().saturating_sub(self.config.trend_window)..];
                let summary = trend::summarize(window, self.config.trend_sensitivity);

                analysis = Some(AnalysisResult {
                    timestamp: now,
                    location: reading.location.clone(),
                    average_level: summary.average_level,
                    trend: summary.trend,
                    anomaly_score: score.decision,
                    prediction: summary.prediction,
                });

                if score.is_outlier(self.config.anomaly_cutoff) {
                    anomaly_alert = Some(Alert::anomaly(&reading, now));
                }
            }
        }

        if let Some(result) = &analysis {
            self.record_analysis(result);
        }
        if let Some(alert) = &anomaly_alert {
            self.record_alert(alert);
        }

        Ok(ProcessOutcome {
            threshold_alert,
            analysis,
            anomaly_alert,
        })
    }

    /// Drain everything currently queued, processing in arrival order
    ///
    /// The engine is the queue's single consumer; call this from the
    /// orchestrator's consume loop.
    pub fn drain<const N: usize>(&mut self, queue: &ReadingQueue<N>) -> EngineResult<usize> {
        let mut processed = 0;
        while let Some(raw) = queue.pop() {
            self.process(raw)?;
            processed += 1;
        }
        Ok(processed)
    }

    fn record_alert(&mut self, alert: &Alert) {
        log::warn!("alert raised: {} - {}", alert.severity, alert.message);
        self.alerts.push(alert.clone());

        for sink in &mut self.alert_sinks {
            if let Err(e) = sink.emit_alert(alert) {
                log::error!("alert sink failed, alert kept in log only: {e}");
            }
        }
    }

    fn record_analysis(&mut self, result: &AnalysisResult) {
        log::debug!(
            "analysis for {}: avg {} trend {} score {}",
            result.location,
            result.average_level,
            result.trend,
            result.anomaly_score
        );
        self.analyses.push(result.clone());

        for sink in &mut self.analysis_sinks {
            if let Err(e) = sink.emit_analysis(result) {
                log::error!("analysis sink failed, result kept in log only: {e}");
            }
        }
    }

    // --- query surface ---

    /// Most recent `limit` readings, optionally for one location
    ///
    /// Per-location queries return arrival order; the global view orders by
    /// timestamp across locations.
    pub fn recent_readings(&self, location: Option<&str>, limit: usize) -> Vec<&SensorReading> {
        match location {
            Some(loc) => {
                let mut readings: Vec<&SensorReading> = self.store.readings_for(loc).collect();
                if readings.len() > limit {
                    readings.drain(..readings.len() - limit);
                }
                readings
            }
            None => {
                let mut readings: Vec<&SensorReading> = self.store.all().collect();
                readings.sort_by_key(|r| r.timestamp);
                if readings.len() > limit {
                    readings.drain(..readings.len() - limit);
                }
                readings
            }
        }
    }

    /// Most recent `limit` alerts, optionally filtered by severity
    pub fn recent_alerts(&self, severity: Option<Severity>, limit: usize) -> Vec<&Alert> {
        self.alerts.recent(severity, limit)
    }

    /// Most recent `limit` analysis results, optionally for one location
    pub fn recent_analyses(
        &self,
        location: Option<&str>,
        limit: usize,
    ) -> Vec<&AnalysisResult> {
        self.analyses.recent(location, limit)
    }

    /// Per-location standing plus cumulative totals
    pub fn status(&self) -> SystemStatus {
        let mut locations = HashMap::new();

        for location in self.store.locations() {
            if let Some(latest) = self.store.latest_for(location) {
                locations.insert(
                    location.to_string(),
                    LocationStatus {
                        status: self.thresholds.status_for(latest.level),
                        latest_level: latest.level,
                        last_updated: latest.timestamp,
                    },
                );
            }
        }

        SystemStatus {
            locations,
            total_sensors: self.store.sensor_count(),
            total_readings: self.store.total_ingested(),
            total_alerts: self.alerts.total(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
