//! End-to-end scenarios for the analysis engine
//!
//! Drives the full pipeline the way a deployment would: a ramp of readings
//! for one location, duplicate submissions, wire-format ingestion, and a
//! producer thread feeding the orchestrator through the ingest queue.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};

use fiberwatch_core::{
    EngineConfig, MonitorEngine, ProcessOutcome, RawReading, ReadingQueue, Severity,
    StatusLevel,
};
use fiberwatch_core::time::FixedClock;
use fiberwatch_ml::ForestConfig;

/// Default behavior with a smaller forest so scenarios stay quick
fn scenario_config() -> EngineConfig {
    EngineConfig {
        forest: ForestConfig {
            num_trees: 15,
            sample_size: 64,
            ..ForestConfig::default()
        },
        ..EngineConfig::default()
    }
}

fn scenario_engine() -> MonitorEngine<FixedClock> {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap());
    MonitorEngine::with_clock(scenario_config(), clock)
}

fn raw(sensor: &str, location: &str, level: f32) -> RawReading {
    RawReading {
        sensor_id: sensor.into(),
        location: location.into(),
        timestamp: None,
        level,
        temperature: 22.0,
        humidity: 45.0,
        pressure: 101.3,
    }
}

#[test]
fn ramp_scenario_alerts_and_analyzes_on_schedule() {
    let mut engine = scenario_engine();
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();

    let outcomes: Vec<ProcessOutcome> = (0..60)
        .map(|i| {
            let mut reading = raw("mill-a-03", "MillA", (0.05 + 0.01 * i as f64) as f32);
            reading.timestamp = Some(base + Duration::seconds(i as i64 * 30));
            engine.process(reading).unwrap()
        })
        .collect();

    for (i, outcome) in outcomes.iter().enumerate() {
        // Threshold alerts begin exactly when the level reaches 0.5 (i = 45)
        // and stay WARNING: the ramp tops out at 0.64, below the danger tier.
        match &outcome.threshold_alert {
            None => assert!(i < 45, "reading {i} should have alerted"),
            Some(alert) => {
                assert!(i >= 45, "reading {i} alerted early");
                assert_eq!(alert.severity, Severity::Warning);
            }
        }

        // Analysis starts with the 50th reading and never stops
        assert_eq!(
            outcome.analysis.is_some(),
            i >= 49,
            "analysis presence wrong at reading {i}"
        );

        // A steady ramp the model trained on is not anomalous
        assert!(outcome.anomaly_alert.is_none(), "false anomaly at reading {i}");
    }

    assert_eq!(engine.recent_alerts(Some(Severity::Warning), 100).len(), 15);
    assert_eq!(engine.recent_alerts(Some(Severity::Danger), 100).len(), 0);
    assert_eq!(engine.recent_analyses(Some("MillA"), 100).len(), 11);

    let status = engine.status();
    assert_eq!(status.locations["MillA"].status, StatusLevel::Warning);
    assert_eq!(status.total_readings, 60);
    assert_eq!(status.total_alerts, 15);
}

#[test]
fn below_warmup_never_analyzes() {
    let mut engine = scenario_engine();

    for i in 0..49 {
        let outcome = engine
            .process(raw("s1", "MillB", 0.3 + (i % 4) as f32 * 0.01))
            .unwrap();
        assert!(outcome.analysis.is_none());
        assert!(outcome.anomaly_alert.is_none());
    }

    assert!(engine.recent_analyses(Some("MillB"), 100).is_empty());
}

#[test]
fn duplicate_submission_is_not_deduplicated() {
    let mut engine = scenario_engine();
    let mut reading = raw("mill-a-03", "MillA", 0.7);
    reading.timestamp = Some(Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap());

    let first = engine.process(reading.clone()).unwrap();
    let second = engine.process(reading).unwrap();

    assert!(first.threshold_alert.is_some());
    assert!(second.threshold_alert.is_some());
    assert_eq!(engine.recent_readings(Some("MillA"), 100).len(), 2);
    assert_eq!(engine.recent_alerts(Some(Severity::Warning), 100).len(), 2);
}

#[test]
fn wire_format_accepts_missing_timestamp() {
    let payload = r#"{
        "sensor_id": "mill-a-03",
        "location": "MillA",
        "level": 1.2,
        "temperature": 24.1,
        "humidity": 41.5,
        "pressure": 101.1
    }"#;

    let reading: RawReading = serde_json::from_str(payload).unwrap();
    assert!(reading.timestamp.is_none());

    let mut engine = scenario_engine();
    let outcome = engine.process(reading).unwrap();

    let alert = outcome.threshold_alert.unwrap();
    assert_eq!(alert.severity, Severity::Danger);
    // Stamped with the engine clock at ingest
    assert_eq!(
        alert.timestamp,
        Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap()
    );
}

#[test]
fn producer_thread_feeds_the_orchestrator_in_order() {
    let queue: Arc<ReadingQueue<256>> = Arc::new(ReadingQueue::new());
    let producer_queue = Arc::clone(&queue);

    let producer = thread::spawn(move || {
        for i in 0..100 {
            producer_queue
                .push(raw("mill-q-01", "MillQ", i as f32 * 0.001))
                .expect("capacity exceeds the batch");
            if i % 10 == 0 {
                thread::yield_now();
            }
        }
    });

    let mut engine = scenario_engine();
    let mut processed = 0;
    while processed < 100 {
        processed += engine.drain(&queue).unwrap();
        thread::yield_now();
    }
    producer.join().unwrap();

    assert_eq!(processed, 100);
    assert!(queue.is_empty());
    assert_eq!(queue.stats().dropped(), 0);

    // Arrival order survived the handoff
    let readings = engine.recent_readings(Some("MillQ"), 200);
    assert_eq!(readings.len(), 100);
    for (i, reading) in readings.iter().enumerate() {
        assert!((reading.level - i as f32 * 0.001).abs() < 1e-9);
    }
}
