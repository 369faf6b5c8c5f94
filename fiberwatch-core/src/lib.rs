//! Streaming analysis engine for airborne fiber concentration monitoring
//!
//! FiberWatch ingests periodic concentration readings from fixed sensors in
//! industrial facilities, classifies each against safety thresholds, and runs
//! rolling trend and anomaly analysis per physical location so operators see
//! early-warning signals before a hard limit is crossed.
//!
//! The crate is the engine only: transports that deliver readings and carry
//! alerts onward, and the API that exposes stored data, live behind the
//! boundaries in [`queue`] and [`sinks`] plus the read-only query methods on
//! [`engine::MonitorEngine`].
//!
//! ```
//! use fiberwatch_core::{EngineConfig, MonitorEngine, RawReading};
//!
//! let mut engine = MonitorEngine::new(EngineConfig::default());
//!
//! let outcome = engine.process(RawReading {
//!     sensor_id: "mill-a-03".into(),
//!     location: "MillA".into(),
//!     timestamp: None, // stamped at ingest
//!     level: 0.72,
//!     temperature: 22.4,
//!     humidity: 44.0,
//!     pressure: 101.3,
//! }).unwrap();
//!
//! assert!(outcome.threshold_alert.is_some()); // 0.72 >= warning threshold
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod buffer;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod events;
pub mod queue;
pub mod sinks;
pub mod store;
pub mod thresholds;
pub mod time;
pub mod trend;

// Public API
pub use config::EngineConfig;
pub use engine::{MonitorEngine, ProcessOutcome, SystemStatus};
pub use error::{EngineError, EngineResult};
pub use events::{Alert, AnalysisResult, RawReading, SensorReading, Severity, Trend};
pub use queue::ReadingQueue;
pub use sinks::{AlertSink, AnalysisSink, JsonLinesSink, MemorySink};
pub use thresholds::{StatusLevel, ThresholdEvaluator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
