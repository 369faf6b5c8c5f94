//! In-memory stores for readings, alerts, and analysis results
//!
//! All three are append-only from the orchestrator's point of view and
//! bounded: reading history lives in per-location rings
//! ([`crate::buffer::ReadingWindow`]), alerts and analyses in capped logs
//! that evict oldest-first. Cumulative counters survive eviction so the
//! status summary reports true totals.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::buffer::{ReadingWindow, WindowIter};
use crate::events::{Alert, AnalysisResult, SensorReading, Severity};

/// Per-location reading history with bounded retention
#[derive(Debug)]
pub struct ReadingStore {
    retention: usize,
    locations: HashMap<String, ReadingWindow>,
    sensor_ids: HashSet<String>,
    total_ingested: u64,
}

impl ReadingStore {
    /// Create with `retention` readings kept per location
    pub fn new(retention: usize) -> Self {
        Self {
            retention,
            locations: HashMap::new(),
            sensor_ids: HashSet::new(),
            total_ingested: 0,
        }
    }

    /// Append in arrival order; returns the location's buffered count
    ///
    /// No deduplication: submitting the same reading twice appends twice.
    pub fn append(&mut self, reading: SensorReading) -> usize {
        self.total_ingested += 1;
        if !self.sensor_ids.contains(&reading.sensor_id) {
            self.sensor_ids.insert(reading.sensor_id.clone());
        }

        let window = self
            .locations
            .entry(reading.location.clone())
            .or_insert_with(|| ReadingWindow::new(self.retention));
        window.push(reading);
        window.len()
    }

    /// Retained readings for `location`, oldest first
    pub fn readings_for<'a>(
        &'a self,
        location: &str,
    ) -> impl Iterator<Item = &'a SensorReading> + 'a {
        self.locations
            .get(location)
            .into_iter()
            .flat_map(|w| w.iter())
    }

    /// The last `n` retained readings for `location`, oldest first
    pub fn recent_for(&self, location: &str, n: usize) -> Option<WindowIter<'_>> {
        self.locations.get(location).map(|w| w.recent(n))
    }

    /// Most recent reading for `location`
    pub fn latest_for(&self, location: &str) -> Option<&SensorReading> {
        self.locations.get(location).and_then(|w| w.last())
    }

    /// Buffered reading count for `location`
    pub fn len_for(&self, location: &str) -> usize {
        self.locations.get(location).map_or(0, |w| w.len())
    }

    /// Every retained reading across locations
    ///
    /// Per-location order is chronological; the order between locations is
    /// unspecified.
    pub fn all(&self) -> impl Iterator<Item = &SensorReading> {
        self.locations.values().flat_map(|w| w.iter())
    }

    /// Known location labels
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    /// Cumulative readings ingested, including evicted ones
    pub fn total_ingested(&self) -> u64 {
        self.total_ingested
    }

    /// Distinct sensors seen
    pub fn sensor_count(&self) -> usize {
        self.sensor_ids.len()
    }
}

/// Capped chronological log of alerts
#[derive(Debug)]
pub struct AlertLog {
    entries: VecDeque<Alert>,
    capacity: usize,
    total: u64,
}

impl AlertLog {
    /// Create with room for `capacity` alerts (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    /// Append, evicting the oldest entry when full
    pub fn push(&mut self, alert: Alert) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(alert);
        self.total += 1;
    }

    /// The most recent `limit` alerts matching `severity`, oldest first
    pub fn recent(&self, severity: Option<Severity>, limit: usize) -> Vec<&Alert> {
        tail_filtered(self.entries.iter(), limit, |a| {
            severity.map_or(true, |s| a.severity == s)
        })
    }

    /// Retained alert count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no alerts are retained
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cumulative alerts raised, including evicted ones
    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Capped chronological log of analysis results
#[derive(Debug)]
pub struct AnalysisLog {
    entries: VecDeque<AnalysisResult>,
    capacity: usize,
    total: u64,
}

impl AnalysisLog {
    /// Create with room for `capacity` results (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    /// Append, evicting the oldest entry when full
    pub fn push(&mut self, result: AnalysisResult) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(result);
        self.total += 1;
    }

    /// The most recent `limit` results for `location` (all locations when
    /// `None`), oldest first
    pub fn recent(&self, location: Option<&str>, limit: usize) -> Vec<&AnalysisResult> {
        tail_filtered(self.entries.iter(), limit, |r| {
            location.map_or(true, |l| r.location == l)
        })
    }

    /// Retained result count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no results are retained
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cumulative results produced, including evicted ones
    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Last `limit` items passing `keep`, preserving chronological order
fn tail_filtered<'a, T, I, F>(items: I, limit: usize, keep: F) -> Vec<&'a T>
where
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> bool,
{
    let mut matching: Vec<&T> = items.filter(|item| keep(*item)).collect();
    if matching.len() > limit {
        matching.drain(..matching.len() - limit);
    }
    matching
}
