//! Bounded ring buffer for per-location reading history
//!
//! ## Overview
//!
//! Each location keeps its recent readings in a [`ReadingWindow`]: a ring
//! that overwrites the oldest entry when full. Trend classification needs the
//! last ten readings, model training the last hundred; anything older has no
//! consumer, so the window is the retention policy — old data is discarded
//! automatically instead of growing without bound.
//!
//! ## Invariants
//!
//! - `write_pos < capacity` (next write position is always valid)
//! - `len <= capacity`
//! - Iteration yields chronological (arrival) order, oldest first
//!
//! The capacity is a runtime value from [`crate::config::EngineConfig`]
//! because retention is an operational knob, not a compile-time property.

use crate::events::SensorReading;

/// Fixed-capacity ring of readings, oldest evicted first
#[derive(Debug, Clone)]
pub struct ReadingWindow {
    /// Storage; `None` marks slots not yet written
    slots: Vec<Option<SensorReading>>,
    /// Index the next write lands on, wraps at capacity
    write_pos: usize,
    /// Number of readings currently held
    len: usize,
}

impl ReadingWindow {
    /// Create with room for `capacity` readings (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![None; capacity],
            write_pos: 0,
            len: 0,
        }
    }

    /// Append a reading, evicting the oldest when full
    pub fn push(&mut self, reading: SensorReading) {
        self.slots[self.write_pos] = Some(reading);
        self.write_pos = (self.write_pos + 1) % self.slots.len();

        if self.len < self.slots.len() {
            self.len += 1;
        }
    }

    /// Number of retained readings
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the next push will evict
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Maximum readings retained
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Most recent reading
    pub fn last(&self) -> Option<&SensorReading> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 {
            self.slots.len() - 1
        } else {
            self.write_pos - 1
        };

        self.slots[idx].as_ref()
    }

    /// Reading at logical index (0 = oldest)
    ///
    /// Until the ring wraps, logical and physical indices coincide; once
    /// full, the oldest entry sits at `write_pos` and the view is rotated.
    fn get(&self, index: usize) -> Option<&SensorReading> {
        if index >= self.len {
            return None;
        }

        let physical = if self.len < self.slots.len() {
            index
        } else {
            (self.write_pos + index) % self.slots.len()
        };

        self.slots[physical].as_ref()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> WindowIter<'_> {
        WindowIter {
            window: self,
            index: 0,
        }
    }

    /// Iterate the last `n` readings (fewer if not buffered), oldest first
    pub fn recent(&self, n: usize) -> WindowIter<'_> {
        WindowIter {
            window: self,
            index: self.len.saturating_sub(n),
        }
    }
}

/// Iterator over a window's retained readings in arrival order
pub struct WindowIter<'a> {
    window: &'a ReadingWindow,
    index: usize,
}

impl<'a> Iterator for WindowIter<'a> {
    type Item = &'a SensorReading;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.window.get(self.index)?;
        self.index += 1;
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn empty_window() {
        let window = ReadingWindow::new(5);
        assert!(window.is_empty());
        assert_eq!(window.len(), 0);
        assert!(window.last().is_none());
        assert_eq!(window.iter().count(), 0);
    }

    #[test]
    fn push_and_last() {
        let mut window = ReadingWindow::new(5);
        window.push(reading(0.1));
        window.push(reading(0.2));

        assert_eq!(window.len(), 2);
        assert_eq!(window.last().unwrap().level, 0.2);
    }

    #[test]
    fn eviction_keeps_newest() {
        let mut window = ReadingWindow::new(3);
        for i in 0..5 {
            window.push(reading(i as f32));
        }

        assert_eq!(window.len(), 3);
        assert!(window.is_full());

        let levels: Vec<f32> = window.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn recent_takes_the_tail() {
        let mut window = ReadingWindow::new(10);
        for i in 0..6 {
            window.push(reading(i as f32));
        }

        let levels: Vec<f32> = window.recent(3).map(|r| r.level).collect();
        assert_eq!(levels, vec![3.0, 4.0, 5.0]);

        // Asking for more than buffered returns everything
        assert_eq!(window.recent(100).count(), 6);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut window = ReadingWindow::new(0);
        window.push(reading(1.0));
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.last().unwrap().level, 1.0);
    }
}
