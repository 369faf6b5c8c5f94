//! Lock-Free Ingest Queue Between Sensor Producers and the Orchestrator
#![allow(unsafe_code)] // Required for lock-free atomic operations
//!
//! ## Overview
//!
//! This module decouples the ingestion boundary from the analysis pipeline: a
//! gateway thread accepting readings from the outside pushes into the queue,
//! and the orchestrator — the queue's single consumer — drains it and runs
//! each reading to completion before looking at the next. That single-consumer
//! discipline is what serializes per-location buffer mutation and model
//! training without a lock around the engine's hot path.
//!
//! ## Algorithm
//!
//! A bounded ring buffer with atomic head/tail positions:
//!
//! ```text
//! ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//! │  0  │  1  │  2  │  3  │  4  │  5  │  6  │  7  │
//! └─────┴─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//!          ↑                       ↑
//!        tail                    head
//!        (next read)          (next write)
//! ```
//!
//! - **Push (producer)**: load head, bail if the next position would collide
//!   with tail, write the slot, publish with a Release store.
//! - **Pop (consumer)**: load tail, bail if it equals head, read the slot,
//!   advance tail with a Release store.
//!
//! Acquire loads pair with the opposite side's Release stores so a reading is
//! fully written before it becomes visible, and a slot is fully read before
//! it can be overwritten.
//!
//! ## Contract
//!
//! One producer, one consumer. A full queue drops the *incoming* reading
//! (returned to the caller and counted) rather than blocking — the original
//! system had no blocking, timeout, or retry semantics and this keeps it
//! that way.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::events::RawReading;

/// Default ingest queue capacity (readings)
pub const QUEUE_CAPACITY: usize = 1024;

/// Bounded single-producer single-consumer queue of raw readings
///
/// Capacity must be a power of two; the ring holds `N - 1` readings.
pub struct ReadingQueue<const N: usize = QUEUE_CAPACITY> {
    /// Ring storage; slots outside [tail, head) are uninitialized
    slots: UnsafeCell<[MaybeUninit<RawReading>; N]>,

    /// Next write position (producer owned)
    head: AtomicUsize,

    /// Next read position (consumer owned)
    tail: AtomicUsize,

    /// Queue health counters
    stats: QueueStats,
}

/// Queue health counters
///
/// Relaxed ordering throughout: the counts inform monitoring, not
/// correctness.
#[derive(Debug)]
pub struct QueueStats {
    /// Readings accepted
    pub pushed: AtomicU64,
    /// Readings handed to the consumer
    pub popped: AtomicU64,
    /// Readings rejected because the queue was full
    pub dropped: AtomicU64,
}

impl QueueStats {
    const fn new() -> Self {
        Self {
            pushed: AtomicU64::new(0),
            popped: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Readings rejected so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> ReadingQueue<N> {
    /// Create an empty queue
    ///
    /// Panics if `N` is not a power of two (the index math relies on it).
    pub fn new() -> Self {
        assert!(N.is_power_of_two(), "queue capacity must be a power of two");
        assert!(N >= 2, "queue capacity must hold at least one reading");

        Self {
            // Uninitialized MaybeUninit slots are valid by definition
            slots: UnsafeCell::new(unsafe { MaybeUninit::uninit().assume_init() }),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            stats: QueueStats::new(),
        }
    }

    /// Push a reading (single producer)
    ///
    /// Returns the reading back when the queue is full so the caller decides
    /// its fate; the drop is counted either way.
    pub fn push(&self, reading: RawReading) -> Result<(), RawReading> {
        let head = self.head.load(Ordering::Acquire);
        let next_head = (head + 1) & (N - 1);

        if next_head == self.tail.load(Ordering::Acquire) {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(reading);
        }

        // Sole producer: nobody else touches this slot until head advances.
        // Raw-pointer projection so no reference to the whole array exists
        // while the consumer reads another slot.
        unsafe {
            let slot = ptr::addr_of_mut!((*self.slots.get())[head]);
            (*slot).write(reading);
        }

        self.head.store(next_head, Ordering::Release);
        self.stats.pushed.fetch_add(1, Ordering::Relaxed);

        Ok(())
    }

    /// Pop the oldest reading (single consumer)
    pub fn pop(&self) -> Option<RawReading> {
        let tail = self.tail.load(Ordering::Acquire);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }

        // Sole consumer: the slot stays ours until tail advances
        let reading = unsafe {
            let slot = ptr::addr_of!((*self.slots.get())[tail]);
            ptr::read((*slot).as_ptr())
        };

        self.tail.store((tail + 1) & (N - 1), Ordering::Release);
        self.stats.popped.fetch_add(1, Ordering::Relaxed);

        Some(reading)
    }

    /// Readings currently queued
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);

        if head >= tail {
            head - tail
        } else {
            N - tail + head
        }
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// True when the next push would be rejected
    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        ((head + 1) & (N - 1)) == tail
    }

    /// Health counters
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Drain everything currently queued
    pub fn drain(&self) -> QueueDrain<'_, N> {
        QueueDrain { queue: self }
    }
}

impl<const N: usize> Default for ReadingQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Drop for ReadingQueue<N> {
    fn drop(&mut self) {
        // Queued readings own heap strings; read them out so they drop
        while self.pop().is_some() {}
    }
}

// The atomics order all cross-thread access to the slots
unsafe impl<const N: usize> Send for ReadingQueue<N> {}
unsafe impl<const N: usize> Sync for ReadingQueue<N> {}

/// Iterator yielding queued readings until empty
pub struct QueueDrain<'a, const N: usize> {
    queue: &'a ReadingQueue<N>,
}

impl<const N: usize> Iterator for QueueDrain<'_, N> {
    type Item = RawReading;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(level: f32) -> RawReading {
        RawReading {
            sensor_id: "s1".into(),
            location: "MillA".into(),
            timestamp: None,
            level,
            temperature: 22.0,
            humidity: 45.0,
            pressure: 101.3,
        }
    }

    #[test]
    fn push_pop_preserves_order() {
        let queue = ReadingQueue::<16>::new();

        for i in 0..5 {
            queue.push(raw(i as f32)).unwrap();
        }
        assert_eq!(queue.len(), 5);

        for i in 0..5 {
            assert_eq!(queue.pop().unwrap().level, i as f32);
        }
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn full_queue_returns_the_reading() {
        let queue = ReadingQueue::<4>::new();

        // Ring holds N - 1
        for i in 0..3 {
            queue.push(raw(i as f32)).unwrap();
        }
        assert!(queue.is_full());

        let rejected = queue.push(raw(99.0)).unwrap_err();
        assert_eq!(rejected.level, 99.0);
        assert_eq!(queue.stats().dropped(), 1);

        // Space frees after a pop
        queue.pop().unwrap();
        queue.push(raw(99.0)).unwrap();
    }

    #[test]
    fn drain_empties_the_queue() {
        let queue = ReadingQueue::<8>::new();
        for i in 0..5 {
            queue.push(raw(i as f32)).unwrap();
        }

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained.len(), 5);
        assert!(queue.is_empty());
        assert_eq!(queue.stats().popped.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn wraparound_keeps_order() {
        let queue = ReadingQueue::<4>::new();

        // Cycle enough times to wrap the ring repeatedly
        let mut expected = 0.0;
        for round in 0..10 {
            for i in 0..3 {
                queue.push(raw((round * 3 + i) as f32)).unwrap();
            }
            for _ in 0..3 {
                assert_eq!(queue.pop().unwrap().level, expected);
                expected += 1.0;
            }
        }
    }
}
