//! Trend classification over a location's recent readings
//!
//! Pure window math: the caller supplies the last ≤ 10 readings of one
//! location, oldest first, and gets back the directional classification, the
//! rolling average, and the 3-point prediction in one pass. Insufficient
//! history yields sentinels, never errors.

use crate::config::PREDICTION_WINDOW;
use crate::events::{SensorReading, Trend};

/// Readings a window needs before direction can be classified
const MIN_CLASSIFIABLE: usize = 5;

/// Rolling summary of one location's trend window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSummary {
    /// Mean concentration over the whole supplied window
    pub average_level: f32,
    /// Directional classification
    pub trend: Trend,
    /// Mean of the latest three readings (newest level when fewer than three)
    pub prediction: f32,
}

/// Summarize a trend window
///
/// `window` is the last ≤ trend-window readings of one location, oldest
/// first. `sensitivity` is the relative mean shift (0.10 = ±10%) separating
/// directional trends from stable.
pub fn summarize(window: &[&SensorReading], sensitivity: f32) -> TrendSummary {
    if window.is_empty() {
        return TrendSummary {
            average_level: 0.0,
            trend: Trend::InsufficientData,
            prediction: 0.0,
        };
    }

    TrendSummary {
        average_level: mean_level(window),
        trend: classify(window, sensitivity),
        prediction: predict(window),
    }
}

/// Directional classification of the window
fn classify(window: &[&SensorReading], sensitivity: f32) -> Trend {
    if window.len() < MIN_CLASSIFIABLE {
        return Trend::InsufficientData;
    }

    let split = window.len() - MIN_CLASSIFIABLE;
    let earlier = &window[..split];
    let latest = &window[split..];

    // A window of exactly five readings leaves no earlier group to compare
    // against; without this guard the mean below would divide by zero.
    if earlier.is_empty() {
        return Trend::InsufficientData;
    }

    let earlier_mean = mean_level(earlier);
    let latest_mean = mean_level(latest);

    if latest_mean > earlier_mean * (1.0 + sensitivity) {
        Trend::Increasing
    } else if latest_mean < earlier_mean * (1.0 - sensitivity) {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Mean of the latest three readings, or the newest level below three
fn predict(window: &[&SensorReading]) -> f32 {
    if window.len() >= PREDICTION_WINDOW {
        mean_level(&window[window.len() - PREDICTION_WINDOW..])
    } else {
        window[window.len() - 1].level
    }
}

fn mean_level(readings: &[&SensorReading]) -> f32 {
    readings.iter().map(|r| r.level).sum::<f32>() / readings.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn readings(levels: &[f32]) -> Vec<SensorReading> {
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| SensorReading {
                sensor_id: "s1".into(),
                location: "MillA".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
                    + chrono::Duration::seconds(i as i64),
                level,
                temperature: 22.0,
                humidity: 45.0,
                pressure: 101.3,
            })
            .collect()
    }

    fn summarize_levels(levels: &[f32]) -> TrendSummary {
        let owned = readings(levels);
        let refs: Vec<&SensorReading> = owned.iter().collect();
        summarize(&refs, 0.10)
    }

    #[test]
    fn too_few_readings_is_insufficient() {
        for n in 0..5 {
            let levels: Vec<f32> = (0..n).map(|i| i as f32).collect();
            assert_eq!(
                summarize_levels(&levels).trend,
                Trend::InsufficientData,
                "window of {n} readings must not classify"
            );
        }
    }

    #[test]
    fn exactly_five_readings_has_no_baseline() {
        // The latest group consumes the whole window; nothing to compare
        assert_eq!(
            summarize_levels(&[1.0, 2.0, 3.0, 4.0, 5.0]).trend,
            Trend::InsufficientData
        );
    }

    #[test]
    fn step_up_is_increasing() {
        // mean 2 vs mean 1, ratio 2.0 > 1.10
        let summary = summarize_levels(&[1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
        assert_eq!(summary.trend, Trend::Increasing);
        assert!((summary.average_level - 1.5).abs() < 1e-6);
        assert!((summary.prediction - 2.0).abs() < 1e-6);
    }

    #[test]
    fn step_down_is_decreasing() {
        let summary = summarize_levels(&[2.0, 2.0, 2.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(summary.trend, Trend::Decreasing);
    }

    #[test]
    fn constant_window_is_stable() {
        let summary = summarize_levels(&[0.3; 10]);
        assert_eq!(summary.trend, Trend::Stable);
        assert!((summary.average_level - 0.3).abs() < 1e-6);
        assert!((summary.prediction - 0.3).abs() < 1e-6);
    }

    #[test]
    fn shift_inside_band_is_stable() {
        // latest mean 1.05 vs earlier mean 1.0: inside ±10%
        let summary = summarize_levels(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.05, 1.05, 1.05, 1.05, 1.05]);
        assert_eq!(summary.trend, Trend::Stable);
    }

    #[test]
    fn short_window_splits_unevenly() {
        // 7 readings: earlier group is the first 2, latest the last 5
        let summary = summarize_levels(&[1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
        assert_eq!(summary.trend, Trend::Increasing);
    }

    #[test]
    fn prediction_falls_back_below_three() {
        let owned = readings(&[0.7, 0.9]);
        let refs: Vec<&SensorReading> = owned.iter().collect();
        let summary = summarize(&refs, 0.10);
        assert_eq!(summary.trend, Trend::InsufficientData);
        assert!((summary.prediction - 0.9).abs() < 1e-6);
    }

    #[test]
    fn empty_window_yields_sentinels() {
        let summary = summarize(&[], 0.10);
        assert_eq!(summary.trend, Trend::InsufficientData);
        assert_eq!(summary.average_level, 0.0);
        assert_eq!(summary.prediction, 0.0);
    }

    proptest! {
        #[test]
        fn summarize_never_panics(levels in proptest::collection::vec(0.0f32..10.0, 0..20)) {
            let owned = readings(&levels);
            let refs: Vec<&SensorReading> = owned.iter().collect();
            let summary = summarize(&refs, 0.10);
            if refs.len() <= 5 {
                prop_assert_eq!(summary.trend, Trend::InsufficientData);
            } else {
                prop_assert!(summary.trend != Trend::InsufficientData);
            }
        }
    }
}
