//! Per-location anomaly-model lifecycle
//!
//! Each location owns one detector that moves `Untrained → Trained` the
//! moment its buffer first reaches the warm-up size: the model is fitted on
//! the location's latest training window and the triggering reading is scored
//! against it in the same step. With the default configuration the model is
//! never refitted; setting `retrain_every` refits on the location's most
//! recent window after that many further readings, so the model tracks
//! drifting conditions instead of freezing on its first fifty readings.

use fiberwatch_ml::{AnomalyScore, IsolationForest, Sample};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::events::SensorReading;

/// One-way training lifecycle
#[derive(Debug)]
enum ModelState {
    Untrained,
    Trained(IsolationForest),
}

/// Anomaly detector owned by a single location
#[derive(Debug)]
pub struct LocationDetector {
    state: ModelState,
    /// Readings observed since the last fit
    since_fit: u32,
    /// Completed fits, for diagnostics and the train-once guarantee
    fits: u32,
}

impl LocationDetector {
    /// Create untrained
    pub fn new() -> Self {
        Self {
            state: ModelState::Untrained,
            since_fit: 0,
            fits: 0,
        }
    }

    /// True once the location's model has been fitted
    pub fn is_trained(&self) -> bool {
        matches!(self.state, ModelState::Trained(_))
    }

    /// Number of completed fits
    pub fn times_fitted(&self) -> u32 {
        self.fits
    }

    /// Advance the lifecycle for one incoming reading and score it
    ///
    /// `history` is the location's retained readings oldest first, the
    /// incoming reading last. Returns `None` while the location is below the
    /// warm-up size; otherwise fits if the lifecycle calls for it and scores
    /// the newest reading.
    pub fn observe(
        &mut self,
        history: &[&SensorReading],
        config: &EngineConfig,
    ) -> EngineResult<Option<AnomalyScore>> {
        if history.len() < config.warmup_size {
            return Ok(None);
        }

        let needs_fit = match &self.state {
            ModelState::Untrained => true,
            ModelState::Trained(_) => config
                .retrain_every
                .map_or(false, |every| self.since_fit >= every),
        };

        if needs_fit {
            self.fit(history, config)?;
        } else {
            self.since_fit += 1;
        }

        let Some(newest) = history.last() else {
            return Ok(None);
        };
        let sample = Sample::new(&newest.features())?;

        match &self.state {
            ModelState::Trained(forest) => Ok(Some(forest.score(&sample))),
            // fit() either succeeded or returned early above
            ModelState::Untrained => Ok(None),
        }
    }

    /// Fit on the latest training window of `history`
    fn fit(&mut self, history: &[&SensorReading], config: &EngineConfig) -> EngineResult<()> {
        let start = history.len().saturating_sub(config.training_window);
        let samples: Vec<Sample> = history[start..]
            .iter()
            .map(|r| Sample::new(&r.features()))
            .collect::<Result<_, _>>()?;

        let mut forest = IsolationForest::new(config.forest.clone());
        forest.fit(&samples)?;

        log::debug!(
            "anomaly model fitted on {} readings (fit #{})",
            samples.len(),
            self.fits + 1
        );

        self.state = ModelState::Trained(forest);
        self.since_fit = 0;
        self.fits += 1;
        Ok(())
    }
}

impl Default for LocationDetector {
    fn default() -> Self {
        Self::new()
    }
}
