//! Isolation forest
//!
//! Combines independently seeded trees over random subsamples and exposes the
//! signed decision score the engine alerts on.

use serde::{Deserialize, Serialize};

use crate::error::{MlError, MlResult};
use crate::rng::Rng;
use crate::sample::Sample;
use crate::scoring::{isolation_measure, percentile, AnomalyScore};
use crate::tree::{IsolationTree, TreeConfig};

/// Forest configuration
///
/// Defaults mirror the reference model library the monitoring system was
/// tuned against: 100 trees over subsamples of up to 256 points, depth capped
/// at `ceil(log2(256))`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees
    pub num_trees: usize,
    /// Per-tree subsample size (capped at the training-set size)
    pub sample_size: usize,
    /// Depth cap per tree
    pub max_depth: usize,
    /// Base seed; each tree perturbs it
    pub seed: u32,
    /// Expected fraction of outliers in training data, in (0, 0.5]
    ///
    /// Sets the decision offset: the contamination percentile of training
    /// scores becomes the zero line.
    pub contamination: f32,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            sample_size: 256,
            max_depth: 8,
            seed: 42,
            contamination: 0.05,
        }
    }
}

/// Isolation forest with a fitted decision offset
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    config: ForestConfig,
    rng: Rng,
    /// Per-tree subsample size actually used, for path normalization
    subsample_size: usize,
    /// Contamination percentile of training scores
    offset: f32,
}

impl IsolationForest {
    /// Create an unfitted forest
    pub fn new(config: ForestConfig) -> Self {
        let seed = config.seed;
        Self {
            trees: Vec::new(),
            config,
            rng: Rng::new(seed),
            subsample_size: 0,
            offset: 0.0,
        }
    }

    /// Fit the forest and its decision offset to `samples`
    pub fn fit(&mut self, samples: &[Sample]) -> MlResult<()> {
        if samples.is_empty() {
            return Err(MlError::InsufficientData);
        }
        if !(0.0..=0.5).contains(&self.config.contamination) || self.config.contamination == 0.0 {
            return Err(MlError::InvalidConfig("contamination must be in (0, 0.5]"));
        }
        if self.config.num_trees == 0 {
            return Err(MlError::InvalidConfig("num_trees must be at least 1"));
        }

        self.trees.clear();
        self.rng = Rng::new(self.config.seed);
        self.subsample_size = self.config.sample_size.min(samples.len()).max(1);

        for i in 0..self.config.num_trees {
            let tree_config = TreeConfig {
                max_depth: self.config.max_depth,
                seed: self.config.seed.wrapping_add(i as u32),
            };

            let subset = self.subsample(samples);
            let mut tree = IsolationTree::new(tree_config);
            tree.fit(&subset)?;
            self.trees.push(tree);
        }

        // Anchor the decision zero line at the contamination percentile of
        // the training scores, so `decision < 0` marks the expected outlier
        // fraction of the data the model was fitted on.
        let mut training_scores: Vec<f32> =
            samples.iter().map(|s| -self.measure(s)).collect();
        self.offset = percentile(&mut training_scores, self.config.contamination * 100.0);

        Ok(())
    }

    /// Random subsample without replacement, up to `sample_size` points
    fn subsample(&mut self, samples: &[Sample]) -> Vec<Sample> {
        let take = self.subsample_size.min(samples.len());
        if take >= samples.len() {
            return samples.to_vec();
        }

        // Partial Fisher-Yates over indices
        let mut indices: Vec<usize> = (0..samples.len()).collect();
        for i in 0..take {
            let j = i + self.rng.next_range(samples.len() - i);
            indices.swap(i, j);
        }

        indices[..take].iter().map(|&i| samples[i]).collect()
    }

    /// Raw isolation measure `s` in (0, 1]; 0.5 before fitting
    pub fn measure(&self, sample: &Sample) -> f32 {
        if self.trees.is_empty() {
            return 0.5;
        }

        let total: f32 = self.trees.iter().map(|t| t.path_length(sample)).sum();
        let avg_path = total / self.trees.len() as f32;

        isolation_measure(avg_path, self.subsample_size)
    }

    /// Signed decision score: `-measure - offset`
    ///
    /// More negative = stronger outlier; in-distribution points land near or
    /// above zero.
    pub fn decision_function(&self, sample: &Sample) -> f32 {
        -self.measure(sample) - self.offset
    }

    /// Full scoring outcome for one sample
    pub fn score(&self, sample: &Sample) -> AnomalyScore {
        let measure = self.measure(sample);
        AnomalyScore {
            decision: -measure - self.offset,
            measure,
            num_trees: self.trees.len(),
        }
    }

    /// True once `fit` has succeeded
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Forest shape summary
    pub fn stats(&self) -> ForestStats {
        ForestStats {
            num_trees: self.trees.len(),
            total_nodes: self.trees.iter().map(|t| t.node_count()).sum(),
            max_depth: self.trees.iter().map(|t| t.depth()).max().unwrap_or(0),
            subsample_size: self.subsample_size,
            offset: self.offset,
        }
    }
}

/// Shape and fit summary for diagnostics
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ForestStats {
    /// Trees in the forest
    pub num_trees: usize,
    /// Nodes across all trees
    pub total_nodes: usize,
    /// Deepest node across all trees
    pub max_depth: usize,
    /// Per-tree subsample size used at fit time
    pub subsample_size: usize,
    /// Fitted decision offset
    pub offset: f32,
}
