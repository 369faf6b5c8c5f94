//! Single isolation tree
//!
//! Built by recursively partitioning samples on random features at random
//! thresholds until isolation, uniform samples, or the depth cap.

use crate::error::{MlError, MlResult};
use crate::node::{Node, NodeKind};
use crate::rng::Rng;
use crate::sample::Sample;

/// How many random features to try before giving up on a split
const SPLIT_ATTEMPTS: usize = 10;

/// Per-tree configuration
#[derive(Debug, Clone, Copy)]
pub struct TreeConfig {
    /// Depth cap; samples not isolated by then share a leaf
    pub max_depth: usize,
    /// Seed for split selection
    pub seed: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            seed: 42,
        }
    }
}

/// One tree of the forest
#[derive(Debug, Clone)]
pub struct IsolationTree {
    nodes: Vec<Node>,
    config: TreeConfig,
    rng: Rng,
}

impl IsolationTree {
    /// Create an empty tree
    pub fn new(config: TreeConfig) -> Self {
        Self {
            nodes: Vec::new(),
            config,
            rng: Rng::new(config.seed),
        }
    }

    /// Fit the tree to `samples`, replacing any previous structure
    pub fn fit(&mut self, samples: &[Sample]) -> MlResult<()> {
        if samples.is_empty() {
            return Err(MlError::InsufficientData);
        }

        self.nodes.clear();
        self.rng = Rng::new(self.config.seed);
        self.build(samples, 0);
        Ok(())
    }

    /// Recursively partition `samples`, returning the new subtree's root index
    fn build(&mut self, samples: &[Sample], depth: u8) -> u16 {
        let index = self.nodes.len() as u16;

        if depth as usize >= self.config.max_depth || samples.len() <= 1 || all_same(samples) {
            self.nodes.push(Node::leaf(samples.len() as u16, depth));
            return index;
        }

        let Some((feature, threshold)) = self.select_split(samples) else {
            // No feature with spread; stop partitioning here
            self.nodes.push(Node::leaf(samples.len() as u16, depth));
            return index;
        };

        let (left_set, right_set) = partition(samples, feature, threshold);
        if left_set.is_empty() || right_set.is_empty() {
            self.nodes.push(Node::leaf(samples.len() as u16, depth));
            return index;
        }

        // Reserve this slot; children are built first, then the split is
        // patched in with their indices.
        self.nodes.push(Node::leaf(0, depth));
        let left = self.build(&left_set, depth + 1);
        let right = self.build(&right_set, depth + 1);
        self.nodes[index as usize] = Node::split(feature, threshold, left, right, depth);

        index
    }

    /// Pick a random feature and threshold with actual spread
    fn select_split(&mut self, samples: &[Sample]) -> Option<(u8, f32)> {
        let num_features = samples[0].len();
        if num_features == 0 {
            return None;
        }

        for _ in 0..SPLIT_ATTEMPTS {
            let feature = self.rng.next_range(num_features) as u8;
            let (min_val, max_val) = feature_range(samples, feature as usize)?;

            if (max_val - min_val).abs() < f32::EPSILON {
                continue;
            }

            let threshold = self.rng.next_f32_range(min_val, max_val);
            return Some((feature, threshold));
        }

        None
    }

    /// Path length accumulated by `sample` through this tree
    pub fn path_length(&self, sample: &Sample) -> f32 {
        let mut index = 0usize;

        while let Some(node) = self.nodes.get(index) {
            match node.kind {
                NodeKind::Leaf { .. } => return node.leaf_path_length(),
                NodeKind::Split { .. } => match node.descend(sample) {
                    Some(next) if (next as usize) < self.nodes.len() => index = next as usize,
                    // Missing feature or corrupt index: terminate at this depth
                    _ => return node.depth as f32,
                },
            }
        }

        0.0
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest node
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth as usize).max().unwrap_or(0)
    }
}

/// True when every sample carries identical features
fn all_same(samples: &[Sample]) -> bool {
    match samples.split_first() {
        Some((first, rest)) => rest.iter().all(|s| s.as_slice() == first.as_slice()),
        None => true,
    }
}

/// Min/max of one feature across `samples`, `None` if any sample lacks it
fn feature_range(samples: &[Sample], feature: usize) -> Option<(f32, f32)> {
    let mut min_val = f32::INFINITY;
    let mut max_val = f32::NEG_INFINITY;

    for sample in samples {
        let value = sample.get(feature)?;
        min_val = min_val.min(value);
        max_val = max_val.max(value);
    }

    Some((min_val, max_val))
}

/// Split `samples` on `feature < threshold`
fn partition(samples: &[Sample], feature: u8, threshold: f32) -> (Vec<Sample>, Vec<Sample>) {
    let mut left = Vec::new();
    let mut right = Vec::new();

    for &sample in samples {
        if let Some(value) = sample.get(feature as usize) {
            if value < threshold {
                left.push(sample);
            } else {
                right.push(sample);
            }
        }
    }

    (left, right)
}
