//! Isolation-forest outlier scoring for sensor feature vectors
//!
//! ## Overview
//!
//! This crate implements the anomaly model behind FiberWatch's streaming
//! analysis engine: an isolation forest that is fitted once per location on a
//! short window of historical readings and then scores every subsequent
//! reading's feature vector.
//!
//! ## Why Isolation Forest?
//!
//! 1. **Low Memory**: Only stores tree structures, not training data
//! 2. **Fast Inference**: O(log n) per prediction
//! 3. **Unsupervised**: No labeled data required
//! 4. **Interpretable**: Scores have a direct path-length meaning
//!
//! ## Algorithm Overview
//!
//! The forest isolates outliers by randomly partitioning the feature space:
//! points in sparse regions are separated in a handful of splits, points in
//! dense regions need many.
//!
//! ```text
//! isolation measure: s = 2^(-E(h(x)) / c(n))     s in (0, 1]
//! decision score:    d = -s - offset             more negative = stronger outlier
//! ```
//!
//! where `E(h(x))` is the expected path length across trees, `c(n)` the
//! average path length of an unsuccessful BST search over `n` points, and
//! `offset` the contamination percentile of the training scores. The signed
//! decision score matches the convention of the reference model library the
//! monitoring system was originally tuned against, so alert cutoffs keep
//! their meaning.
//!
//! ## Usage
//!
//! ```
//! use fiberwatch_ml::{ForestConfig, IsolationForest, Sample};
//!
//! let mut forest = IsolationForest::new(ForestConfig::default());
//!
//! let samples: Vec<Sample> = (0..60)
//!     .map(|i| Sample::new(&[0.2 + i as f32 * 0.001, 22.0, 45.0, 101.3]).unwrap())
//!     .collect();
//! forest.fit(&samples).unwrap();
//!
//! let probe = Sample::new(&[4.0, 60.0, 5.0, 80.0]).unwrap();
//! let score = forest.score(&probe);
//! if score.is_outlier(-0.5) {
//!     // investigate
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod forest;
pub mod node;
pub mod rng;
pub mod sample;
pub mod scoring;
pub mod tree;

pub use error::{MlError, MlResult};
pub use forest::{ForestConfig, IsolationForest};
pub use sample::Sample;
pub use scoring::AnomalyScore;
pub use tree::{IsolationTree, TreeConfig};
