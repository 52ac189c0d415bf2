//! K-nearest-neighbor face classification.
//!
//! [`Knn`] compares a query against *every* row of the [`TrainingMatrix`], so a query costs
//! `O(N·D)` for `N` training rows of dimension `D` (30 000 for 100x100 RGB samples). This is fine
//! for a handful of enrolled persons, but it bounds the recognition frame rate as the gallery
//! grows.

use std::collections::BTreeMap;

use ndarray::ArrayView1;

use crate::dataset::{PersonId, TrainingMatrix};
use crate::{Error, Result};

/// A distance function between two feature vectors.
pub trait Metric {
    fn distance(&self, a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f64;
}

/// Euclidean (L2) distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Metric for Euclidean {
    fn distance(&self, a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(&a, &b)| {
                let d = f64::from(a) - f64::from(b);
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

/// Trait for classifiers that map a feature vector to a [`PersonId`].
pub trait Classifier {
    fn classify(&self, training: &TrainingMatrix, query: ArrayView1<'_, f32>) -> Result<PersonId>;
}

/// K-nearest-neighbor majority vote.
///
/// Neighbors at equal distance are ranked by their row order in the [`TrainingMatrix`]. If
/// several labels receive the same number of votes, the lowest [`PersonId`] wins.
#[derive(Debug, Clone)]
pub struct Knn<M: Metric = Euclidean> {
    k: usize,
    metric: M,
}

impl Knn {
    /// Creates a classifier voting among the `k` nearest neighbors by [`Euclidean`] distance.
    ///
    /// # Panics
    ///
    /// Panics if `k` is 0.
    pub fn new(k: usize) -> Self {
        Self::with_metric(k, Euclidean)
    }
}

impl<M: Metric> Knn<M> {
    pub fn with_metric(k: usize, metric: M) -> Self {
        assert!(k > 0, "k must be at least 1");
        Self { k, metric }
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

impl<M: Metric> Classifier for Knn<M> {
    fn classify(&self, training: &TrainingMatrix, query: ArrayView1<'_, f32>) -> Result<PersonId> {
        if training.is_empty() {
            return Err(Error::EmptyTrainingSet);
        }
        if query.len() != training.feature_dim() {
            return Err(Error::DimensionMismatch {
                expected: training.feature_dim(),
                found: query.len(),
            });
        }

        let mut distances = training
            .iter()
            .map(|(features, label)| (self.metric.distance(features, query), label))
            .collect::<Vec<_>>();
        // `sort_by` is stable, which keeps equidistant rows in matrix order.
        distances.sort_by(|(a, _), (b, _)| a.total_cmp(b));

        let mut votes = BTreeMap::<PersonId, usize>::new();
        for &(_, label) in distances.iter().take(self.k) {
            *votes.entry(label).or_default() += 1;
        }

        // Ascending iteration + strict comparison: the lowest id wins ties.
        let mut best = None;
        for (&label, &count) in &votes {
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((label, count)),
            }
        }

        let (label, count) = best.ok_or(Error::EmptyTrainingSet)?;
        log::trace!("knn: {label} with {count}/{} votes", self.k.min(distances.len()));
        Ok(label)
    }
}
