//! Seeded k-fold partitioning

use crate::core::{RecError, Result};
use rand::seq::SliceRandom;
use rand::RngCore;

/// K-fold splitter over sample positions
///
/// Positions are shuffled once with the supplied random stream and then cut
/// into `n_splits` contiguous folds. The first `n % n_splits` folds hold one
/// extra element, so fold sizes differ by at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KFold {
    n_splits: usize,
}

impl KFold {
    /// Create a splitter with `n_splits` folds
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    /// Number of folds
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Partition `0..n_samples` into disjoint test folds
    ///
    /// Every position appears in exactly one fold. The training set of a fold
    /// is the complement of its test set.
    pub fn split(&self, n_samples: usize, rng: &mut dyn RngCore) -> Result<Vec<Vec<usize>>> {
        if self.n_splits < 2 {
            return Err(RecError::InvalidParameter(format!(
                "Number of folds must be at least 2, got: {}",
                self.n_splits
            )));
        }
        if self.n_splits > n_samples {
            return Err(RecError::InvalidParameter(format!(
                "Cannot split {n_samples} users into {} folds",
                self.n_splits
            )));
        }

        let mut positions: Vec<usize> = (0..n_samples).collect();
        positions.shuffle(rng);

        let base = n_samples / self.n_splits;
        let extra = n_samples % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;

        for fold in 0..self.n_splits {
            let size = base + usize::from(fold < extra);
            folds.push(positions[start..start + size].to_vec());
            start += size;
        }

        Ok(folds)
    }
}
