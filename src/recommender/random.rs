//! Random baseline recommender

use crate::core::{RatingsMatrix, Result, ScoringStrategy};
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;

/// Scores every product with an independent standard normal draw
///
/// Ignores the user's ratings and needs no trained state, so it is fitted as
/// soon as the catalogue size is known. Serves as a lower bound when
/// comparing recommenders.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomScores;

impl RandomScores {
    /// Create a new random baseline
    pub fn new() -> Self {
        Self
    }
}

impl ScoringStrategy for RandomScores {
    type Trained = ();

    fn name(&self) -> &'static str {
        "random"
    }

    fn train(&self, _ratings: &RatingsMatrix) -> Result<()> {
        Ok(())
    }

    fn score(
        &self,
        _trained: &(),
        _user_ratings: &[u32],
        include: &[usize],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>> {
        Ok(include
            .iter()
            .map(|_| rng.sample::<f64, _>(StandardNormal))
            .collect())
    }

    fn def_when_trained(&self) -> &'static [&'static str] {
        &[]
    }
}
