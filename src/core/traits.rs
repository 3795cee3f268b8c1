//! Core traits for recommender implementations

use crate::core::{RatingsMatrix, Result};
use rand::RngCore;

/// Variant-specific half of a recommender
///
/// A strategy knows how to turn a ratings matrix into trained state and how
/// to score products from that state. Fitted-state bookkeeping, product
/// filtering and top-N selection are shared and live in
/// [`Recommender`](crate::recommender::Recommender).
pub trait ScoringStrategy {
    /// State produced by training
    type Trained;

    /// Short identifier used in logs and reports
    fn name(&self) -> &'static str;

    /// Train on a users x products ratings matrix
    ///
    /// Called on every fit; the returned state fully replaces any previous one.
    fn train(&self, ratings: &RatingsMatrix) -> Result<Self::Trained>;

    /// Score every product in `include`, in the same order
    ///
    /// `user_ratings` has one entry per product, zero meaning unrated.
    fn score(
        &self,
        trained: &Self::Trained,
        user_ratings: &[u32],
        include: &[usize],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>>;

    /// Names of the trained attributes that must exist for a fitted model
    fn def_when_trained(&self) -> &'static [&'static str];
}
