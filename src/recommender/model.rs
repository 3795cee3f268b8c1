//! Fitted-state wrapper shared by every recommender
//!
//! A [`Recommender`] is either unfitted or fitted. Fitting records the
//! number of products and stores whatever the strategy's training produced;
//! scoring and recommendation go through [`Recommender::check_fitted`] and
//! fail with [`RecError::NotFitted`] before that.

use crate::core::{RatingsMatrix, RecError, Result, ScoringStrategy};
use crate::recommender::select::top_n;
use log::debug;
use rand::RngCore;

/// Training outcome of a recommender
#[derive(Debug, Clone)]
pub enum FitState<T> {
    /// No successful fit yet, or the last fit failed
    Unfitted,
    /// Trained state together with the catalogue size it was trained on
    Fitted { n_products: usize, trained: T },
}

/// A recommender built from a scoring strategy
pub struct Recommender<S: ScoringStrategy> {
    strategy: S,
    state: FitState<S::Trained>,
    /// Catalogue size recorded by the first fit
    catalogue: Option<usize>,
}

impl<S: ScoringStrategy> Recommender<S> {
    /// Create an unfitted recommender
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            state: FitState::Unfitted,
            catalogue: None,
        }
    }

    /// Get the scoring strategy
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Get the current fit state
    pub fn state(&self) -> &FitState<S::Trained> {
        &self.state
    }

    /// Number of products seen at fit time, if fitted
    pub fn n_products(&self) -> Option<usize> {
        match &self.state {
            FitState::Fitted { n_products, .. } => Some(*n_products),
            FitState::Unfitted => None,
        }
    }

    /// Check whether the recommender has been fitted
    pub fn is_fitted(&self) -> bool {
        matches!(self.state, FitState::Fitted { .. })
    }

    /// Record the catalogue size and train the strategy
    ///
    /// Can be called repeatedly; every call replaces the trained state. The
    /// product count is fixed by the first successful call and later fits on
    /// a matrix with a different number of columns are rejected. If training
    /// fails the recommender is left unfitted and no product count is kept
    /// from that attempt.
    pub fn fit(&mut self, ratings: &RatingsMatrix) -> Result<()> {
        let n_products = ratings.n_products();
        if let Some(expected) = self.catalogue {
            if expected != n_products {
                return Err(RecError::DimensionMismatch {
                    expected,
                    actual: n_products,
                });
            }
        }

        self.state = FitState::Unfitted;
        let trained = self.strategy.train(ratings)?;
        self.catalogue = Some(n_products);
        self.state = FitState::Fitted {
            n_products,
            trained,
        };

        debug!(
            "Fitted {} recommender on {} users x {} products ({} ratings)",
            self.strategy.name(),
            ratings.n_users(),
            n_products,
            ratings.nnz()
        );
        Ok(())
    }

    /// Return the catalogue size and trained state, or fail with `NotFitted`
    pub fn check_fitted(&self) -> Result<(usize, &S::Trained)> {
        match &self.state {
            FitState::Fitted {
                n_products,
                trained,
            } => Ok((*n_products, trained)),
            FitState::Unfitted => {
                let mut required: Vec<&str> = self.strategy.def_when_trained().to_vec();
                required.push("n_products");
                Err(RecError::NotFitted(required.join(", ")))
            }
        }
    }

    /// Score each product of `include` for a user, in the same order
    pub fn score(
        &self,
        user_ratings: &[u32],
        include: &[usize],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>> {
        let (n_products, trained) = self.check_fitted()?;
        check_user_ratings(user_ratings, n_products)?;

        if let Some(&product) = include.iter().find(|&&p| p >= n_products) {
            return Err(RecError::InvalidParameter(format!(
                "Product index {product} out of range for {n_products} products"
            )));
        }

        let scores = self.strategy.score(trained, user_ratings, include, rng)?;
        if scores.len() != include.len() {
            return Err(RecError::DimensionMismatch {
                expected: include.len(),
                actual: scores.len(),
            });
        }
        Ok(scores)
    }

    /// Recommend up to `n` products, best first, never one from `exclude`
    ///
    /// Excluded indices outside the catalogue are ignored. Equal scores are
    /// ordered by ascending product index.
    pub fn recommend(
        &self,
        user_ratings: &[u32],
        n: usize,
        exclude: &[usize],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>> {
        let (n_products, _) = self.check_fitted()?;

        let mut excluded = vec![false; n_products];
        for &product in exclude {
            if let Some(flag) = excluded.get_mut(product) {
                *flag = true;
            }
        }
        let include: Vec<usize> = (0..n_products).filter(|&p| !excluded[p]).collect();

        let scores = self.score(user_ratings, &include, rng)?;
        Ok(top_n(&include, &scores, n))
    }
}

fn check_user_ratings(user_ratings: &[u32], n_products: usize) -> Result<()> {
    if user_ratings.len() != n_products {
        return Err(RecError::DimensionMismatch {
            expected: n_products,
            actual: user_ratings.len(),
        });
    }
    Ok(())
}
