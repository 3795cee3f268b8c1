//! PureSVD recommender
//!
//! Factorizes the ratings matrix with a truncated singular value
//! decomposition and keeps the product latent factors (the leading right
//! singular vectors). A user is projected into the latent space by
//! multiplying their ratings with the factor matrix, and each product is
//! scored by the inner product of that projection with its own factors.

use crate::core::{RatingsMatrix, RecError, Result, ScoringStrategy};
use log::debug;
use nalgebra::{DMatrix, DVector, SVD};
use rand::RngCore;

/// Truncated SVD scoring strategy with a fixed number of latent factors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PureSvd {
    n_factors: usize,
}

/// Product latent factors, one row per product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFactors {
    matrix: DMatrix<f64>,
}

impl ProductFactors {
    /// The n_products x n_factors factor matrix
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Number of latent factors
    pub fn n_factors(&self) -> usize {
        self.matrix.ncols()
    }

    /// Project a user's ratings into the latent space (1 x k)
    pub fn user_factors(&self, user_ratings: &[u32]) -> DVector<f64> {
        let ratings = DVector::from_iterator(
            user_ratings.len(),
            user_ratings.iter().map(|&r| f64::from(r)),
        );
        self.matrix.tr_mul(&ratings)
    }
}

impl PureSvd {
    /// Create a PureSVD strategy with `n_factors` latent factors
    pub fn new(n_factors: usize) -> Self {
        Self { n_factors }
    }

    /// Number of latent factors
    pub fn n_factors(&self) -> usize {
        self.n_factors
    }

    /// Compute the rank-k product factor matrix of `ratings`
    ///
    /// `k` must satisfy `1 <= k <= min(n_users, n_products) - 1`.
    ///
    /// The decomposition runs on a dense copy of the whole matrix, so memory
    /// grows with `n_users * n_products` and time with the full SVD.
    pub fn factorize(&self, ratings: &RatingsMatrix) -> Result<ProductFactors> {
        let max = ratings.n_users().min(ratings.n_products()).saturating_sub(1);
        if self.n_factors == 0 || self.n_factors > max {
            return Err(RecError::DimensionalityError {
                requested: self.n_factors,
                max,
            });
        }

        let svd = SVD::new(ratings.to_dense(), false, true);
        let v_t = svd.v_t.ok_or_else(|| {
            RecError::InvalidParameter("SVD failed to compute right singular vectors".to_string())
        })?;

        let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
        order.sort_by(|&a, &b| {
            svd.singular_values[b]
                .total_cmp(&svd.singular_values[a])
                .then_with(|| a.cmp(&b))
        });
        order.truncate(self.n_factors);

        let matrix = DMatrix::from_fn(ratings.n_products(), self.n_factors, |product, factor| {
            v_t[(order[factor], product)]
        });

        debug!(
            "Truncated SVD kept {} of {} singular values (smallest kept: {:.6})",
            self.n_factors,
            svd.singular_values.len(),
            order
                .last()
                .map_or(0.0, |&i| svd.singular_values[i])
        );

        Ok(ProductFactors { matrix })
    }
}

impl ScoringStrategy for PureSvd {
    type Trained = ProductFactors;

    fn name(&self) -> &'static str {
        "svd"
    }

    fn train(&self, ratings: &RatingsMatrix) -> Result<ProductFactors> {
        self.factorize(ratings)
    }

    fn score(
        &self,
        trained: &ProductFactors,
        user_ratings: &[u32],
        include: &[usize],
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<f64>> {
        let user = trained.user_factors(user_ratings);
        Ok(include
            .iter()
            .map(|&product| {
                trained
                    .matrix
                    .row(product)
                    .iter()
                    .zip(user.iter())
                    .map(|(p, u)| p * u)
                    .sum::<f64>()
            })
            .collect())
    }

    fn def_when_trained(&self) -> &'static [&'static str] {
        &["product_factors"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::Recommender;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Rank-2 dense matrix: row = a * [1, 2, 3, 4] + b * [4, 3, 2, 1]
    fn rank_two_ratings() -> Vec<Vec<u32>> {
        [(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)]
            .iter()
            .map(|&(a, b)| (0..4).map(|j| a * (j + 1) + b * (4 - j)).collect())
            .collect()
    }

    #[test]
    fn test_factor_shape() {
        let ratings = RatingsMatrix::from_dense(&rank_two_ratings()).expect("valid");
        let factors = PureSvd::new(2).factorize(&ratings).expect("factorize");

        assert_eq!(factors.matrix().nrows(), 4);
        assert_eq!(factors.n_factors(), 2);
    }

    #[test]
    fn test_factors_are_orthonormal() {
        let ratings = RatingsMatrix::from_dense(&rank_two_ratings()).expect("valid");
        let factors = PureSvd::new(2).factorize(&ratings).expect("factorize");

        let gram = factors.matrix().tr_mul(factors.matrix());
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(gram[(i, j)], expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_too_many_factors() {
        let ratings = RatingsMatrix::from_dense(&rank_two_ratings()).expect("valid");

        for k in [0, 4, 5] {
            let err = PureSvd::new(k).factorize(&ratings).expect_err("invalid k");
            assert!(matches!(
                err,
                RecError::DimensionalityError { requested, max: 3 } if requested == k
            ));
        }
    }

    #[test]
    fn test_dimensionality_error_surfaces_through_fit() {
        let ratings = RatingsMatrix::from_dense(&rank_two_ratings()).expect("valid");
        let mut rec = Recommender::new(PureSvd::new(10));

        assert!(matches!(
            rec.fit(&ratings),
            Err(RecError::DimensionalityError { .. })
        ));
        assert!(!rec.is_fitted());
    }

    #[test]
    fn test_reconstruction_with_full_usable_rank() {
        let rows = rank_two_ratings();
        let ratings = RatingsMatrix::from_dense(&rows).expect("valid");
        let mut rec = Recommender::new(PureSvd::new(3));
        rec.fit(&ratings).expect("fit should succeed");
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        for row in &rows {
            let scores = rec.score(row, &[0, 1, 2, 3], &mut rng).expect("score");
            for (score, &rating) in scores.iter().zip(row) {
                assert_abs_diff_eq!(*score, f64::from(rating), epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_five_by_four_scenario() {
        let rows = vec![
            vec![5, 3, 1, 1],
            vec![4, 1, 2, 1],
            vec![1, 1, 5, 4],
            vec![2, 1, 4, 5],
            vec![3, 5, 2, 2],
        ];
        let ratings = RatingsMatrix::from_dense(&rows).expect("valid");
        let mut rec = Recommender::new(PureSvd::new(2));
        rec.fit(&ratings).expect("fit should succeed");
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let scores = rec.score(&rows[0], &[0, 1, 2, 3], &mut rng).expect("score");
        assert_eq!(scores.len(), 4);
        assert!(scores.iter().all(|s| s.is_finite()));

        let top = rec.recommend(&rows[0], 2, &[], &mut rng).expect("recommend");
        assert_eq!(top.len(), 2);
        assert_ne!(top[0], top[1]);
        assert!(top.iter().all(|&p| p < 4));
    }

    #[test]
    fn test_score_follows_include_order() {
        let rows = rank_two_ratings();
        let ratings = RatingsMatrix::from_dense(&rows).expect("valid");
        let mut rec = Recommender::new(PureSvd::new(2));
        rec.fit(&ratings).expect("fit should succeed");
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let forward = rec.score(&rows[2], &[0, 3], &mut rng).expect("score");
        let backward = rec.score(&rows[2], &[3, 0], &mut rng).expect("score");
        assert_abs_diff_eq!(forward[0], backward[1], epsilon = 1e-12);
        assert_abs_diff_eq!(forward[1], backward[0], epsilon = 1e-12);
    }
}
