//! Utility functions for ratings data

use crate::core::RatingsMatrix;
use serde::Serialize;

/// Statistical utilities for ratings matrices
pub mod stats {
    use super::*;
    use std::collections::BTreeMap;

    /// Calculate per-user and global statistics of a ratings matrix
    pub fn ratings_stats(ratings: &RatingsMatrix) -> RatingsStats {
        let n_users = ratings.n_users();
        if n_users == 0 {
            return RatingsStats {
                n_products: ratings.n_products(),
                ..RatingsStats::default()
            };
        }

        let per_user: Vec<usize> = (0..n_users).map(|u| ratings.row(u).count()).collect();
        let total: usize = per_user.iter().sum();
        let mean = total as f64 / n_users as f64;

        let variance = if n_users > 1 {
            per_user
                .iter()
                .map(|&x| (x as f64 - mean).powi(2))
                .sum::<f64>()
                / (n_users - 1) as f64
        } else {
            0.0
        };

        let cells = n_users * ratings.n_products();
        let density = if cells == 0 {
            0.0
        } else {
            total as f64 / cells as f64
        };

        RatingsStats {
            n_users,
            n_products: ratings.n_products(),
            n_ratings: total,
            density,
            mean_ratings_per_user: mean,
            min_ratings_per_user: per_user.iter().copied().min().unwrap_or(0),
            max_ratings_per_user: per_user.iter().copied().max().unwrap_or(0),
            variance_ratings_per_user: variance,
            rating_histogram: rating_histogram(ratings),
        }
    }

    /// Number of ratings per rating value
    pub fn rating_histogram(ratings: &RatingsMatrix) -> BTreeMap<u32, usize> {
        let mut histogram = BTreeMap::new();
        for user in 0..ratings.n_users() {
            for (_, rating) in ratings.row(user) {
                *histogram.entry(rating).or_insert(0) += 1;
            }
        }
        histogram
    }
}

/// Checks of evaluation settings against the data
pub mod validation {
    use super::*;

    /// Smallest number of unrated products of any user in `users`
    ///
    /// A hit test on a user rated product can draw at most this many
    /// negatives. Returns `None` when `users` is empty.
    pub fn min_unrated(ratings: &RatingsMatrix, users: &[usize]) -> Option<usize> {
        users
            .iter()
            .filter(|&&u| u < ratings.n_users())
            .map(|&u| ratings.n_products() - ratings.row(u).count())
            .min()
    }

    /// Number of users with at least one rating at or above `threshold`
    pub fn users_with_targets(ratings: &RatingsMatrix, threshold: u32) -> usize {
        (0..ratings.n_users())
            .filter(|&u| ratings.row(u).any(|(_, r)| r >= threshold))
            .count()
    }
}

/// Statistics of a ratings matrix
#[derive(Debug, Clone, Default, Serialize)]
pub struct RatingsStats {
    pub n_users: usize,
    pub n_products: usize,
    pub n_ratings: usize,
    /// Fraction of rated cells
    pub density: f64,
    pub mean_ratings_per_user: f64,
    pub min_ratings_per_user: usize,
    pub max_ratings_per_user: usize,
    pub variance_ratings_per_user: f64,
    pub rating_histogram: std::collections::BTreeMap<u32, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> RatingsMatrix {
        RatingsMatrix::from_dense(&[vec![5, 0, 3, 0], vec![0, 0, 0, 1], vec![4, 5, 3, 0]])
            .expect("valid ratings")
    }

    #[test]
    fn test_ratings_stats() {
        let s = stats::ratings_stats(&matrix());

        assert_eq!(s.n_users, 3);
        assert_eq!(s.n_products, 4);
        assert_eq!(s.n_ratings, 6);
        assert_eq!(s.density, 0.5);
        assert_eq!(s.mean_ratings_per_user, 2.0);
        assert_eq!(s.min_ratings_per_user, 1);
        assert_eq!(s.max_ratings_per_user, 3);
        assert_eq!(s.variance_ratings_per_user, 1.0);
    }

    #[test]
    fn test_ratings_stats_empty() {
        let empty = RatingsMatrix::from_triplets(0, 5, &[]).expect("valid");
        let s = stats::ratings_stats(&empty);

        assert_eq!(s.n_users, 0);
        assert_eq!(s.n_products, 5);
        assert_eq!(s.density, 0.0);
    }

    #[test]
    fn test_rating_histogram() {
        let histogram = stats::rating_histogram(&matrix());

        assert_eq!(histogram.get(&5), Some(&2));
        assert_eq!(histogram.get(&3), Some(&2));
        assert_eq!(histogram.get(&1), Some(&1));
        assert_eq!(histogram.get(&2), None);
    }

    #[test]
    fn test_min_unrated() {
        let m = matrix();

        assert_eq!(validation::min_unrated(&m, &[0, 1, 2]), Some(1));
        assert_eq!(validation::min_unrated(&m, &[1]), Some(3));
        assert_eq!(validation::min_unrated(&m, &[]), None);
    }

    #[test]
    fn test_users_with_targets() {
        let m = matrix();

        assert_eq!(validation::users_with_targets(&m, 1), 3);
        assert_eq!(validation::users_with_targets(&m, 4), 2);
        assert_eq!(validation::users_with_targets(&m, 6), 0);
    }
}
