//! Cross-validated sampled recall
//!
//! Users are split into folds. For each fold the recommender is trained from
//! scratch on every other user's ratings, then each held-out user's
//! sufficiently high ratings are hit-tested one at a time against a sample
//! of unrated products. The per-fold hit ratio is averaged over all folds.

use crate::core::{RatingsMatrix, RecError, Result, ScoringStrategy};
use crate::evaluation::{is_hit, KFold};
use crate::recommender::Recommender;
use log::{debug, info};
use rand::seq::index;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Configuration for a cross-validated recall run
#[derive(Debug, Clone, PartialEq)]
pub struct RecallConfig {
    /// Minimum rating for a product to be used as a test target
    pub test_rating_threshold: u32,
    /// Unrated products ranked alongside each test target
    pub negatives_per_test: usize,
    /// Length of the recommendation list checked for a hit
    pub top_n: usize,
    /// Number of folds
    pub n_folds: usize,
    /// Seed of the single random stream used by the whole run
    pub seed: u64,
    /// Report fold progress at info level
    pub verbose: bool,
    /// Upper bound on hit tests per user
    ///
    /// Larger sets are subsampled uniformly without replacement, so a product
    /// is never tested twice for the same user.
    pub max_tests_per_user: usize,
}

impl RecallConfig {
    /// Create a configuration with 10 folds, seed 0 and 50 tests per user
    pub fn new(test_rating_threshold: u32, negatives_per_test: usize, top_n: usize) -> Self {
        Self {
            test_rating_threshold,
            negatives_per_test,
            top_n,
            n_folds: 10,
            seed: 0,
            verbose: false,
            max_tests_per_user: 50,
        }
    }

    /// Set the number of folds
    pub fn with_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable fold progress reporting
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the per-user cap on hit tests
    pub fn with_max_tests_per_user(mut self, max_tests_per_user: usize) -> Self {
        self.max_tests_per_user = max_tests_per_user;
        self
    }
}

/// Outcome of one fold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldRecall {
    pub fold: usize,
    pub test_users: usize,
    pub tests: usize,
    pub hits: usize,
    /// hits / tests, or 0 when the fold ran no test
    pub recall: f64,
}

/// Outcome of a full cross-validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecallReport {
    pub recommender: String,
    pub folds: Vec<FoldRecall>,
    /// Sum of fold recalls divided by the number of folds
    pub mean_recall: f64,
}

impl RecallReport {
    /// Total number of hit tests across folds
    pub fn total_tests(&self) -> usize {
        self.folds.iter().map(|f| f.tests).sum()
    }

    /// Total number of hits across folds
    pub fn total_hits(&self) -> usize {
        self.folds.iter().map(|f| f.hits).sum()
    }
}

/// Average sampled recall of `recommender` over a k-fold split of users
///
/// See [`cross_validate_recall`] for the per-fold breakdown.
pub fn average_recall<S: ScoringStrategy>(
    recommender: &mut Recommender<S>,
    ratings: &RatingsMatrix,
    config: &RecallConfig,
    users: Option<&[usize]>,
) -> Result<f64> {
    cross_validate_recall(recommender, ratings, config, users).map(|report| report.mean_recall)
}

/// Run the cross-validated hit tests and report every fold
///
/// `users` restricts the users that get tested (all users when `None`);
/// training always uses every user outside the current test fold. Any error,
/// including a user with too few unrated products, aborts the run.
pub fn cross_validate_recall<S: ScoringStrategy>(
    recommender: &mut Recommender<S>,
    ratings: &RatingsMatrix,
    config: &RecallConfig,
    users: Option<&[usize]>,
) -> Result<RecallReport> {
    let selected = select_users(ratings, users)?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let folds = KFold::new(config.n_folds).split(selected.len(), &mut rng)?;
    let mut fold_recalls = Vec::with_capacity(folds.len());

    for (fold, positions) in folds.iter().enumerate() {
        if config.verbose {
            info!("Fold {} out of {}", fold, config.n_folds);
        }

        let mut in_test = vec![false; ratings.n_users()];
        let test_users: Vec<usize> = positions.iter().map(|&p| selected[p]).collect();
        for &user in &test_users {
            in_test[user] = true;
        }
        let train_users: Vec<usize> = (0..ratings.n_users()).filter(|&u| !in_test[u]).collect();

        recommender.fit(&ratings.select_users(&train_users)?)?;

        let mut tests = 0;
        let mut hits = 0;
        for &user in &test_users {
            let mut user_ratings = ratings.user_ratings(user)?;
            let targets = test_targets(&user_ratings, config, &mut rng);

            for product in targets {
                tests += 1;
                if is_hit(
                    recommender,
                    &mut user_ratings,
                    product,
                    config.negatives_per_test,
                    config.top_n,
                    &mut rng,
                )? {
                    hits += 1;
                }
            }
        }

        let recall = if tests > 0 {
            hits as f64 / tests as f64
        } else {
            0.0
        };
        debug!(
            "Fold {fold}: trained on {} users, {} test users, {hits}/{tests} hits (recall {recall:.4})",
            train_users.len(),
            test_users.len()
        );

        fold_recalls.push(FoldRecall {
            fold,
            test_users: test_users.len(),
            tests,
            hits,
            recall,
        });
    }

    let mean_recall = fold_recalls.iter().map(|f| f.recall).sum::<f64>() / config.n_folds as f64;

    Ok(RecallReport {
        recommender: recommender.strategy().name().to_string(),
        folds: fold_recalls,
        mean_recall,
    })
}

/// Validate the user subset, defaulting to every user
fn select_users(ratings: &RatingsMatrix, users: Option<&[usize]>) -> Result<Vec<usize>> {
    let Some(users) = users else {
        return Ok((0..ratings.n_users()).collect());
    };

    let mut seen = vec![false; ratings.n_users()];
    for &user in users {
        match seen.get_mut(user) {
            None => {
                return Err(RecError::InvalidParameter(format!(
                    "User index {user} out of range for {} users",
                    ratings.n_users()
                )))
            }
            Some(true) => {
                return Err(RecError::InvalidParameter(format!(
                    "User index {user} listed more than once"
                )))
            }
            Some(flag) => *flag = true,
        }
    }

    Ok(users.to_vec())
}

/// Rated products at or above the threshold, capped per user
fn test_targets(user_ratings: &[u32], config: &RecallConfig, rng: &mut dyn RngCore) -> Vec<usize> {
    let eligible: Vec<usize> = user_ratings
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r > 0 && r >= config.test_rating_threshold)
        .map(|(p, _)| p)
        .collect();

    if eligible.len() <= config.max_tests_per_user {
        return eligible;
    }
    index::sample(rng, eligible.len(), config.max_tests_per_user)
        .into_iter()
        .map(|i| eligible[i])
        .collect()
}
