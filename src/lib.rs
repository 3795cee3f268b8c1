//! Sampled hit-rate evaluation of collaborative-filtering recommenders
//!
//! Recommenders are trained on a users x products ratings matrix and judged
//! by leave-one-out hit tests: a rated product is hidden, ranked against a
//! random sample of unrated products, and counts as a hit when it lands in
//! the top-N list. Hit ratios are averaged over a k-fold split of users.

pub mod core;
pub mod data;
pub mod evaluation;
pub mod recommender;
pub mod utils;

// Re-export main types for convenience
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{RecError, Result};
pub use crate::data::RatingsDataset;
pub use crate::evaluation::{
    average_recall, cross_validate_recall, is_hit, FoldRecall, KFold, RecallConfig, RecallReport,
};
pub use crate::recommender::{top_n, FitState, ProductFactors, PureSvd, RandomScores, Recommender};
pub use crate::utils::RatingsStats;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
