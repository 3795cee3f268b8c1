//! Sampled hit-rate evaluation
//!
//! This module provides the leave-one-out hit test, a seeded k-fold user
//! splitter, and the cross-validation driver that averages recall over folds.

pub mod kfold;
pub mod recall;

pub use self::hit_test::*;
pub use self::kfold::*;
pub use self::recall::*;
