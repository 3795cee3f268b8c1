//! Data loading for ratings matrices
//!
//! This module turns rating files in the usual collaborative-filtering
//! layouts into a [`RatingsMatrix`](crate::core::RatingsMatrix).

pub mod triplets;

pub use self::triplets::*;
