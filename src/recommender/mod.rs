//! Recommenders and top-N selection

pub mod model;
pub mod random;
pub mod select;
pub mod svd;

pub use self::model::*;
pub use self::random::*;
pub use self::select::*;
pub use self::svd::*;
