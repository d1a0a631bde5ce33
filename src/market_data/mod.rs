pub mod feed;
pub mod series;

// Re-export the core types for convenient access (e.g. `use crate::market_data::Sample`).
pub use feed::{PriceFeed, RandomWalkFeed, WalkParams};
pub use series::{PriceSeries, Sample};
