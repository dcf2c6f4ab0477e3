pub mod aggregation;

pub use aggregation::{AggregationCache, ConnectorsCache};
