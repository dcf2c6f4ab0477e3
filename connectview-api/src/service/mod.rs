//! Aggregation, action dispatch and table view over logical connect clusters

pub mod actions;
pub mod pipeline;
pub mod search;

pub use actions::{plan, ActionDispatcher, PrimitiveCall};
pub use pipeline::{AggregationPipeline, FetchShape};
