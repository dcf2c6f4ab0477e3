//! Endpoint health tracking and failover selection

pub mod endpoint;
pub mod failover;

pub use endpoint::{Endpoint, EndpointHealth, EndpointSet, EndpointState};
pub use failover::{FailoverSelector, DEFAULT_COOLDOWN};
