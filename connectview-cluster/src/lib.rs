//! Remote connect endpoints and failover
//!
//! - `client`: the [`ConnectClient`] trait and its reqwest implementation
//! - `discovery`: per-endpoint health and the [`FailoverSelector`]
//! - `registry`: logical connect clusters per physical cluster

pub mod client;
pub mod discovery;
pub mod registry;

pub use client::{ClientError, ClientResult, ConnectClient, HttpConnectClient};
pub use discovery::{EndpointHealth, EndpointState, FailoverSelector};
pub use registry::{ConnectRegistry, LogicalCluster};
