pub mod action;
pub mod connect;
pub mod connector;
pub mod query;

pub use action::{ActionRequest, ConnectorAction};
pub use connect::{
    ConnectCacheKey, ConnectStats, ConnectSummary, ConnectorPlugin, PluginConfigValidation,
};
pub use connector::{
    ConnectorConfig, ConnectorDetail, ConnectorRecord, ConnectorState, ConnectorStatus,
    ConnectorType, NewConnector, TaskRecord, TaskState,
};
pub use query::{ConnectorQuery, SortColumn, SortOrder};
