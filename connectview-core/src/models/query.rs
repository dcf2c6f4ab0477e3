use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::Error;

/// Column the connector table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum SortColumn {
    #[default]
    Name,
    Connect,
    Type,
    Status,
}

impl FromStr for SortColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "connect" => Ok(Self::Connect),
            "type" => Ok(Self::Type),
            "status" => Ok(Self::Status),
            other => Err(Error::Validation(format!("Unknown sort column: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filter and ordering for the all-connectors table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorQuery {
    pub search: Option<String>,
    pub order_by: SortColumn,
    pub sort_order: SortOrder,
}

impl ConnectorQuery {
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub const fn ordered_by(mut self, column: SortColumn, order: SortOrder) -> Self {
        self.order_by = column;
        self.sort_order = order;
        self
    }
}
