use std::fmt;

use serde::{Deserialize, Serialize};

/// The resource kinds this crate knows how to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[serde(alias = "data_source")]
    DataSource,
    Query,
    User,
    Group,
}

impl ResourceKind {
    /// Collection path of this kind on the Redash API.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::DataSource => "data_sources",
            Self::Query => "queries",
            Self::User => "users",
            Self::Group => "groups",
        }
    }

    /// Path of a single record of this kind.
    #[must_use]
    pub fn item(self, id: u64) -> String {
        format!("{}/{}", self.collection(), id)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DataSource => "datasource",
            Self::Query => "query",
            Self::User => "user",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
