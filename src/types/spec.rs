use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{GroupGrant, Options, schedule_as_string};

/// Desired state of a datasource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Options,
    /// Replace the datasource even when nothing comparable differs. Secret
    /// options are never compared, so this is how a password gets rotated.
    #[serde(default)]
    pub force: bool,
}

/// Desired state of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub name: String,
    /// Name of the datasource the query runs against.
    pub datasource: String,
    #[serde(default)]
    pub description: Option<String>,
    pub query: String,
    #[serde(default)]
    pub options: Options,
    /// Refresh schedule. Numbers and structured values are kept as their
    /// JSON text, the same way observed schedules are read.
    #[serde(default, deserialize_with = "schedule_as_string")]
    pub schedule: Option<String>,
    #[serde(default = "default_publish")]
    pub publish: bool,
}

fn default_publish() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSpec {
    pub email: String,
    pub name: String,
}

/// Desired state of a group: exact member and datasource sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub members: BTreeSet<String>,
    #[serde(default)]
    pub datasources: BTreeMap<String, GroupGrant>,
}

impl GroupSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeSet::new(),
            datasources: BTreeMap::new(),
        }
    }
}
