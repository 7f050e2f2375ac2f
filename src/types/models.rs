use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Free-form attribute mapping, as used by datasource and query options.
pub type Options = serde_json::Map<String, Value>;

/// A datasource as observed on the server, with group ids resolved to names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub groups: BTreeSet<String>,
}

/// A query as observed on the server, with its datasource id resolved to a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub id: u64,
    pub name: String,
    /// `None` when the query's datasource no longer exists.
    #[serde(default)]
    pub datasource: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub query: String,
    #[serde(default)]
    pub options: Options,
    #[serde(default, deserialize_with = "schedule_as_string")]
    pub schedule: Option<String>,
    #[serde(default)]
    pub is_draft: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub name: String,
    /// Group names in the order the server lists the memberships.
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Access a group has on one datasource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupGrant {
    #[serde(default)]
    pub view_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    /// Member email to user id.
    #[serde(default)]
    pub members: BTreeMap<String, u64>,
    /// Datasource name to grant.
    #[serde(default)]
    pub datasources: BTreeMap<String, GroupGrant>,
}

/// Body of a datasource create or replace.
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceAttrs {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub options: Options,
}

/// Body of a query create or replace. `is_draft` is omitted on creation,
/// where the server does not honor it.
#[derive(Debug, Clone, Serialize)]
pub struct QueryAttrs {
    pub name: String,
    pub data_source_id: u64,
    pub description: Option<String>,
    pub query: String,
    pub options: Options,
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserAttrs {
    pub name: String,
    pub email: String,
}

/// Schedules are opaque: strings pass through, null stays absent and any
/// structured value is kept as its JSON text.
pub fn schedule_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}
