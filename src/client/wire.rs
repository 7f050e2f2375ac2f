//! Raw record shapes as the server sends them, before denormalization.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::types::{Options, schedule_as_string};

/// Any record that carries at least an id and a name.
#[derive(Debug, Deserialize)]
pub struct RawSummary {
    pub id: u64,
    pub name: String,
}

/// Group references embedded in datasources and users. Depending on the
/// endpoint and server version these arrive as bare ids, as small objects,
/// or as a map of group id to view-only flag.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GroupRefs {
    Ids(Vec<u64>),
    Named(Vec<RawSummary>),
    Grants(BTreeMap<String, Value>),
}

impl GroupRefs {
    pub fn ids(&self) -> Vec<u64> {
        match self {
            Self::Ids(ids) => ids.clone(),
            Self::Named(groups) => groups.iter().map(|g| g.id).collect(),
            Self::Grants(grants) => grants
                .keys()
                .filter_map(|key| match key.parse() {
                    Ok(id) => Some(id),
                    Err(_) => {
                        warn!(%key, "ignoring non-numeric group reference");
                        None
                    }
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawDataSource {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub groups: Option<GroupRefs>,
}

#[derive(Debug, Deserialize)]
pub struct RawQuery {
    pub id: u64,
    pub name: String,
    /// Null once the datasource the query ran against is deleted.
    #[serde(default)]
    pub data_source_id: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub options: Options,
    #[serde(default, deserialize_with = "schedule_as_string")]
    pub schedule: Option<String>,
    #[serde(default)]
    pub is_draft: bool,
}

#[derive(Debug, Deserialize)]
pub struct RawUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub groups: Option<GroupRefs>,
}

#[derive(Debug, Deserialize)]
pub struct RawMember {
    pub id: u64,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RawGroupDataSource {
    pub name: String,
    #[serde(default)]
    pub view_only: bool,
}
