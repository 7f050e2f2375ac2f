//! The result envelope every converge operation returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Before/after snapshots of a resource that changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Changes {
    pub old: Value,
    pub new: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub name: String,
    pub succeeded: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Changes>,
}

impl ChangeReport {
    /// A successful run that wrote nothing.
    pub fn unchanged(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            succeeded: true,
            message: message.into(),
            changes: None,
        }
    }

    /// A successful run that moved the resource from `old` to `new`.
    /// Absent sides are `null`.
    pub fn changed<O, N>(
        name: impl Into<String>,
        message: impl Into<String>,
        old: Option<&O>,
        new: Option<&N>,
    ) -> Self
    where
        O: Serialize,
        N: Serialize,
    {
        Self {
            name: name.into(),
            succeeded: true,
            message: message.into(),
            changes: Some(Changes {
                old: snapshot(old),
                new: snapshot(new),
            }),
        }
    }

    pub fn failed(name: impl Into<String>, error: &Error) -> Self {
        Self {
            name: name.into(),
            succeeded: false,
            message: error.to_string(),
            changes: None,
        }
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.changes.is_some()
    }
}

fn snapshot<T: Serialize>(record: Option<&T>) -> Value {
    record
        .and_then(|r| serde_json::to_value(r).ok())
        .unwrap_or(Value::Null)
}
