//! Declarative state files: a list of resources and whether each should be
//! present or absent.
//!
//! ```yaml
//! states:
//!   - kind: datasource
//!     ensure: present
//!     name: prod-pg
//!     type: pg
//!     options: {host: db.internal, dbname: app}
//!   - kind: group
//!     ensure: present
//!     name: analysts
//!     members: [ana@example.com]
//!     datasources:
//!       prod-pg: {view_only: true}
//!   - kind: user
//!     ensure: absent
//!     email: former@example.com
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use crate::client::RedashApi;
use crate::error::Result;
use crate::reconcile::Reconciler;
use crate::report::ChangeReport;
use crate::types::{DataSourceSpec, GroupSpec, QuerySpec, UserSpec};

#[derive(Debug, Clone, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub states: Vec<Declaration>,
}

impl StateFile {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ByName {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ByEmail {
    pub email: String,
}

/// Whether a resource should exist. `Absent` only needs the lookup key.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "ensure", rename_all = "snake_case")]
pub enum Ensure<S, K> {
    Present(S),
    Absent(K),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Datasource(Ensure<DataSourceSpec, ByName>),
    Query(Ensure<QuerySpec, ByName>),
    Group(Ensure<GroupSpec, ByName>),
    User(Ensure<UserSpec, ByEmail>),
}

impl Declaration {
    /// The key the resource is looked up by.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Datasource(Ensure::Present(spec)) => &spec.name,
            Self::Query(Ensure::Present(spec)) => &spec.name,
            Self::Group(Ensure::Present(spec)) => &spec.name,
            Self::User(Ensure::Present(spec)) => &spec.email,
            Self::Datasource(Ensure::Absent(k))
            | Self::Query(Ensure::Absent(k))
            | Self::Group(Ensure::Absent(k)) => &k.name,
            Self::User(Ensure::Absent(k)) => &k.email,
        }
    }
}

impl<A: RedashApi> Reconciler<A> {
    /// Runs one declaration. Failures become a report with
    /// `succeeded: false` instead of an error.
    pub fn apply(&self, declaration: &Declaration) -> ChangeReport {
        let result = match declaration {
            Declaration::Datasource(Ensure::Present(spec)) => self.datasource_present(spec),
            Declaration::Datasource(Ensure::Absent(k)) => self.datasource_absent(&k.name),
            Declaration::Query(Ensure::Present(spec)) => self.query_present(spec),
            Declaration::Query(Ensure::Absent(k)) => self.query_absent(&k.name),
            Declaration::Group(Ensure::Present(spec)) => self.group_present(spec),
            Declaration::Group(Ensure::Absent(k)) => self.group_absent(&k.name),
            Declaration::User(Ensure::Present(spec)) => self.user_present(spec),
            Declaration::User(Ensure::Absent(k)) => self.user_absent(&k.email),
        };

        match result {
            Ok(report) => {
                info!(key = declaration.key(), message = %report.message, "converged");
                report
            }
            Err(e) => {
                error!(key = declaration.key(), error = %e, "convergence failed");
                ChangeReport::failed(declaration.key(), &e)
            }
        }
    }

    /// Runs every declaration in order. A failure does not stop the ones
    /// after it.
    pub fn apply_all(&self, states: &StateFile) -> Vec<ChangeReport> {
        states.states.iter().map(|d| self.apply(d)).collect()
    }
}
