//! Convergence of remote resources to a desired state.
//!
//! Every routine reads the current state, compares it with the desired
//! spec, issues only the writes needed, and re-reads the result for the
//! [`ChangeReport`](crate::report::ChangeReport). A failure aborts the
//! routine without undoing earlier writes; running it again picks up from
//! whatever state the server is in.

mod datasource;
mod group;
mod query;
mod user;

pub use group::GroupPlan;

use crate::client::RedashApi;
use crate::error::{Error, Result};
use crate::types::{DataSource, ResourceKind};

pub struct Reconciler<A> {
    api: A,
}

impl<A: RedashApi> Reconciler<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Looks up a datasource a desired spec refers to by name.
    fn referenced_datasource(&self, name: &str) -> Result<DataSource> {
        self.api
            .datasource_by_name(name)?
            .ok_or_else(|| Error::Validation(format!("datasource '{name}' does not exist")))
    }
}

fn wrap<T>(result: Result<T>, kind: ResourceKind, name: &str) -> Result<T> {
    result.map_err(|e| e.in_context(kind, name))
}
