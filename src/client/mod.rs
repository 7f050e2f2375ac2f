//! Access to the Redash API.
//!
//! [`Transport`] moves raw JSON over the wire; [`Client`] builds on it to
//! paginate and denormalize records, and exposes the result through
//! [`RedashApi`], the interface the reconciler is written against.

mod http;
mod payload;
mod redash;
mod wire;

pub use http::HttpTransport;
pub use payload::{Payload, read_all};
pub use redash::Client;

use serde_json::Value;

use crate::error::Result;
use crate::types::{
    DataSource, DataSourceAttrs, Group, Query, QueryAttrs, User, UserAttrs,
};

/// Raw request/response exchange with the API.
///
/// `get` returns the decoded body of a successful or not-found response
/// (`Value::Null` for an empty body). `post` fails with `Error::Server` on
/// any status but 200. `delete` succeeds only on 200 or 204.
pub trait Transport {
    fn get(&self, path: &str, page: Option<u32>) -> Result<Value>;
    fn post(&self, path: &str, body: &Value) -> Result<Value>;
    fn delete(&self, path: &str) -> Result<()>;
}

/// Typed, denormalized view of the Redash resources.
///
/// Lookups by key return `Ok(None)` when nothing matches; lookups by id fail
/// with `Error::NotFound`. Writes return the record as re-read afterwards.
pub trait RedashApi {
    // Datasources
    fn list_datasources(&self) -> Result<Vec<DataSource>>;
    fn datasource_by_name(&self, name: &str) -> Result<Option<DataSource>>;
    fn datasource_by_id(&self, id: u64) -> Result<DataSource>;
    fn create_datasource(&self, attrs: &DataSourceAttrs) -> Result<DataSource>;
    fn replace_datasource(&self, id: u64, attrs: &DataSourceAttrs) -> Result<DataSource>;
    fn delete_datasource(&self, id: u64) -> Result<()>;

    // Queries
    fn list_queries(&self) -> Result<Vec<Query>>;
    fn query_by_name(&self, name: &str) -> Result<Option<Query>>;
    fn query_by_id(&self, id: u64) -> Result<Query>;
    fn create_query(&self, attrs: &QueryAttrs) -> Result<Query>;
    fn replace_query(&self, id: u64, attrs: &QueryAttrs) -> Result<Query>;
    /// Soft delete; the server keeps the query in an archived state.
    fn archive_query(&self, id: u64) -> Result<()>;

    // Users
    fn list_users(&self) -> Result<Vec<User>>;
    fn user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn create_user(&self, attrs: &UserAttrs) -> Result<User>;
    fn replace_user(&self, id: u64, attrs: &UserAttrs) -> Result<User>;
    fn delete_user(&self, id: u64) -> Result<()>;

    // Groups
    fn list_groups(&self) -> Result<Vec<Group>>;
    fn group_by_name(&self, name: &str) -> Result<Option<Group>>;
    /// Dangling group ids resolve to `None` rather than an error.
    fn group_by_id(&self, id: u64) -> Result<Option<Group>>;
    fn create_group(&self, name: &str) -> Result<Group>;
    fn delete_group(&self, id: u64) -> Result<()>;

    // Group membership and datasource grants
    fn add_group_member(&self, group_id: u64, user_id: u64) -> Result<()>;
    fn remove_group_member(&self, group_id: u64, user_id: u64) -> Result<()>;
    fn add_group_datasource(&self, group_id: u64, datasource_id: u64) -> Result<()>;
    fn remove_group_datasource(&self, group_id: u64, datasource_id: u64) -> Result<()>;
    fn set_group_datasource_view_only(
        &self,
        group_id: u64,
        datasource_id: u64,
        view_only: bool,
    ) -> Result<()>;

    // Read-only collections
    fn list_dashboards(&self) -> Result<Vec<Value>>;
    fn list_alerts(&self) -> Result<Vec<Value>>;
}
