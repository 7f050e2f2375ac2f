use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::payload::{Payload, read_all};
use super::wire::{
    GroupRefs, RawDataSource, RawGroupDataSource, RawMember, RawQuery, RawSummary, RawUser,
};
use super::{RedashApi, Transport};
use crate::error::{Error, Result};
use crate::types::{
    DataSource, DataSourceAttrs, Group, GroupGrant, Query, QueryAttrs, ResourceKind, User,
    UserAttrs,
};

/// Paginating, denormalizing client over a [`Transport`].
///
/// Holds no state between calls: every lookup goes back to the server.
pub struct Client<T> {
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn fetch(&self, path: &str) -> Result<Payload> {
        read_all(&self.transport, path)
    }

    fn records<R: DeserializeOwned>(&self, path: &str) -> Result<Vec<R>> {
        self.fetch(path)?
            .into_records()
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(Error::from))
            .collect()
    }

    /// Finds the record of a collection whose `field` equals `key`.
    fn find<R: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        field: &str,
        key: &str,
    ) -> Result<Option<R>> {
        let found = self
            .fetch(kind.collection())?
            .into_records()
            .into_iter()
            .find(|record| record.get(field).and_then(Value::as_str) == Some(key));
        match found {
            Some(record) => Ok(Some(serde_json::from_value(record)?)),
            None => {
                debug!(%kind, key, "no match");
                Ok(None)
            }
        }
    }

    fn record<R: DeserializeOwned>(&self, kind: ResourceKind, id: u64) -> Result<R> {
        match self.fetch(&kind.item(id))? {
            Payload::Single(value) => Ok(serde_json::from_value(value)?),
            Payload::Empty => Err(Error::not_found(kind, id.to_string())),
            Payload::Collection(_) => Err(Error::Server {
                message: format!(
                    "expected a single {kind} at {}, got a collection",
                    kind.item(id)
                ),
            }),
        }
    }

    fn write<R: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<R> {
        let body = serde_json::to_value(body)?;
        info!(path, "write");
        let resp = self.transport.post(path, &body)?;
        Ok(serde_json::from_value(resp)?)
    }

    fn remove(&self, path: &str) -> Result<()> {
        info!(path, "delete");
        self.transport.delete(path)
    }

    fn group_name(&self, id: u64) -> Result<Option<String>> {
        match self.fetch(&ResourceKind::Group.item(id))? {
            Payload::Single(value) => {
                let raw: RawSummary = serde_json::from_value(value)?;
                Ok(Some(raw.name))
            }
            _ => {
                warn!(group_id = id, "skipping reference to a missing group");
                Ok(None)
            }
        }
    }

    fn group_names(&self, refs: Option<&GroupRefs>) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for id in refs.map(GroupRefs::ids).unwrap_or_default() {
            if let Some(name) = self.group_name(id)? {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn datasource_name(&self, id: Option<u64>) -> Result<Option<String>> {
        let Some(id) = id else {
            return Ok(None);
        };
        match self.fetch(&ResourceKind::DataSource.item(id))? {
            Payload::Single(value) => {
                let raw: RawSummary = serde_json::from_value(value)?;
                Ok(Some(raw.name))
            }
            _ => {
                warn!(data_source_id = id, "query refers to a missing datasource");
                Ok(None)
            }
        }
    }

    fn denormalize_datasource(&self, raw: RawDataSource) -> Result<DataSource> {
        let groups = self.group_names(raw.groups.as_ref())?;
        Ok(DataSource {
            id: raw.id,
            name: raw.name,
            kind: raw.kind,
            options: raw.options,
            groups: groups.into_iter().collect(),
        })
    }

    fn denormalize_query(&self, raw: RawQuery) -> Result<Query> {
        Ok(Query {
            id: raw.id,
            datasource: self.datasource_name(raw.data_source_id)?,
            name: raw.name,
            description: raw.description,
            query: raw.query,
            options: raw.options,
            schedule: raw.schedule,
            is_draft: raw.is_draft,
        })
    }

    fn denormalize_user(&self, raw: RawUser) -> Result<User> {
        Ok(User {
            id: raw.id,
            groups: self.group_names(raw.groups.as_ref())?,
            email: raw.email,
            name: raw.name,
        })
    }

    fn denormalize_group(&self, raw: RawSummary) -> Result<Group> {
        let members = self
            .records::<RawMember>(&format!("groups/{}/members", raw.id))?
            .into_iter()
            .map(|m| (m.email, m.id))
            .collect();
        let datasources = self
            .records::<RawGroupDataSource>(&format!("groups/{}/data_sources", raw.id))?
            .into_iter()
            .map(|ds| (ds.name, GroupGrant { view_only: ds.view_only }))
            .collect();
        Ok(Group {
            id: raw.id,
            name: raw.name,
            members,
            datasources,
        })
    }
}

impl<T: Transport> RedashApi for Client<T> {
    fn list_datasources(&self) -> Result<Vec<DataSource>> {
        // The collection endpoint omits options and groups.
        self.records::<RawSummary>(ResourceKind::DataSource.collection())?
            .into_iter()
            .map(|summary| self.datasource_by_id(summary.id))
            .collect()
    }

    fn datasource_by_name(&self, name: &str) -> Result<Option<DataSource>> {
        match self.find::<RawSummary>(ResourceKind::DataSource, "name", name)? {
            Some(summary) => self.datasource_by_id(summary.id).map(Some),
            None => Ok(None),
        }
    }

    fn datasource_by_id(&self, id: u64) -> Result<DataSource> {
        let raw = self.record(ResourceKind::DataSource, id)?;
        self.denormalize_datasource(raw)
    }

    fn create_datasource(&self, attrs: &DataSourceAttrs) -> Result<DataSource> {
        let created: RawSummary = self.write(ResourceKind::DataSource.collection(), attrs)?;
        self.datasource_by_id(created.id)
    }

    fn replace_datasource(&self, id: u64, attrs: &DataSourceAttrs) -> Result<DataSource> {
        let _: Value = self.write(&ResourceKind::DataSource.item(id), attrs)?;
        self.datasource_by_id(id)
    }

    fn delete_datasource(&self, id: u64) -> Result<()> {
        self.remove(&ResourceKind::DataSource.item(id))
    }

    fn list_queries(&self) -> Result<Vec<Query>> {
        self.records::<RawQuery>(ResourceKind::Query.collection())?
            .into_iter()
            .map(|raw| self.denormalize_query(raw))
            .collect()
    }

    fn query_by_name(&self, name: &str) -> Result<Option<Query>> {
        self.find::<RawQuery>(ResourceKind::Query, "name", name)?
            .map(|raw| self.denormalize_query(raw))
            .transpose()
    }

    fn query_by_id(&self, id: u64) -> Result<Query> {
        let raw = self.record(ResourceKind::Query, id)?;
        self.denormalize_query(raw)
    }

    fn create_query(&self, attrs: &QueryAttrs) -> Result<Query> {
        let raw: RawQuery = self.write(ResourceKind::Query.collection(), attrs)?;
        self.denormalize_query(raw)
    }

    fn replace_query(&self, id: u64, attrs: &QueryAttrs) -> Result<Query> {
        let raw: RawQuery = self.write(&ResourceKind::Query.item(id), attrs)?;
        self.denormalize_query(raw)
    }

    fn archive_query(&self, id: u64) -> Result<()> {
        self.remove(&ResourceKind::Query.item(id))
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.records::<RawUser>(ResourceKind::User.collection())?
            .into_iter()
            .map(|raw| self.denormalize_user(raw))
            .collect()
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find::<RawUser>(ResourceKind::User, "email", email)?
            .map(|raw| self.denormalize_user(raw))
            .transpose()
    }

    fn create_user(&self, attrs: &UserAttrs) -> Result<User> {
        let raw: RawUser = self.write(ResourceKind::User.collection(), attrs)?;
        self.denormalize_user(raw)
    }

    fn replace_user(&self, id: u64, attrs: &UserAttrs) -> Result<User> {
        let raw: RawUser = self.write(&ResourceKind::User.item(id), attrs)?;
        self.denormalize_user(raw)
    }

    fn delete_user(&self, id: u64) -> Result<()> {
        self.remove(&ResourceKind::User.item(id))
    }

    fn list_groups(&self) -> Result<Vec<Group>> {
        self.records::<RawSummary>(ResourceKind::Group.collection())?
            .into_iter()
            .map(|raw| self.denormalize_group(raw))
            .collect()
    }

    fn group_by_name(&self, name: &str) -> Result<Option<Group>> {
        self.find::<RawSummary>(ResourceKind::Group, "name", name)?
            .map(|raw| self.denormalize_group(raw))
            .transpose()
    }

    fn group_by_id(&self, id: u64) -> Result<Option<Group>> {
        match self.fetch(&ResourceKind::Group.item(id))? {
            Payload::Single(value) => {
                let raw: RawSummary = serde_json::from_value(value)?;
                self.denormalize_group(raw).map(Some)
            }
            _ => {
                warn!(group_id = id, "no group found");
                Ok(None)
            }
        }
    }

    fn create_group(&self, name: &str) -> Result<Group> {
        let raw: RawSummary =
            self.write(ResourceKind::Group.collection(), &json!({ "name": name }))?;
        self.denormalize_group(raw)
    }

    fn delete_group(&self, id: u64) -> Result<()> {
        self.remove(&ResourceKind::Group.item(id))
    }

    fn add_group_member(&self, group_id: u64, user_id: u64) -> Result<()> {
        let _: Value = self.write(
            &format!("groups/{group_id}/members"),
            &json!({ "user_id": user_id }),
        )?;
        Ok(())
    }

    fn remove_group_member(&self, group_id: u64, user_id: u64) -> Result<()> {
        self.remove(&format!("groups/{group_id}/members/{user_id}"))
    }

    fn add_group_datasource(&self, group_id: u64, datasource_id: u64) -> Result<()> {
        let _: Value = self.write(
            &format!("groups/{group_id}/data_sources"),
            &json!({ "data_source_id": datasource_id }),
        )?;
        Ok(())
    }

    fn remove_group_datasource(&self, group_id: u64, datasource_id: u64) -> Result<()> {
        self.remove(&format!("groups/{group_id}/data_sources/{datasource_id}"))
    }

    fn set_group_datasource_view_only(
        &self,
        group_id: u64,
        datasource_id: u64,
        view_only: bool,
    ) -> Result<()> {
        let _: Value = self.write(
            &format!("groups/{group_id}/data_sources/{datasource_id}"),
            &json!({ "view_only": view_only }),
        )?;
        Ok(())
    }

    fn list_dashboards(&self) -> Result<Vec<Value>> {
        Ok(self.fetch("dashboards")?.into_records())
    }

    fn list_alerts(&self) -> Result<Vec<Value>> {
        Ok(self.fetch("alerts")?.into_records())
    }
}
