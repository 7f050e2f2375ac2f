//! In-memory stand-in for a Redash server, recording every write.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use redash_converge::client::RedashApi;
use redash_converge::error::{Error, Result};
use redash_converge::types::{
    DataSource, DataSourceAttrs, Group, GroupGrant, Options, Query, QueryAttrs, ResourceKind,
    User, UserAttrs,
};
use serde_json::{Value, json};

const MASK: &str = "--------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateDataSource(String),
    ReplaceDataSource(u64),
    DeleteDataSource(u64),
    CreateQuery(String),
    ReplaceQuery { id: u64, is_draft: Option<bool> },
    ArchiveQuery(u64),
    CreateUser(String),
    ReplaceUser(u64),
    DeleteUser(u64),
    CreateGroup(String),
    DeleteGroup(u64),
    AddMember { group: u64, user: u64 },
    RemoveMember { group: u64, user: u64 },
    AddDataSource { group: u64, datasource: u64 },
    RemoveDataSource { group: u64, datasource: u64 },
    SetViewOnly { group: u64, datasource: u64, view_only: bool },
}

#[derive(Clone)]
struct StoredDataSource {
    id: u64,
    name: String,
    kind: String,
    options: Options,
}

#[derive(Clone)]
struct StoredQuery {
    id: u64,
    name: String,
    data_source_id: u64,
    description: Option<String>,
    query: String,
    options: Options,
    schedule: Option<String>,
    is_draft: bool,
    archived: bool,
}

#[derive(Clone)]
struct StoredUser {
    id: u64,
    email: String,
    name: String,
}

#[derive(Clone)]
struct StoredGroup {
    id: u64,
    name: String,
    members: BTreeSet<u64>,
    datasources: BTreeMap<u64, bool>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    datasources: Vec<StoredDataSource>,
    queries: Vec<StoredQuery>,
    users: Vec<StoredUser>,
    groups: Vec<StoredGroup>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct FakeRedash {
    state: RefCell<State>,
    calls: RefCell<Vec<Call>>,
    fail_on: RefCell<Option<Call>>,
}

impl FakeRedash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_datasource(&self, name: &str, kind: &str, options: Options) -> u64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.datasources.push(StoredDataSource {
            id,
            name: name.into(),
            kind: kind.into(),
            options,
        });
        id
    }

    pub fn with_user(&self, email: &str, name: &str) -> u64 {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.users.push(StoredUser {
            id,
            email: email.into(),
            name: name.into(),
        });
        id
    }

    /// Adds a group; members are emails, grants are datasource names.
    pub fn with_group(&self, name: &str, members: &[&str], grants: &[(&str, bool)]) -> u64 {
        let mut state = self.state.borrow_mut();
        let members = members
            .iter()
            .map(|email| {
                state
                    .users
                    .iter()
                    .find(|u| u.email == *email)
                    .map(|u| u.id)
                    .expect("member must be added first")
            })
            .collect();
        let datasources = grants
            .iter()
            .map(|(ds, view_only)| {
                let id = state
                    .datasources
                    .iter()
                    .find(|d| d.name == *ds)
                    .map(|d| d.id)
                    .expect("datasource must be added first");
                (id, *view_only)
            })
            .collect();
        let id = state.next_id();
        state.groups.push(StoredGroup {
            id,
            name: name.into(),
            members,
            datasources,
        });
        id
    }

    pub fn with_query(&self, name: &str, datasource: &str, text: &str, is_draft: bool) -> u64 {
        let mut state = self.state.borrow_mut();
        let data_source_id = state
            .datasources
            .iter()
            .find(|d| d.name == datasource)
            .map(|d| d.id)
            .expect("datasource must be added first");
        let id = state.next_id();
        state.queries.push(StoredQuery {
            id,
            name: name.into(),
            data_source_id,
            description: None,
            query: text.into(),
            options: Options::new(),
            schedule: None,
            is_draft,
            archived: false,
        });
        id
    }

    /// Makes the next write matching `call` fail with a server error.
    pub fn fail_on(&self, call: Call) {
        *self.fail_on.borrow_mut() = Some(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn is_archived(&self, id: u64) -> bool {
        self.state
            .borrow()
            .queries
            .iter()
            .any(|q| q.id == id && q.archived)
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut fail_on = self.fail_on.borrow_mut();
        if fail_on.as_ref() == Some(&call) {
            *fail_on = None;
            return Err(Error::Server {
                message: format!("injected failure for {call:?}"),
            });
        }
        self.calls.borrow_mut().push(call);
        Ok(())
    }

    fn group_names_of(state: &State, matches: impl Fn(&StoredGroup) -> bool) -> Vec<String> {
        state
            .groups
            .iter()
            .filter(|g| matches(g))
            .map(|g| g.name.clone())
            .collect()
    }

    fn view_datasource(state: &State, ds: &StoredDataSource) -> DataSource {
        let options = ds
            .options
            .iter()
            .map(|(key, value)| {
                if key == "password" {
                    (key.clone(), json!(MASK))
                } else {
                    (key.clone(), value.clone())
                }
            })
            .collect();
        DataSource {
            id: ds.id,
            name: ds.name.clone(),
            kind: ds.kind.clone(),
            options,
            groups: Self::group_names_of(state, |g| g.datasources.contains_key(&ds.id))
                .into_iter()
                .collect(),
        }
    }

    fn view_query(state: &State, q: &StoredQuery) -> Result<Query> {
        let datasource = state
            .datasources
            .iter()
            .find(|d| d.id == q.data_source_id)
            .map(|d| d.name.clone());
        Ok(Query {
            id: q.id,
            name: q.name.clone(),
            datasource,
            description: q.description.clone(),
            query: q.query.clone(),
            options: q.options.clone(),
            schedule: q.schedule.clone(),
            is_draft: q.is_draft,
        })
    }

    fn view_user(state: &State, u: &StoredUser) -> User {
        User {
            id: u.id,
            email: u.email.clone(),
            name: u.name.clone(),
            groups: Self::group_names_of(state, |g| g.members.contains(&u.id)),
        }
    }

    fn view_group(state: &State, g: &StoredGroup) -> Group {
        Group {
            id: g.id,
            name: g.name.clone(),
            members: state
                .users
                .iter()
                .filter(|u| g.members.contains(&u.id))
                .map(|u| (u.email.clone(), u.id))
                .collect(),
            datasources: state
                .datasources
                .iter()
                .filter_map(|d| {
                    let view_only = *g.datasources.get(&d.id)?;
                    Some((d.name.clone(), GroupGrant { view_only }))
                })
                .collect(),
        }
    }

    fn group_mut<'a>(state: &'a mut State, id: u64) -> Result<&'a mut StoredGroup> {
        state
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::not_found(ResourceKind::Group, id.to_string()))
    }
}

impl RedashApi for FakeRedash {
    fn list_datasources(&self) -> Result<Vec<DataSource>> {
        let state = self.state.borrow();
        Ok(state
            .datasources
            .iter()
            .map(|d| Self::view_datasource(&state, d))
            .collect())
    }

    fn datasource_by_name(&self, name: &str) -> Result<Option<DataSource>> {
        let state = self.state.borrow();
        Ok(state
            .datasources
            .iter()
            .find(|d| d.name == name)
            .map(|d| Self::view_datasource(&state, d)))
    }

    fn datasource_by_id(&self, id: u64) -> Result<DataSource> {
        let state = self.state.borrow();
        state
            .datasources
            .iter()
            .find(|d| d.id == id)
            .map(|d| Self::view_datasource(&state, d))
            .ok_or_else(|| Error::not_found(ResourceKind::DataSource, id.to_string()))
    }

    fn create_datasource(&self, attrs: &DataSourceAttrs) -> Result<DataSource> {
        self.record(Call::CreateDataSource(attrs.name.clone()))?;
        let id = self.with_datasource(&attrs.name, &attrs.kind, attrs.options.clone());
        self.datasource_by_id(id)
    }

    fn replace_datasource(&self, id: u64, attrs: &DataSourceAttrs) -> Result<DataSource> {
        self.record(Call::ReplaceDataSource(id))?;
        {
            let mut state = self.state.borrow_mut();
            let ds = state
                .datasources
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| Error::not_found(ResourceKind::DataSource, id.to_string()))?;
            ds.name = attrs.name.clone();
            ds.kind = attrs.kind.clone();
            ds.options = attrs.options.clone();
        }
        self.datasource_by_id(id)
    }

    fn delete_datasource(&self, id: u64) -> Result<()> {
        self.record(Call::DeleteDataSource(id))?;
        let mut state = self.state.borrow_mut();
        state.datasources.retain(|d| d.id != id);
        for group in &mut state.groups {
            group.datasources.remove(&id);
        }
        Ok(())
    }

    fn list_queries(&self) -> Result<Vec<Query>> {
        let state = self.state.borrow();
        state
            .queries
            .iter()
            .filter(|q| !q.archived)
            .map(|q| Self::view_query(&state, q))
            .collect()
    }

    fn query_by_name(&self, name: &str) -> Result<Option<Query>> {
        let state = self.state.borrow();
        state
            .queries
            .iter()
            .find(|q| q.name == name && !q.archived)
            .map(|q| Self::view_query(&state, q))
            .transpose()
    }

    fn query_by_id(&self, id: u64) -> Result<Query> {
        let state = self.state.borrow();
        let query = state
            .queries
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| Error::not_found(ResourceKind::Query, id.to_string()))?;
        Self::view_query(&state, query)
    }

    fn create_query(&self, attrs: &QueryAttrs) -> Result<Query> {
        self.record(Call::CreateQuery(attrs.name.clone()))?;
        let id = {
            let mut state = self.state.borrow_mut();
            if !state.datasources.iter().any(|d| d.id == attrs.data_source_id) {
                return Err(Error::Server {
                    message: "Data source not found".into(),
                });
            }
            let id = state.next_id();
            state.queries.push(StoredQuery {
                id,
                name: attrs.name.clone(),
                data_source_id: attrs.data_source_id,
                description: attrs.description.clone(),
                query: attrs.query.clone(),
                options: attrs.options.clone(),
                schedule: attrs.schedule.clone(),
                // New queries always start as drafts.
                is_draft: true,
                archived: false,
            });
            id
        };
        self.query_by_id(id)
    }

    fn replace_query(&self, id: u64, attrs: &QueryAttrs) -> Result<Query> {
        self.record(Call::ReplaceQuery {
            id,
            is_draft: attrs.is_draft,
        })?;
        {
            let mut state = self.state.borrow_mut();
            let query = state
                .queries
                .iter_mut()
                .find(|q| q.id == id)
                .ok_or_else(|| Error::not_found(ResourceKind::Query, id.to_string()))?;
            query.name = attrs.name.clone();
            query.data_source_id = attrs.data_source_id;
            query.description = attrs.description.clone();
            query.query = attrs.query.clone();
            query.options = attrs.options.clone();
            query.schedule = attrs.schedule.clone();
            if let Some(is_draft) = attrs.is_draft {
                query.is_draft = is_draft;
            }
        }
        self.query_by_id(id)
    }

    fn archive_query(&self, id: u64) -> Result<()> {
        self.record(Call::ArchiveQuery(id))?;
        let mut state = self.state.borrow_mut();
        if let Some(query) = state.queries.iter_mut().find(|q| q.id == id) {
            query.archived = true;
        }
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let state = self.state.borrow();
        Ok(state
            .users
            .iter()
            .map(|u| Self::view_user(&state, u))
            .collect())
    }

    fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.borrow();
        Ok(state
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| Self::view_user(&state, u)))
    }

    fn create_user(&self, attrs: &UserAttrs) -> Result<User> {
        self.record(Call::CreateUser(attrs.email.clone()))?;
        self.with_user(&attrs.email, &attrs.name);
        self.user_by_email(&attrs.email)?
            .ok_or_else(|| Error::not_found(ResourceKind::User, attrs.email.as_str()))
    }

    fn replace_user(&self, id: u64, attrs: &UserAttrs) -> Result<User> {
        self.record(Call::ReplaceUser(id))?;
        let mut state = self.state.borrow_mut();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::not_found(ResourceKind::User, id.to_string()))?;
        user.name = attrs.name.clone();
        user.email = attrs.email.clone();
        let user = user.clone();
        Ok(Self::view_user(&state, &user))
    }

    fn delete_user(&self, id: u64) -> Result<()> {
        self.record(Call::DeleteUser(id))?;
        let mut state = self.state.borrow_mut();
        state.users.retain(|u| u.id != id);
        for group in &mut state.groups {
            group.members.remove(&id);
        }
        Ok(())
    }

    fn list_groups(&self) -> Result<Vec<Group>> {
        let state = self.state.borrow();
        Ok(state
            .groups
            .iter()
            .map(|g| Self::view_group(&state, g))
            .collect())
    }

    fn group_by_name(&self, name: &str) -> Result<Option<Group>> {
        let state = self.state.borrow();
        Ok(state
            .groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| Self::view_group(&state, g)))
    }

    fn group_by_id(&self, id: u64) -> Result<Option<Group>> {
        let state = self.state.borrow();
        Ok(state
            .groups
            .iter()
            .find(|g| g.id == id)
            .map(|g| Self::view_group(&state, g)))
    }

    fn create_group(&self, name: &str) -> Result<Group> {
        self.record(Call::CreateGroup(name.into()))?;
        let id = self.with_group(name, &[], &[]);
        self.group_by_id(id)?
            .ok_or_else(|| Error::not_found(ResourceKind::Group, name))
    }

    fn delete_group(&self, id: u64) -> Result<()> {
        self.record(Call::DeleteGroup(id))?;
        self.state.borrow_mut().groups.retain(|g| g.id != id);
        Ok(())
    }

    fn add_group_member(&self, group_id: u64, user_id: u64) -> Result<()> {
        self.record(Call::AddMember {
            group: group_id,
            user: user_id,
        })?;
        Self::group_mut(&mut self.state.borrow_mut(), group_id)?
            .members
            .insert(user_id);
        Ok(())
    }

    fn remove_group_member(&self, group_id: u64, user_id: u64) -> Result<()> {
        self.record(Call::RemoveMember {
            group: group_id,
            user: user_id,
        })?;
        Self::group_mut(&mut self.state.borrow_mut(), group_id)?
            .members
            .remove(&user_id);
        Ok(())
    }

    fn add_group_datasource(&self, group_id: u64, datasource_id: u64) -> Result<()> {
        self.record(Call::AddDataSource {
            group: group_id,
            datasource: datasource_id,
        })?;
        Self::group_mut(&mut self.state.borrow_mut(), group_id)?
            .datasources
            .insert(datasource_id, false);
        Ok(())
    }

    fn remove_group_datasource(&self, group_id: u64, datasource_id: u64) -> Result<()> {
        self.record(Call::RemoveDataSource {
            group: group_id,
            datasource: datasource_id,
        })?;
        Self::group_mut(&mut self.state.borrow_mut(), group_id)?
            .datasources
            .remove(&datasource_id);
        Ok(())
    }

    fn set_group_datasource_view_only(
        &self,
        group_id: u64,
        datasource_id: u64,
        view_only: bool,
    ) -> Result<()> {
        self.record(Call::SetViewOnly {
            group: group_id,
            datasource: datasource_id,
            view_only,
        })?;
        let mut state = self.state.borrow_mut();
        let group = Self::group_mut(&mut state, group_id)?;
        match group.datasources.get_mut(&datasource_id) {
            Some(flag) => {
                *flag = view_only;
                Ok(())
            }
            None => Err(Error::Server {
                message: "Datasource not accessible to group".into(),
            }),
        }
    }

    fn list_dashboards(&self) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }

    fn list_alerts(&self) -> Result<Vec<Value>> {
        Ok(Vec::new())
    }
}
