use std::collections::{BTreeMap, BTreeSet};

use super::commands::{DatasourceCommands, GroupCommands, QueryCommands, UserCommands};
use super::output::{ensure_succeeded, print_json};
use crate::client::RedashApi;
use crate::error::Result;
use crate::reconcile::Reconciler;
use crate::report::ChangeReport;
use crate::types::{DataSourceSpec, GroupGrant, GroupSpec, QuerySpec, UserSpec};

fn finish(name: &str, result: Result<ChangeReport>) -> anyhow::Result<()> {
    let report = result.unwrap_or_else(|e| ChangeReport::failed(name, &e));
    print_json(&report)?;
    ensure_succeeded(std::slice::from_ref(&report))
}

pub fn run_datasource<A: RedashApi>(
    reconciler: &Reconciler<A>,
    command: DatasourceCommands,
) -> anyhow::Result<()> {
    match command {
        DatasourceCommands::Present {
            name,
            kind,
            options,
            force,
        } => {
            let spec = DataSourceSpec {
                name,
                kind,
                options,
                force,
            };
            finish(&spec.name, reconciler.datasource_present(&spec))
        }
        DatasourceCommands::Absent { name } => finish(&name, reconciler.datasource_absent(&name)),
    }
}

pub fn run_query<A: RedashApi>(
    reconciler: &Reconciler<A>,
    command: QueryCommands,
) -> anyhow::Result<()> {
    match command {
        QueryCommands::Present {
            name,
            datasource,
            query,
            description,
            options,
            schedule,
            draft,
        } => {
            let spec = QuerySpec {
                name,
                datasource,
                description,
                query,
                options,
                schedule,
                publish: !draft,
            };
            finish(&spec.name, reconciler.query_present(&spec))
        }
        QueryCommands::Absent { name } => finish(&name, reconciler.query_absent(&name)),
    }
}

pub fn run_group<A: RedashApi>(
    reconciler: &Reconciler<A>,
    command: GroupCommands,
) -> anyhow::Result<()> {
    match command {
        GroupCommands::Present {
            name,
            members,
            datasources,
            view_only,
        } => {
            let spec = GroupSpec {
                name,
                members: members.into_iter().collect::<BTreeSet<_>>(),
                datasources: grants(datasources, view_only)?,
            };
            finish(&spec.name, reconciler.group_present(&spec))
        }
        GroupCommands::Absent { name } => finish(&name, reconciler.group_absent(&name)),
    }
}

fn grants(
    full: Vec<String>,
    view_only: Vec<String>,
) -> anyhow::Result<BTreeMap<String, GroupGrant>> {
    let mut grants = BTreeMap::new();
    for name in full {
        grants.insert(name, GroupGrant { view_only: false });
    }
    for name in view_only {
        if grants.contains_key(&name) {
            anyhow::bail!("datasource '{name}' is given both full and view-only access");
        }
        grants.insert(name, GroupGrant { view_only: true });
    }
    Ok(grants)
}

pub fn run_user<A: RedashApi>(
    reconciler: &Reconciler<A>,
    command: UserCommands,
) -> anyhow::Result<()> {
    match command {
        UserCommands::Present { email, name } => {
            let spec = UserSpec { email, name };
            finish(&spec.email, reconciler.user_present(&spec))
        }
        UserCommands::Absent { email } => finish(&email, reconciler.user_absent(&email)),
    }
}
