use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use super::{Reconciler, wrap};
use crate::client::RedashApi;
use crate::error::{Error, Result};
use crate::report::ChangeReport;
use crate::types::{Group, GroupGrant, GroupSpec, ResourceKind};

/// Writes needed to move a group's members and datasource grants to a
/// desired state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    pub add_members: BTreeSet<String>,
    /// Members to drop, with the user ids the group listing reported.
    pub remove_members: BTreeMap<String, u64>,
    /// Datasources to grant, with the access they should end up with.
    pub grant: BTreeMap<String, GroupGrant>,
    pub revoke: BTreeSet<String>,
    /// Existing grants whose view-only flag must change, with the new value.
    pub visibility: BTreeMap<String, bool>,
}

impl GroupPlan {
    /// Diffs a desired group against what the server has. A group that does
    /// not exist yet is treated as empty.
    #[must_use]
    pub fn between(observed: Option<&Group>, desired: &GroupSpec) -> Self {
        let empty_members = BTreeMap::new();
        let empty_grants = BTreeMap::new();
        let (members, grants) = match observed {
            Some(group) => (&group.members, &group.datasources),
            None => (&empty_members, &empty_grants),
        };

        let add_members = desired
            .members
            .iter()
            .filter(|email| !members.contains_key(*email))
            .cloned()
            .collect();
        let remove_members = members
            .iter()
            .filter(|(email, _)| !desired.members.contains(*email))
            .map(|(email, id)| (email.clone(), *id))
            .collect();

        let grant = desired
            .datasources
            .iter()
            .filter(|(name, _)| !grants.contains_key(*name))
            .map(|(name, access)| (name.clone(), *access))
            .collect();
        let revoke = grants
            .keys()
            .filter(|name| !desired.datasources.contains_key(*name))
            .cloned()
            .collect();
        let visibility = desired
            .datasources
            .iter()
            .filter_map(|(name, wanted)| {
                let current = grants.get(name)?;
                (current.view_only != wanted.view_only).then(|| (name.clone(), wanted.view_only))
            })
            .collect();

        Self {
            add_members,
            remove_members,
            grant,
            revoke,
            visibility,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add_members.is_empty()
            && self.remove_members.is_empty()
            && self.grant.is_empty()
            && self.revoke.is_empty()
            && self.visibility.is_empty()
    }
}

impl<A: RedashApi> Reconciler<A> {
    /// Ensures a group named `spec.name` exists with exactly the given
    /// members and datasource grants.
    ///
    /// Every user and datasource the plan touches is resolved before the
    /// first write. If a write fails midway, the writes already issued stay
    /// applied and a re-run finishes the job.
    pub fn group_present(&self, spec: &GroupSpec) -> Result<ChangeReport> {
        wrap(self.converge_group(spec), ResourceKind::Group, &spec.name)
    }

    pub fn group_absent(&self, name: &str) -> Result<ChangeReport> {
        wrap(self.remove_group(name), ResourceKind::Group, name)
    }

    fn converge_group(&self, spec: &GroupSpec) -> Result<ChangeReport> {
        let observed = self.api.group_by_name(&spec.name)?;
        let plan = GroupPlan::between(observed.as_ref(), spec);

        if observed.is_some() && plan.is_empty() {
            return Ok(ChangeReport::unchanged(&spec.name, "Group is already present"));
        }

        let add_members = self.user_ids(&plan.add_members)?;
        let grant = self.datasource_ids(plan.grant.keys())?;
        let revoke = self.datasource_ids(&plan.revoke)?;
        let visibility = self.datasource_ids(plan.visibility.keys())?;

        let group_id = match &observed {
            Some(group) => group.id,
            None => {
                let created = self.api.create_group(&spec.name)?;
                info!(name = %spec.name, id = created.id, "group created");
                created.id
            }
        };

        for (email, user_id) in add_members {
            info!(group = %spec.name, %email, "adding member");
            self.api.add_group_member(group_id, user_id)?;
        }
        for (email, user_id) in &plan.remove_members {
            info!(group = %spec.name, %email, "removing member");
            self.api.remove_group_member(group_id, *user_id)?;
        }
        for (name, datasource_id) in grant {
            info!(group = %spec.name, datasource = %name, "granting datasource");
            self.api.add_group_datasource(group_id, datasource_id)?;
            // New grants start with full access.
            if plan.grant.get(name).is_some_and(|access| access.view_only) {
                self.api
                    .set_group_datasource_view_only(group_id, datasource_id, true)?;
            }
        }
        for (name, datasource_id) in revoke {
            info!(group = %spec.name, datasource = %name, "revoking datasource");
            self.api.remove_group_datasource(group_id, datasource_id)?;
        }
        for (name, datasource_id) in visibility {
            let view_only = plan.visibility.get(name).copied().unwrap_or_default();
            info!(
                group = %spec.name,
                datasource = %name,
                view_only,
                "changing datasource visibility"
            );
            self.api
                .set_group_datasource_view_only(group_id, datasource_id, view_only)?;
        }

        let current = self
            .api
            .group_by_id(group_id)?
            .ok_or_else(|| Error::not_found(ResourceKind::Group, &spec.name))?;
        let message = if observed.is_some() {
            "Group updated"
        } else {
            "Group created"
        };
        Ok(ChangeReport::changed(
            &spec.name,
            message,
            observed.as_ref(),
            Some(&current),
        ))
    }

    fn remove_group(&self, name: &str) -> Result<ChangeReport> {
        let Some(existing) = self.api.group_by_name(name)? else {
            return Ok(ChangeReport::unchanged(name, "Group is already absent"));
        };

        self.api.delete_group(existing.id)?;
        info!(name, id = existing.id, "group removed");
        Ok(ChangeReport::changed(
            name,
            "Group removed",
            Some(&existing),
            None::<&Group>,
        ))
    }

    fn user_ids<'a>(
        &self,
        emails: impl IntoIterator<Item = &'a String>,
    ) -> Result<Vec<(&'a str, u64)>> {
        emails
            .into_iter()
            .map(|email| {
                let user = self
                    .api
                    .user_by_email(email)?
                    .ok_or_else(|| Error::not_found(ResourceKind::User, email.as_str()))?;
                Ok((email.as_str(), user.id))
            })
            .collect()
    }

    fn datasource_ids<'a>(
        &self,
        names: impl IntoIterator<Item = &'a String>,
    ) -> Result<Vec<(&'a str, u64)>> {
        names
            .into_iter()
            .map(|name| Ok((name.as_str(), self.referenced_datasource(name)?.id)))
            .collect()
    }
}
