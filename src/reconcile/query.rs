use tracing::{debug, info};

use super::{Reconciler, wrap};
use crate::client::RedashApi;
use crate::diff::structurally_equal;
use crate::error::Result;
use crate::report::ChangeReport;
use crate::types::{Query, QueryAttrs, QuerySpec, ResourceKind};

impl<A: RedashApi> Reconciler<A> {
    /// Ensures a query named `spec.name` exists with the given text,
    /// datasource, options, schedule and publication state.
    pub fn query_present(&self, spec: &QuerySpec) -> Result<ChangeReport> {
        wrap(self.converge_query(spec), ResourceKind::Query, &spec.name)
    }

    /// Archives the query if it exists. Archived queries stay on the server.
    pub fn query_absent(&self, name: &str) -> Result<ChangeReport> {
        wrap(self.archive_query(name), ResourceKind::Query, name)
    }

    fn converge_query(&self, spec: &QuerySpec) -> Result<ChangeReport> {
        let Some(existing) = self.api.query_by_name(&spec.name)? else {
            return self.create_query(spec);
        };

        if !query_differs(spec, &existing) {
            return Ok(ChangeReport::unchanged(&spec.name, "Query is already present"));
        }

        let datasource = self.referenced_datasource(&spec.datasource)?;
        let attrs = query_attrs(spec, datasource.id, Some(!spec.publish));
        let updated = self.api.replace_query(existing.id, &attrs)?;
        info!(name = %spec.name, id = existing.id, "query updated");
        Ok(ChangeReport::changed(
            &spec.name,
            "Query updated",
            Some(&existing),
            Some(&updated),
        ))
    }

    fn create_query(&self, spec: &QuerySpec) -> Result<ChangeReport> {
        let datasource = self.referenced_datasource(&spec.datasource)?;
        let mut attrs = query_attrs(spec, datasource.id, None);
        let mut query = self.api.create_query(&attrs)?;
        info!(name = %spec.name, id = query.id, "query created");

        // Publishing and scheduling only take effect on an existing query.
        if spec.publish || spec.schedule.is_some() {
            attrs.is_draft = Some(!spec.publish);
            debug!(
                id = query.id,
                publish = spec.publish,
                schedule = ?spec.schedule,
                "finalizing new query"
            );
            query = self.api.replace_query(query.id, &attrs)?;
        }

        Ok(ChangeReport::changed(
            &spec.name,
            "Query created",
            None::<&Query>,
            Some(&query),
        ))
    }

    fn archive_query(&self, name: &str) -> Result<ChangeReport> {
        let Some(existing) = self.api.query_by_name(name)? else {
            return Ok(ChangeReport::unchanged(name, "Query is already absent"));
        };

        self.api.archive_query(existing.id)?;
        info!(name, id = existing.id, "query archived");
        Ok(ChangeReport::changed(
            name,
            "Query archived",
            Some(&existing),
            None::<&Query>,
        ))
    }
}

fn query_attrs(spec: &QuerySpec, data_source_id: u64, is_draft: Option<bool>) -> QueryAttrs {
    QueryAttrs {
        name: spec.name.clone(),
        data_source_id,
        description: spec.description.clone(),
        query: spec.query.clone(),
        options: spec.options.clone(),
        schedule: spec.schedule.clone(),
        is_draft,
    }
}

/// Schedules and descriptions compare as text, so null and absent agree.
/// A query whose datasource is gone always differs.
fn query_differs(spec: &QuerySpec, observed: &Query) -> bool {
    let as_text = |value: &Option<String>| value.clone().unwrap_or_default();
    let wants_draft = !spec.publish;

    observed.datasource.as_deref() != Some(spec.datasource.as_str())
        || as_text(&spec.description) != as_text(&observed.description)
        || spec.query != observed.query
        || as_text(&spec.schedule) != as_text(&observed.schedule)
        || observed.is_draft != wants_draft
        || !structurally_equal(&spec.options, &observed.options, &[])
}
