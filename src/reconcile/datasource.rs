use tracing::info;

use super::{Reconciler, wrap};
use crate::client::RedashApi;
use crate::diff::{SECRET_FIELDS, structurally_equal};
use crate::error::Result;
use crate::report::ChangeReport;
use crate::types::{DataSource, DataSourceAttrs, DataSourceSpec, ResourceKind};

impl<A: RedashApi> Reconciler<A> {
    /// Ensures a datasource named `spec.name` exists with the given type and
    /// options. Secret options never count as a difference; set
    /// `spec.force` to push them anyway.
    pub fn datasource_present(&self, spec: &DataSourceSpec) -> Result<ChangeReport> {
        wrap(
            self.converge_datasource(spec),
            ResourceKind::DataSource,
            &spec.name,
        )
    }

    pub fn datasource_absent(&self, name: &str) -> Result<ChangeReport> {
        wrap(self.remove_datasource(name), ResourceKind::DataSource, name)
    }

    fn converge_datasource(&self, spec: &DataSourceSpec) -> Result<ChangeReport> {
        let attrs = DataSourceAttrs {
            name: spec.name.clone(),
            kind: spec.kind.clone(),
            options: spec.options.clone(),
        };

        let Some(existing) = self.api.datasource_by_name(&spec.name)? else {
            let created = self.api.create_datasource(&attrs)?;
            info!(name = %spec.name, id = created.id, "datasource created");
            return Ok(ChangeReport::changed(
                &spec.name,
                "Datasource created",
                None::<&DataSource>,
                Some(&created),
            ));
        };

        if !spec.force && !datasource_differs(spec, &existing) {
            return Ok(ChangeReport::unchanged(
                &spec.name,
                "Datasource is already present",
            ));
        }

        let updated = self.api.replace_datasource(existing.id, &attrs)?;
        info!(name = %spec.name, id = existing.id, force = spec.force, "datasource updated");
        Ok(ChangeReport::changed(
            &spec.name,
            "Datasource updated",
            Some(&existing),
            Some(&updated),
        ))
    }

    fn remove_datasource(&self, name: &str) -> Result<ChangeReport> {
        let Some(existing) = self.api.datasource_by_name(name)? else {
            return Ok(ChangeReport::unchanged(name, "Datasource is already absent"));
        };

        self.api.delete_datasource(existing.id)?;
        info!(name, id = existing.id, "datasource removed");
        Ok(ChangeReport::changed(
            name,
            "Datasource removed",
            Some(&existing),
            None::<&DataSource>,
        ))
    }
}

fn datasource_differs(spec: &DataSourceSpec, observed: &DataSource) -> bool {
    spec.kind != observed.kind
        || !structurally_equal(&spec.options, &observed.options, SECRET_FIELDS)
}
