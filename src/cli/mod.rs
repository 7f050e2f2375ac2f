mod apply;
mod commands;
mod converge;
mod list;
mod output;

pub use apply::run_apply;
pub use commands::{DatasourceCommands, GroupCommands, ListKind, QueryCommands, UserCommands};
pub use converge::{run_datasource, run_group, run_query, run_user};
pub use list::run_list;

use std::path::Path;

use crate::client::{Client, HttpTransport};
use crate::config::{ApiConfig, ConfigSource, default_config_path};
use crate::reconcile::Reconciler;

/// Resolves the API configuration: the config file (explicit, or the default
/// location if it exists) overridden by command-line values.
pub fn load_config(path: Option<&Path>, overrides: ConfigSource) -> anyhow::Result<ApiConfig> {
    let file = match path {
        Some(path) => ConfigSource::from_file(path)
            .map_err(|e| anyhow::anyhow!("Could not read config {}: {e}", path.display()))?,
        None => match default_config_path() {
            Ok(path) => ConfigSource::from_optional_file(&path)?,
            Err(_) => ConfigSource::default(),
        },
    };

    file.merge(overrides).resolve().map_err(|e| {
        anyhow::anyhow!(
            "{e}. Pass --api-url and --api-key, set REDASH_API_URL and REDASH_API_KEY, or use a config file."
        )
    })
}

pub fn connect(config: &ApiConfig) -> anyhow::Result<Reconciler<Client<HttpTransport>>> {
    let transport = HttpTransport::new(config)?;
    Ok(Reconciler::new(Client::new(transport)))
}
