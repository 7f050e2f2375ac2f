use clap::{Subcommand, ValueEnum};

use crate::types::Options;

fn parse_options(input: &str) -> Result<Options, String> {
    serde_json::from_str(input).map_err(|e| format!("options must be a JSON object: {e}"))
}

#[derive(Subcommand)]
pub enum DatasourceCommands {
    /// Ensure a datasource exists with the given type and options
    Present {
        /// Datasource name
        #[arg(long)]
        name: String,

        /// Datasource type (e.g. "pg", "mysql")
        #[arg(long = "type")]
        kind: String,

        /// Connection options as a JSON object
        #[arg(long, value_parser = parse_options, default_value = "{}")]
        options: Options,

        /// Replace the datasource even if it looks up to date (e.g. to rotate a password)
        #[arg(long)]
        force: bool,
    },

    /// Ensure a datasource does not exist
    Absent {
        /// Datasource name
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Ensure a query exists with the given text and settings
    Present {
        /// Query name
        #[arg(long)]
        name: String,

        /// Name of the datasource the query runs against
        #[arg(long)]
        datasource: String,

        /// Query text
        #[arg(long)]
        query: String,

        /// Query description
        #[arg(long)]
        description: Option<String>,

        /// Query options as a JSON object
        #[arg(long, value_parser = parse_options, default_value = "{}")]
        options: Options,

        /// Refresh schedule
        #[arg(long)]
        schedule: Option<String>,

        /// Keep the query as an unpublished draft
        #[arg(long)]
        draft: bool,
    },

    /// Archive a query
    Absent {
        /// Query name
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Ensure a group exists with exactly the given members and datasources
    Present {
        /// Group name
        #[arg(long)]
        name: String,

        /// Member email (repeatable)
        #[arg(long = "member")]
        members: Vec<String>,

        /// Datasource with full access (repeatable)
        #[arg(long = "datasource")]
        datasources: Vec<String>,

        /// Datasource with view-only access (repeatable)
        #[arg(long = "view-only")]
        view_only: Vec<String>,
    },

    /// Ensure a group does not exist
    Absent {
        /// Group name
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Ensure a user exists with the given display name
    Present {
        /// User email
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long)]
        name: String,
    },

    /// Ensure a user does not exist
    Absent {
        /// User email
        #[arg(long)]
        email: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    Datasources,
    Queries,
    Groups,
    Users,
    Dashboards,
    Alerts,
}
