use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use redash_converge::cli::{
    DatasourceCommands, GroupCommands, ListKind, QueryCommands, UserCommands, connect,
    load_config, run_apply, run_datasource, run_group, run_list, run_query, run_user,
};
use redash_converge::config::ConfigSource;

#[derive(Parser)]
#[command(name = "redash-converge")]
#[command(about = "Converge Redash resources to a declared state", long_about = None)]
struct Cli {
    /// Base URL of the Redash API (e.g. "https://redash.example.com/api")
    #[arg(long, env = "REDASH_API_URL", global = true)]
    api_url: Option<String>,

    /// Redash API key
    #[arg(long, env = "REDASH_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Converge every resource declared in a state file
    Apply {
        /// YAML state file
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Manage datasources
    Datasource {
        #[command(subcommand)]
        command: DatasourceCommands,
    },

    /// Manage queries
    Query {
        #[command(subcommand)]
        command: QueryCommands,
    },

    /// Manage groups, their members and datasource access
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Print the current state of a resource collection as JSON
    List {
        #[arg(value_enum)]
        kind: ListKind,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("redash_converge=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = load_config(
        cli.config.as_deref(),
        ConfigSource {
            api_url: cli.api_url,
            api_key: cli.api_key,
            timeout_secs: cli.timeout,
        },
    )?;
    let reconciler = connect(&config)?;

    match cli.command {
        Commands::Apply { file } => run_apply(&reconciler, &file),
        Commands::Datasource { command } => run_datasource(&reconciler, command),
        Commands::Query { command } => run_query(&reconciler, command),
        Commands::Group { command } => run_group(&reconciler, command),
        Commands::User { command } => run_user(&reconciler, command),
        Commands::List { kind } => run_list(reconciler.api(), kind),
    }
}
