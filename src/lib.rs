//! # redash-converge
//!
//! Converges Redash datasources, queries, users and groups to a declared
//! state and reports exactly what changed.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! redash-converge = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use redash_converge::client::{Client, HttpTransport};
//! use redash_converge::config::ConfigSource;
//! use redash_converge::reconcile::Reconciler;
//! use redash_converge::types::DataSourceSpec;
//!
//! let config = ConfigSource {
//!     api_url: Some("https://redash.example.com/api".into()),
//!     api_key: Some(api_key),
//!     timeout_secs: None,
//! }
//! .resolve()?;
//!
//! let reconciler = Reconciler::new(Client::new(HttpTransport::new(&config)?));
//! let report = reconciler.datasource_present(&DataSourceSpec {
//!     name: "prod-pg".into(),
//!     kind: "pg".into(),
//!     options: serde_json::from_str(r#"{"host": "db.internal", "dbname": "app"}"#)?,
//!     force: false,
//! })?;
//! println!("{}: {}", report.name, report.message);
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod config;
pub mod declare;
pub mod diff;
pub mod error;
pub mod reconcile;
pub mod report;
pub mod types;
