mod api;

pub use api::{ApiConfig, ConfigSource, DEFAULT_TIMEOUT_SECS, default_config_path};
