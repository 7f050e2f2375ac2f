use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the Redash API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. "https://redash.example.com/api".
    pub api_url: String,
    pub api_key: String,
    /// Deadline for each HTTP request.
    pub timeout_secs: u64,
}

/// A partially specified configuration, as found in a config file or on the
/// command line. Later sources override earlier ones field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    redash: ConfigSource,
}

/// Default config file location, e.g. `~/.config/redash-converge/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "redash-converge").ok_or_else(|| {
        Error::Config("could not determine config directory, is $HOME set?".into())
    })?;
    Ok(dirs.config_dir().join("config.toml"))
}

impl ConfigSource {
    /// Reads the `[redash]` table of a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Ok(file.redash)
    }

    /// Like [`ConfigSource::from_file`], but a missing file yields an empty source.
    pub fn from_optional_file(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    #[must_use]
    pub fn merge(self, overrides: ConfigSource) -> Self {
        Self {
            api_url: overrides.api_url.or(self.api_url),
            api_key: overrides.api_key.or(self.api_key),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    pub fn resolve(self) -> Result<ApiConfig> {
        let api_url = self
            .api_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Config("api_url is not set".into()))?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api_url must start with http:// or https://, got '{api_url}'"
            )));
        }

        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("api_key is not set".into()))?;

        let timeout_secs = match self.timeout_secs {
            Some(0) => return Err(Error::Config("timeout_secs must be positive".into())),
            Some(secs) => secs,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(ApiConfig {
            api_url,
            api_key,
            timeout_secs,
        })
    }
}
