use thiserror::Error;

use crate::types::ResourceKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} '{key}' not found")]
    NotFound { kind: ResourceKind, key: String },

    #[error("server error: {message}")]
    Server { message: String },

    #[error("invalid desired state: {0}")]
    Validation(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid state file: {0}")]
    StateFile(#[from] serde_yaml::Error),

    #[error("{kind} '{name}': {source}")]
    Converge {
        kind: ResourceKind,
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn not_found(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Attaches the resource being converged. Already-wrapped errors are
    /// returned unchanged so the innermost context wins.
    #[must_use]
    pub fn in_context(self, kind: ResourceKind, name: &str) -> Self {
        match self {
            Self::Converge { .. } => self,
            other => Self::Converge {
                kind,
                name: name.to_string(),
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
