use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::debug;

use super::Transport;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Blocking HTTP transport authenticating with a static API key.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(AUTHORIZATION, format!("Key {}", self.api_key))
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, page: Option<u32>) -> Result<Value> {
        let mut request = self.authorized(self.client.get(self.url(path)));
        if let Some(page) = page {
            request = request.query(&[("page", page)]);
        }
        let resp = request.send()?;
        let status = resp.status();
        debug!(%status, path, ?page, "GET");

        // 404 bodies are error-shaped and classified as empty by the caller.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            read_body(resp)
        } else {
            Err(server_error(status, resp))
        }
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        debug!(path, %body, "POST");
        let resp = self
            .authorized(self.client.post(self.url(path)))
            .json(body)
            .send()?;
        let status = resp.status();
        debug!(%status, path, "POST");

        // Redash answers every successful create and replace with 200.
        if status == StatusCode::OK {
            read_body(resp)
        } else {
            Err(server_error(status, resp))
        }
    }

    fn delete(&self, path: &str) -> Result<()> {
        let resp = self.authorized(self.client.delete(self.url(path))).send()?;
        let status = resp.status();
        debug!(%status, path, "DELETE");

        if status == StatusCode::NO_CONTENT || status == StatusCode::OK {
            Ok(())
        } else {
            Err(server_error(status, resp))
        }
    }
}

fn read_body(resp: Response) -> Result<Value> {
    let bytes = resp.bytes()?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

fn server_error(status: StatusCode, resp: Response) -> Error {
    let message = resp
        .bytes()
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
        .and_then(|body| body.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| format!("{status} (no details provided)"));
    Error::Server { message }
}
