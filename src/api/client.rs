use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;

use crate::config::settings::ApiConfig;
use crate::error::{MeestError, Result};

const JSON_MIME: &str = "application/json";

/// HTTP transport bound to the carrier's base url
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(api_config: &ApiConfig) -> Result<Self> {
        let timeout = Duration::from_secs(api_config.timeout_seconds);
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: parse_base_url(&api_config.base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// JSON POST to `path` relative to the base url
    pub(crate) fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<RequestBuilder> {
        let url = self.base_url.join(path).map_err(|e| {
            MeestError::Configuration(format!("cannot build url for '{}': {}", path, e))
        })?;
        Ok(self
            .http
            .post(url)
            .header(CONTENT_TYPE, JSON_MIME)
            .header(ACCEPT, JSON_MIME)
            .json(body))
    }
}

/// Relative joins drop the last path segment unless the base ends with `/`
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized)
        .map_err(|e| MeestError::Configuration(format!("invalid base url '{}': {}", raw, e)))
}
