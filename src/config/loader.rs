use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use reqwest::Url;
use tracing::{debug, error, info};

use crate::config::settings::{ServiceConfig, TokenStoreConfig};

/// Load from a YAML file when a path is given, from the environment otherwise
pub async fn run(config_path: Option<&str>) -> Result<ServiceConfig> {
    let service_config = match config_path {
        Some(path) => file_to_config(Path::new(path))
            .await
            .map_err(|e| anyhow!("Invalid config format: {:#}", e))?,
        None => {
            info!("no config file given, reading configuration from environment");
            ServiceConfig::from_env()
        }
    };
    validate_service_config(&service_config)?;
    Ok(service_config)
}

/// Load config from YAML file, expanding `${VAR}` and `${VAR:default}` first
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read config file {}", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;
    debug!(config = ?service_config, "config parsed");
    Ok(service_config)
}

/// Missing credentials are not rejected here; they surface on first token use.
pub fn validate_service_config(service_config: &ServiceConfig) -> Result<()> {
    let url = Url::parse(&service_config.api.base_url)
        .with_context(|| format!("api.base_url '{}' is not a valid url", service_config.api.base_url))?;
    if url.cannot_be_a_base() {
        bail!("api.base_url '{}' cannot be used as a base url", url);
    }
    if service_config.api.timeout_seconds == 0 {
        bail!("api.timeout_seconds must be greater than zero");
    }
    if let TokenStoreConfig::File { path } = &service_config.token_store {
        if path.as_os_str().is_empty() {
            bail!("token_store.path must not be empty");
        }
    }
    Ok(())
}

pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
