use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

use crate::utils::constants::{
    DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_TOKEN_STORE_FILE, ENV_DEBUG, ENV_LOGIN,
    ENV_PASSWORD,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub debug: bool,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub token_store: TokenStoreConfig,
}

impl ServiceConfig {
    /// Build the configuration purely from the process environment.
    /// The token is shared through a file in the system temp dir.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::default(),
            credentials: Credentials::new(
                std::env::var(ENV_LOGIN).ok(),
                std::env::var(ENV_PASSWORD).ok(),
            ),
            debug: std::env::var(ENV_DEBUG)
                .map(|raw| parse_flag(&raw))
                .unwrap_or(false),
            logging: None,
            token_store: TokenStoreConfig::File {
                path: default_token_store_path(),
            },
        }
    }
}

/// ================================
/// Remote API
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// applied to connect and to the whole request
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// ================================
/// Credentials
/// ================================
#[derive(Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }

    /// Both identity and secret, when neither is blank
    pub fn pair(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|v| !v.is_empty())?;
        let password = self.password.as_deref().filter(|v| !v.is_empty())?;
        Some((username, password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// ================================
/// Token store
/// ================================
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TokenStoreConfig {
    /// shared by clones inside one process only
    #[default]
    Memory,
    /// JSON document on disk, shared by every process pointing at it
    File {
        #[serde(default = "default_token_store_path")]
        path: PathBuf,
    },
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    pub level: Option<String>, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: Option<String>, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

/// Loose truthiness for env sourced flags: `true`, `1`, `yes`, `on`
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        Some(RawFlag::Bool(value)) => value,
        Some(RawFlag::Int(value)) => value != 0,
        Some(RawFlag::Text(value)) => parse_flag(&value),
        None => false,
    })
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

pub fn default_token_store_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_TOKEN_STORE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_pair_requires_both_values() {
        let full = Credentials::new(Some("user".into()), Some("secret".into()));
        assert_eq!(full.pair(), Some(("user", "secret")));

        assert!(Credentials::new(Some("user".into()), None).pair().is_none());
        assert!(Credentials::new(Some("".into()), Some("secret".into())).pair().is_none());
        assert!(Credentials::default().pair().is_none());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new(Some("user".into()), Some("hunter2".into()));
        let printed = format!("{:?}", creds);
        assert!(printed.contains("user"));
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn flag_parsing_is_loose() {
        for raw in ["true", "TRUE", " 1 ", "yes", "on"] {
            assert!(parse_flag(raw), "{raw}");
        }
        for raw in ["false", "0", "", "nope"] {
            assert!(!parse_flag(raw), "{raw}");
        }
    }
}
