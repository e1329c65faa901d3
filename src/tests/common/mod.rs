// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::TimeDelta;
use serde_json::Value;

use crate::api::client::ApiClient;
use crate::cache::store::TokenStore;
use crate::cache::token::{CachedTokenRecord, Token};
use crate::config::settings::{ApiConfig, Credentials, ServiceConfig, TokenStoreConfig};
use crate::helpers::time;

pub const TEST_USER: &str = "shop@example.com";
pub const TEST_PASSWORD: &str = "s3cret";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn test_credentials() -> Credentials {
    Credentials::new(Some(TEST_USER.to_owned()), Some(TEST_PASSWORD.to_owned()))
}

pub fn test_api(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_owned(),
        timeout_seconds: 5,
    }
}

pub fn test_client(base_url: &str) -> ApiClient {
    ApiClient::new(&test_api(base_url)).expect("api client")
}

/// Memory store, valid credentials, mock server as base url
pub fn test_config(base_url: &str) -> ServiceConfig {
    ServiceConfig {
        api: test_api(base_url),
        credentials: test_credentials(),
        debug: false,
        logging: None,
        token_store: TokenStoreConfig::Memory,
    }
}

pub fn auth_body() -> Value {
    json!({"username": TEST_USER, "password": TEST_PASSWORD})
}

pub fn auth_reply(token: &str) -> Value {
    json!({"status": "OK", "result": {"token": token, "refreshToken": "unused"}})
}

/// Shared record expiring `offset` from now; negative offsets give stale records
pub fn record(token: &str, offset: TimeDelta) -> Value {
    CachedTokenRecord::from(&Token::new(token.to_owned(), time::now() + offset)).to_value()
}

/// Store whose every operation errors, counting the attempts
#[derive(Debug, Clone, Default)]
pub struct FailingTokenStore {
    pub reads: Arc<AtomicUsize>,
    pub writes: Arc<AtomicUsize>,
}

impl FailingTokenStore {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl TokenStore for FailingTokenStore {
    async fn get(&self, _key: &str) -> Result<Option<Value>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("token store offline"))
    }

    async fn put(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("token store offline"))
    }

    async fn has(&self, _key: &str) -> Result<bool> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("token store offline"))
    }
}
