//! Entry point tying configuration, transport and token cache together.

use anyhow::Result;

use crate::api::client::ApiClient;
use crate::cache::store::{TokenStore, TokenStoreKind};
use crate::cache::token_cache::TokenCache;
use crate::config::settings::ServiceConfig;

/// Meest Express API client.
///
/// Single owner: every operation takes `&mut self`, nothing inside locks.
#[derive(Debug)]
pub struct MeestExpress<S = TokenStoreKind> {
    pub(crate) client: ApiClient,
    pub(crate) tokens: TokenCache<S>,
    pub(crate) debug: bool,
}

impl MeestExpress<TokenStoreKind> {
    /// Client with the token store named in the configuration
    pub fn new(service_config: &ServiceConfig) -> Result<Self> {
        let store = TokenStoreKind::from_config(&service_config.token_store);
        Self::with_store(service_config, store)
    }
}

impl<S: TokenStore> MeestExpress<S> {
    pub fn with_store(service_config: &ServiceConfig, store: S) -> Result<Self> {
        let client = ApiClient::new(&service_config.api)?;
        let tokens = TokenCache::new(service_config.credentials.clone(), client.clone(), store);
        Ok(Self {
            client,
            tokens,
            debug: service_config.debug,
        })
    }

    /// Current bearer token, authenticating if needed
    pub async fn get_token(&mut self) -> crate::error::Result<String> {
        self.tokens.get_token().await
    }

    pub fn token_cache(&self) -> &TokenCache<S> {
        &self.tokens
    }
}
