use tracing::{debug, info, warn};

use crate::api::client::ApiClient;
use crate::cache::store::TokenStore;
use crate::cache::token::{CachedTokenRecord, Token};
use crate::config::settings::Credentials;
use crate::error::{MeestError, Result};
use crate::helpers::time;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::TOKEN_CACHE_KEY;

/// Produces a valid bearer token, re-authenticating only when the shared
/// record and the in-memory token are both absent or expired.
///
/// There is no locking: two owners that both see an expired token will both
/// authenticate, and the store keeps whichever record lands last.
#[derive(Debug)]
pub struct TokenCache<S> {
    credentials: Credentials,
    client: ApiClient,
    store: S,
    current: Option<Token>,
}

impl<S: TokenStore> TokenCache<S> {
    pub fn new(credentials: Credentials, client: ApiClient, store: S) -> Self {
        Self {
            credentials,
            client,
            store,
            current: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Token held in memory, whether or not it is still valid
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    pub async fn get_token(&mut self) -> Result<String> {
        self.adopt_shared_token().await;

        if let Some(token) = self.current.as_ref().filter(|t| t.is_usable_at(time::now())) {
            return Ok(token.value.clone());
        }

        let token = self.authenticate().await?;
        self.publish(&token).await;
        let value = token.value.clone();
        self.current = Some(token);
        Ok(value)
    }

    /// Take over a still valid token another owner stored
    async fn adopt_shared_token(&mut self) {
        let metrics = get_metrics().await;

        let lookup = match self.store.has(TOKEN_CACHE_KEY).await {
            Ok(true) => self.store.get(TOKEN_CACHE_KEY).await,
            Ok(false) => Ok(None),
            Err(e) => Err(e),
        };

        let value = match lookup {
            Ok(Some(value)) => value,
            Ok(None) => {
                metrics.token_store_lookups.with_label_values(&["miss"]).inc();
                return;
            }
            Err(e) => {
                warn!(error = %e, key = TOKEN_CACHE_KEY, "token store lookup failed, treating as absent");
                metrics.token_store_lookups.with_label_values(&["error"]).inc();
                return;
            }
        };

        match CachedTokenRecord::from_value(value)
            .and_then(CachedTokenRecord::into_token)
            .filter(Token::is_usable)
        {
            Some(token) => {
                debug!(expires_at = %token.expires_at, "using shared token");
                metrics.token_store_lookups.with_label_values(&["hit"]).inc();
                metrics.token_expiry_unix.set(token.expires_at.timestamp());
                self.current = Some(token);
            }
            None => {
                debug!(key = TOKEN_CACHE_KEY, "shared token record is stale or malformed");
                metrics.token_store_lookups.with_label_values(&["stale"]).inc();
            }
        }
    }

    async fn authenticate(&self) -> Result<Token> {
        let metrics = get_metrics().await;

        let Some((username, password)) = self.credentials.pair() else {
            metrics.auth_failures.with_label_values(&["configuration"]).inc();
            return Err(MeestError::Configuration("invalid credentials".to_owned()));
        };

        metrics.auth_requests.inc();
        let value = self
            .client
            .authenticate(username, password)
            .await
            .inspect_err(|e| {
                metrics.auth_failures.with_label_values(&[e.reason()]).inc();
            })?;

        let token = Token::issued_now(value);
        metrics.token_expiry_unix.set(token.expires_at.timestamp());
        info!(expires_at = %token.expires_at, "new token acquired");
        Ok(token)
    }

    /// A failed write only costs other owners a re-authentication
    async fn publish(&self, token: &Token) {
        let record = CachedTokenRecord::from(token).to_value();
        if let Err(e) = self.store.put(TOKEN_CACHE_KEY, record, time::token_ttl()).await {
            warn!(error = %e, key = TOKEN_CACHE_KEY, "cannot store token record");
            get_metrics().await.token_store_write_failures.inc();
        }
    }
}
