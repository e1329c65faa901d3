use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::client::ApiClient;
use crate::error::{MeestError, Result};
use crate::utils::constants::AUTH_PATH;

#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// `{"result": {"token": "..."}}`, anything else is rejected
#[derive(Deserialize)]
struct AuthResponse {
    result: Option<AuthResult>,
}

#[derive(Deserialize)]
struct AuthResult {
    token: Option<String>,
}

impl ApiClient {
    /// Exchange credentials for a fresh token. Every failure maps to
    /// [`MeestError::Authentication`]; there is no retry.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        let request = self.post_json(AUTH_PATH, &AuthRequest { username, password })?;

        let response = request
            .send()
            .await
            .map_err(|e| MeestError::Authentication(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeestError::Authentication(format!("HTTP request failed: {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MeestError::Authentication(format!("cannot read response: {}", e)))?;
        let parsed: AuthResponse = serde_json::from_str(&body)
            .map_err(|e| MeestError::Authentication(format!("response is not valid JSON: {}", e)))?;

        let token = parsed
            .result
            .and_then(|result| result.token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| MeestError::Authentication("response has no result.token".to_owned()))?;

        debug!(username, "authenticated against the carrier api");
        Ok(token)
    }
}
