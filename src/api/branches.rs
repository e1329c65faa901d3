use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::api::filters::FilterSet;
use crate::api::meest::MeestExpress;
use crate::cache::store::TokenStore;
use crate::error::{MeestError, Result};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{BRANCH_SEARCH_PATH, TOKEN_HEADER};

#[derive(Serialize)]
struct BranchSearchRequest<'a> {
    filters: &'a FilterSet,
}

impl<S: TokenStore> MeestExpress<S> {
    /// Branch search with errors surfaced.
    ///
    /// The response body is returned as the carrier sent it.
    pub async fn try_get_branches(&mut self, filters: &FilterSet) -> Result<Value> {
        get_metrics().await.branch_search_requests.inc();

        let token = self.tokens.get_token().await?;
        let response = self
            .client
            .post_json(BRANCH_SEARCH_PATH, &BranchSearchRequest { filters })?
            .header(TOKEN_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeestError::Status(status));
        }

        let body = response.text().await?;
        let branches: Value = serde_json::from_str(&body)
            .map_err(|e| MeestError::Response(format!("branch search body is not JSON: {}", e)))?;
        debug!(filters = filters.len(), "branch search answered");
        Ok(branches)
    }

    /// Branch search that never fails: any error, including missing
    /// credentials, yields an empty JSON array and is reported in the log.
    pub async fn get_branches(&mut self, filters: &FilterSet) -> Value {
        match self.try_get_branches(filters).await {
            Ok(branches) => branches,
            Err(e) => {
                get_metrics()
                    .await
                    .branch_search_failures
                    .with_label_values(&[e.reason()])
                    .inc();
                if self.debug {
                    error!(reason = e.reason(), error = ?e, "branch search failed");
                } else {
                    warn!(reason = e.reason(), error = %e, "branch search failed, returning empty result");
                }
                Value::Array(Vec::new())
            }
        }
    }
}
