use std::sync::Arc;

use anyhow::Result;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Authentication
    pub auth_requests: IntCounter,
    pub auth_failures: IntCounterVec,
    pub token_expiry_unix: IntGauge,

    // Token store: hit | miss | stale | error
    pub token_store_lookups: IntCounterVec,
    pub token_store_write_failures: IntCounter,

    // Branch search
    pub branch_search_requests: IntCounter,
    pub branch_search_failures: IntCounterVec,
}

impl Metrics {
    // metric definitions are static, a failure here is a programming error
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("meestexpress".into()), None)
            .expect("valid registry prefix");

        let metrics: Arc<Metrics> = Arc::new(Self {
            auth_requests: IntCounter::new("auth_requests_total", "Authentication calls issued").expect("valid metric"),
            auth_failures: IntCounterVec::new(Opts::new("auth_failures_total", "Failed token acquisitions by reason"), &["reason"]).expect("valid metric"),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the token in use").expect("valid metric"),

            token_store_lookups: IntCounterVec::new(Opts::new("token_store_lookups_total", "Shared token record lookups by result"), &["result"]).expect("valid metric"),
            token_store_write_failures: IntCounter::new("token_store_write_failures_total", "Failed writes of the shared token record").expect("valid metric"),

            branch_search_requests: IntCounter::new("branch_search_requests_total", "Branch searches attempted").expect("valid metric"),
            branch_search_failures: IntCounterVec::new(Opts::new("branch_search_failures_total", "Branch searches answered with an empty result, by reason"), &["reason"]).expect("valid metric"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.auth_requests.clone()),
            Box::new(metrics.auth_failures.clone()),
            Box::new(metrics.token_expiry_unix.clone()),
            Box::new(metrics.token_store_lookups.clone()),
            Box::new(metrics.token_store_write_failures.clone()),
            Box::new(metrics.branch_search_requests.clone()),
            Box::new(metrics.branch_search_failures.clone()),
        ];
        for collector in collectors {
            reg.register(collector).expect("metric registered once");
        }

        metrics
    }

    /// Prometheus text exposition of every registered metric
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
