// Private module declaration
mod server;

use prometheus::{IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry};

// Re-export for public API
pub use server::metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - CRUD requests per entity kind, operation and response status
// - Store sizes after each mutation
// - OAuth login outcomes
// - Live session count
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // CRUD Metrics
    pub crud_requests: IntCounterVec,
    pub store_entities: IntGaugeVec,

    // Auth Metrics
    pub oauth_logins: IntCounterVec,
    pub active_sessions: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let crud_requests = IntCounterVec::new(
            Opts::new("crud_requests_total", "Total CRUD requests handled"),
            &["kind", "operation", "status"],
        )?;
        registry.register(Box::new(crud_requests.clone()))?;

        let store_entities = IntGaugeVec::new(
            Opts::new("store_entities", "Entities currently held per store"),
            &["kind"],
        )?;
        registry.register(Box::new(store_entities.clone()))?;

        let oauth_logins = IntCounterVec::new(
            Opts::new("oauth_logins_total", "OAuth callback outcomes"),
            &["outcome"],
        )?;
        registry.register(Box::new(oauth_logins.clone()))?;

        let active_sessions = IntGauge::new("active_sessions", "Sessions currently live")?;
        registry.register(Box::new(active_sessions.clone()))?;

        Ok(Self {
            registry,
            crud_requests,
            store_entities,
            oauth_logins,
            active_sessions,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a CRUD request outcome
    pub fn record_crud(&self, kind: &str, operation: &str, status: u16) {
        self.crud_requests
            .with_label_values(&[kind, operation, &status.to_string()])
            .inc();
    }

    /// Helper to update a store size gauge
    pub fn set_store_size(&self, kind: &str, size: usize) {
        self.store_entities.with_label_values(&[kind]).set(size as i64);
    }

    /// Helper to record an OAuth callback outcome
    pub fn record_login(&self, outcome: &str) {
        self.oauth_logins.with_label_values(&[outcome]).inc();
    }

    pub fn set_active_sessions(&self, count: usize) {
        self.active_sessions.set(count as i64);
    }
}
