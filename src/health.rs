use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::auth::SessionStore;
use crate::models::Entity;
use crate::store::EntityStore;

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// Components that can report their own status implement `HealthCheckable`.
// The metrics server aggregates them into a single report on /health.
//
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Health information for a component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Trait for components that can report their health status
pub trait HealthCheckable: Send + Sync {
    fn check_health(&self) -> ComponentHealth;

    fn component_name(&self) -> &str;
}

impl<E: Entity> HealthCheckable for EntityStore<E> {
    fn check_health(&self) -> ComponentHealth {
        ComponentHealth::new(self.component_name(), HealthStatus::Healthy)
            .with_details(format!("{} entities", self.len()))
    }

    fn component_name(&self) -> &str {
        E::COLLECTION
    }
}

impl HealthCheckable for SessionStore {
    fn check_health(&self) -> ComponentHealth {
        ComponentHealth::new(self.component_name(), HealthStatus::Healthy)
            .with_details(format!("{} active sessions", self.active_count()))
    }

    fn component_name(&self) -> &str {
        "sessions"
    }
}

/// Aggregated view over every registered component
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: Vec<ComponentHealth>,
    pub check_time: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct HealthRegistry {
    components: Vec<Arc<dyn HealthCheckable>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, component: Arc<dyn HealthCheckable>) -> Self {
        self.components.push(component);
        self
    }

    pub fn check(&self) -> SystemHealth {
        let components: Vec<ComponentHealth> = self
            .components
            .iter()
            .map(|component| component.check_health())
            .collect();

        SystemHealth {
            overall_status: compute_overall_status(&components),
            components,
            check_time: Utc::now(),
        }
    }
}

fn compute_overall_status(components: &[ComponentHealth]) -> HealthStatus {
    let mut has_degraded = false;
    let mut unhealthy_components = Vec::new();

    for health in components {
        match &health.status {
            HealthStatus::Unhealthy(msg) => {
                unhealthy_components.push(format!("{}: {}", health.name, msg));
            }
            HealthStatus::Degraded(_) => {
                has_degraded = true;
            }
            HealthStatus::Healthy => {}
        }
    }

    if !unhealthy_components.is_empty() {
        HealthStatus::Unhealthy(unhealthy_components.join(", "))
    } else if has_degraded {
        HealthStatus::Degraded("Some components degraded".to_string())
    } else {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    struct Failing;

    impl HealthCheckable for Failing {
        fn check_health(&self) -> ComponentHealth {
            ComponentHealth::new("failing", HealthStatus::Unhealthy("down".into()))
        }

        fn component_name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_store_reports_size() {
        let store = EntityStore::with_seed(vec![User::new(1, "John")]);
        let health = store.check_health();

        assert_eq!(health.name, "users");
        assert!(health.status.is_healthy());
        assert_eq!(health.details.as_deref(), Some("1 entities"));
    }

    #[test]
    fn test_overall_status_unhealthy_wins() {
        let registry = HealthRegistry::new()
            .register(Arc::new(EntityStore::<User>::with_seed(Vec::new())))
            .register(Arc::new(Failing));

        let report = registry.check();
        assert_eq!(report.components.len(), 2);
        assert_eq!(
            report.overall_status,
            HealthStatus::Unhealthy("failing: down".to_string())
        );
    }

    #[test]
    fn test_empty_registry_is_healthy() {
        assert!(HealthRegistry::new().check().overall_status.is_healthy());
    }
}
