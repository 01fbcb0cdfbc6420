//! Domain layer health check functionality
//! Reports whether the database answers and how long the process has been up.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tracing::warn;

use crate::database::DatabasePool;

static START_TIME: OnceCell<Instant> = OnceCell::new();

/// Record the process start. Later calls keep the first instant.
pub fn initialize_start_time() {
    START_TIME.get_or_init(Instant::now);
}

/// Seconds since `initialize_start_time`, if it was called
pub fn uptime_seconds() -> Option<u64> {
    START_TIME.get().map(|start| start.elapsed().as_secs())
}

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Healthy => "ok",
            ComponentStatus::Degraded => "degraded",
            ComponentStatus::Unhealthy => "error",
        }
    }
}

/// A health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Component name to health
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Worst component status wins
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };
        Self { status, components }
    }
}

#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    async fn get_system_health(&self) -> SystemHealth;

    /// Ok with pool details when the database answers a query
    async fn check_database_status(&self) -> Result<String, String>;
}

/// Health checks against the shared connection pool
#[derive(Debug, Clone)]
pub struct HealthService {
    pool: DatabasePool,
}

impl HealthService {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let database = match self.check_database_status().await {
            Ok(info) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(info),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let mut components = HashMap::new();
        components.insert("database".to_string(), database);
        components.insert(
            "api".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );
        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<String, String> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            pool.ping().map(|_| pool.connection_info()).map_err(|e| {
                warn!("Database health check failed: {}", e);
                format!("Database connection error: {}", e)
            })
        })
        .await
        .map_err(|e| format!("Database health check did not complete: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_healthy() {
        let service = HealthService::new(DatabasePool::in_memory().unwrap());
        let health = service.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        let database = &health.components["database"];
        assert_eq!(database.status, ComponentStatus::Healthy);
        assert!(database.details.as_deref().unwrap_or_default().contains(":memory:"));
    }

    #[test]
    fn test_worst_component_wins() {
        let mut components = HashMap::new();
        components.insert(
            "api".to_string(),
            HealthComponent { status: ComponentStatus::Healthy, details: None },
        );
        components.insert(
            "database".to_string(),
            HealthComponent { status: ComponentStatus::Degraded, details: None },
        );
        assert_eq!(SystemHealth::from_components(components.clone()).status, SystemStatus::Degraded);

        components.insert(
            "database".to_string(),
            HealthComponent { status: ComponentStatus::Unhealthy, details: Some("down".into()) },
        );
        assert_eq!(SystemHealth::from_components(components).status, SystemStatus::Unhealthy);
    }

    #[test]
    fn test_uptime_after_start() {
        initialize_start_time();
        assert!(uptime_seconds().is_some());
    }
}
