//! Health check module
//! Provides health status for the application and its dependencies

use crate::database;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Health status response
#[derive(Debug, Serialize, Clone)]
pub struct HealthStatus {
    pub status: HealthState,
    pub checks: HashMap<String, ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Overall health state
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

/// Individual component health status
#[derive(Debug, Serialize, Clone)]
pub struct ComponentHealth {
    pub status: ComponentState,
    pub response_time_ms: Option<u128>,
    pub details: Option<String>,
}

/// Component state
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Up,
    Down,
}

impl ComponentHealth {
    pub fn up(response_time_ms: Option<u128>) -> Self {
        Self {
            status: ComponentState::Up,
            response_time_ms,
            details: None,
        }
    }

    pub fn down(details: String) -> Self {
        Self {
            status: ComponentState::Down,
            response_time_ms: None,
            details: Some(details),
        }
    }
}

/// Runs readiness checks against the service's dependencies.
#[derive(Clone)]
pub struct HealthChecker {
    pool: PgPool,
    check_timeout: Duration,
}

impl HealthChecker {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            check_timeout: Duration::from_secs(5),
        }
    }

    pub async fn check(&self) -> HealthStatus {
        let mut checks = HashMap::new();

        let started = Instant::now();
        let database_health =
            match timeout(self.check_timeout, database::health_check(&self.pool)).await {
                Ok(Ok(())) => ComponentHealth::up(Some(started.elapsed().as_millis())),
                Ok(Err(e)) => ComponentHealth::down(e.to_string()),
                Err(_) => ComponentHealth::down("health check timed out".to_string()),
            };
        checks.insert("database".to_string(), database_health);

        let status = if checks.values().all(|c| c.status == ComponentState::Up) {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        };

        HealthStatus {
            status,
            checks,
            timestamp: chrono::Utc::now(),
        }
    }
}
