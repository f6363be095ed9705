//! Dependency health aggregation.
//!
//! Three distinct surfaces for orchestration: `/health` summarizes component
//! state, `/health/ready` gates traffic on database reachability, and
//! `/health/live` only proves the process is running and never performs I/O
//! (a liveness failure triggers a restart, a readiness failure only drains
//! traffic).

use crate::db::UserStore;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Operational,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub components: BTreeMap<&'static str, ComponentStatus>,
}

pub struct HealthReporter {
    users: Arc<dyn UserStore>,
}

impl HealthReporter {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Probes dependencies and aggregates them. A failed probe degrades the
    /// report, it never propagates.
    pub async fn check(&self) -> HealthReport {
        let database = match self.users.ping().await {
            Ok(()) => ComponentStatus::Operational,
            Err(e) => {
                warn!("Database health probe failed: {}", e);
                ComponentStatus::Unavailable
            }
        };

        let mut components = BTreeMap::new();
        components.insert("api", ComponentStatus::Operational);
        components.insert("database", database);

        let status = if components
            .values()
            .all(|s| *s == ComponentStatus::Operational)
        {
            OverallStatus::Healthy
        } else {
            OverallStatus::Degraded
        };

        HealthReport { status, components }
    }

    /// Strictly "is the database reachable".
    pub async fn ready(&self) -> Result<(), String> {
        self.users.ping().await.map_err(|e| e.to_string())
    }
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let report = state.health.check().await;
    HttpResponse::Ok().json(serde_json::json!({
        "status": report.status,
        "components": report.components,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn ready(state: web::Data<AppState>) -> HttpResponse {
    match state.health.ready().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ready": true })),
        Err(reason) => HttpResponse::ServiceUnavailable()
            .json(serde_json::json!({ "ready": false, "reason": reason })),
    }
}

/// No dependency checks, by design.
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "alive": true }))
}
