use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use storepulse_db::{migrations, ping, DbPool};
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatabaseHealth {
    pub status: &'static str,
    pub detail: String,
    pub pool_size: u32,
    pub pool_idle: usize,
}

/// Batch and interactive generation both need every embedded migration applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SchemaHealth {
    pub status: &'static str,
    pub applied: Vec<i64>,
    pub pending: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: DatabaseHealth,
    pub schema: SchemaHealth,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let schema = if database.status == "ready" {
        schema_check(&state.db_pool).await
    } else {
        SchemaHealth { status: "unknown", applied: Vec::new(), pending: Vec::new() }
    };
    let ready = database.status == "ready" && schema.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        database,
        schema,
        checked_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> DatabaseHealth {
    let (status, detail) = match ping(pool).await {
        Ok(()) => ("ready", "database query succeeded".to_string()),
        Err(error) => {
            warn!(
                event_name = "system.health.database_degraded",
                error = %error,
                "health check could not reach the database"
            );
            ("degraded", format!("database query failed: {error}"))
        }
    };

    DatabaseHealth { status, detail, pool_size: pool.size(), pool_idle: pool.num_idle() }
}

async fn schema_check(pool: &DbPool) -> SchemaHealth {
    match migrations::status(pool).await {
        Ok(status) if status.is_current() => {
            SchemaHealth { status: "ready", applied: status.applied, pending: status.pending }
        }
        Ok(status) => {
            warn!(
                event_name = "system.health.schema_behind",
                pending = ?status.pending,
                "database is missing migrations"
            );
            SchemaHealth { status: "degraded", applied: status.applied, pending: status.pending }
        }
        Err(error) => {
            warn!(
                event_name = "system.health.schema_unreadable",
                error = %error,
                "could not read migration history"
            );
            SchemaHealth { status: "degraded", applied: Vec::new(), pending: Vec::new() }
        }
    }
}
