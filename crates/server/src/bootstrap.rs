use std::sync::Arc;

use storepulse_core::config::{AppConfig, ConfigError, LoadOptions};
use storepulse_core::errors::ApplicationError;
use storepulse_core::insights::InsightEngine;
use storepulse_core::scheduler::{BusinessClock, GenerationService};
use storepulse_db::{
    connect_with_config, migrations, DbPool, SqlInsightSetRepository, SqlSalesRepository,
};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub service: Arc<GenerationService>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("generation scheduler setup failed: {0}")]
    Scheduler(#[from] ApplicationError),
}

#[cfg(test)]
pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let service = Arc::new(generation_service(db_pool.clone(), &config)?);

    Ok(Application { config, db_pool, service })
}

pub fn generation_service(
    db_pool: DbPool,
    config: &AppConfig,
) -> Result<GenerationService, ApplicationError> {
    let clock = BusinessClock::from_config(&config.insights)?;
    let sales = Arc::new(SqlSalesRepository::new(db_pool.clone()));

    Ok(GenerationService::new(
        sales.clone(),
        Arc::new(SqlInsightSetRepository::new(db_pool)),
        sales,
        InsightEngine::from_config(&config.insights),
        clock,
    ))
}

#[cfg(test)]
mod tests {
    use storepulse_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap, BootstrapError};

    #[tokio::test]
    async fn bootstrap_fails_fast_on_invalid_slot_hour() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                daily_slot_hour: Some(24),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let error = result.err().expect("invalid slot hour should fail");
        assert!(matches!(error, BootstrapError::Config(_)));
        assert!(error.to_string().contains("daily_slot_hour"));
    }

    #[tokio::test]
    async fn bootstrap_applies_migrations_and_builds_the_service() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('app_user', 'sales_record', 'insight_set')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected baseline tables after bootstrap");
        assert_eq!(table_count, 3);
        let date = chrono::NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date");
        assert_eq!(
            app.service.clock().slot_for(date).instant().to_rfc3339(),
            "2025-06-15T11:00:00+00:00"
        );

        app.db_pool.close().await;
    }
}
