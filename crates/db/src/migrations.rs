use std::collections::BTreeSet;

use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Versions embedded in the binary, split by whether the database has applied them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationStatus {
    pub applied: Vec<i64>,
    pub pending: Vec<i64>,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }
}

pub async fn status(pool: &DbPool) -> Result<MigrationStatus, sqlx::Error> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(1) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    let recorded: BTreeSet<i64> = if tracked == 0 {
        BTreeSet::new()
    } else {
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1")
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect()
    };

    let (applied, pending): (Vec<i64>, Vec<i64>) = MIGRATOR
        .iter()
        .filter(|migration| migration.migration_type.is_up_migration())
        .map(|migration| migration.version)
        .partition(|version| recorded.contains(version));

    Ok(MigrationStatus { applied, pending })
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::{run_pending, status};
    use crate::{connect_with_settings, migrations::MIGRATOR};

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "app_user",
        "store",
        "seller",
        "sales_record",
        "insight_set",
        "idx_store_user_id",
        "idx_seller_user_id",
        "idx_sales_record_user_date",
    ];

    async fn table_count(pool: &sqlx::SqlitePool, name: &str) -> i64 {
        sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("check table")
        .get::<i64, _>("count")
    }

    #[tokio::test]
    async fn migrations_create_baseline_tables() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for table in ["app_user", "store", "seller", "sales_record", "insight_set"] {
            assert_eq!(table_count(&pool, table).await, 1, "missing table `{table}`");
        }
    }

    #[tokio::test]
    async fn status_reports_pending_until_migrations_run() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");

        let before = status(&pool).await.expect("status before");
        assert!(!before.is_current());
        assert!(before.applied.is_empty());
        assert_eq!(before.pending, vec![1]);

        run_pending(&pool).await.expect("run migrations");

        let after = status(&pool).await.expect("status after");
        assert!(after.is_current());
        assert_eq!(after.applied, vec![1]);
    }

    #[tokio::test]
    async fn insight_set_rejects_unknown_key_space() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        sqlx::query("INSERT INTO app_user (id, display_name, created_at) VALUES ('u1', 'U', 'now')")
            .execute(&pool)
            .await
            .expect("insert user");

        let result = sqlx::query(
            "INSERT INTO insight_set (user_id, key_space, key_value, insights_json, generated_at)
             VALUES ('u1', 'week', '2025-06-15', '[]', '2025-06-15T11:00:00Z')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn migrations_up_down_up_preserves_schema_signature() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        let initial_signature = managed_schema_signature(&pool).await;
        assert_eq!(
            initial_signature.len(),
            MANAGED_SCHEMA_OBJECTS.len(),
            "initial migration pass should create all managed schema objects",
        );

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");

        let after_down_signature = managed_schema_signature(&pool).await;
        assert!(
            after_down_signature.is_empty(),
            "managed schema objects should be removed after full undo",
        );

        run_pending(&pool).await.expect("re-run migrations");

        let after_second_up_signature = managed_schema_signature(&pool).await;
        assert_eq!(
            after_second_up_signature, initial_signature,
            "up/down/up should preserve migration-managed schema signature",
        );
    }

    async fn managed_schema_signature(pool: &sqlx::SqlitePool) -> Vec<(String, String, String)> {
        let mut signature: Vec<(String, String, String)> = sqlx::query(
            "SELECT type, name, IFNULL(sql, '') AS sql
             FROM sqlite_master
             WHERE type IN ('table', 'index')",
        )
        .fetch_all(pool)
        .await
        .expect("load schema objects")
        .into_iter()
        .filter_map(|row| {
            let name = row.get::<String, _>("name");
            if MANAGED_SCHEMA_OBJECTS.contains(&name.as_str()) {
                Some((row.get::<String, _>("type"), name, row.get::<String, _>("sql")))
            } else {
                None
            }
        })
        .collect();
        signature.sort();
        signature
    }
}
