use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row, SqliteExecutor};

use storepulse_core::domain::sales::{
    DateRange, SalesRecord, SalesRecordId, SellerId, StoreId, UserId,
};
use storepulse_core::domain::store::{Seller, Store, StoreRoster};
use storepulse_core::errors::ApplicationError;
use storepulse_core::scheduler::{SalesRecordSource, UserDirectory};

use super::RepositoryError;
use crate::DbPool;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Record store backed by SQLite. Read-only from the engine's side; the write
/// helpers exist for ingestion and fixtures.
pub struct SqlSalesRepository {
    pool: DbPool,
}

impl SqlSalesRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn save_user(
        &self,
        user_id: &UserId,
        display_name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        upsert_user(&self.pool, user_id, display_name, created_at).await
    }

    pub async fn save_store(
        &self,
        user_id: &UserId,
        store: &Store,
        position: u32,
    ) -> Result<(), RepositoryError> {
        upsert_store(&self.pool, user_id, store, position).await
    }

    pub async fn save_seller(
        &self,
        user_id: &UserId,
        seller: &Seller,
        position: u32,
    ) -> Result<(), RepositoryError> {
        upsert_seller(&self.pool, user_id, seller, position).await
    }

    pub async fn save_sales_record(
        &self,
        user_id: &UserId,
        record: &SalesRecord,
    ) -> Result<(), RepositoryError> {
        upsert_sales_record(&self.pool, user_id, record).await
    }

    pub async fn has_user(&self, user_id: &UserId) -> Result<bool, RepositoryError> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_user WHERE id = ?)")
            .bind(&user_id.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists == 1)
    }

    pub async fn fetch_records(
        &self,
        user_id: &UserId,
        range: DateRange,
    ) -> Result<Vec<SalesRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, seller_id, store_id, record_date, visits, sales
             FROM sales_record
             WHERE user_id = ? AND record_date BETWEEN ? AND ?
             ORDER BY record_date ASC, id ASC",
        )
        .bind(&user_id.0)
        .bind(range.since.format(DATE_FORMAT).to_string())
        .bind(range.until.format(DATE_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(record_from_row).collect()
    }

    pub async fn fetch_roster(&self, user_id: &UserId) -> Result<StoreRoster, RepositoryError> {
        let store_rows = sqlx::query(
            "SELECT id, name, average_ticket
             FROM store
             WHERE user_id = ?
             ORDER BY position ASC, id ASC",
        )
        .bind(&user_id.0)
        .fetch_all(&self.pool)
        .await?;

        let seller_rows = sqlx::query(
            "SELECT id, store_id, name
             FROM seller
             WHERE user_id = ?
             ORDER BY position ASC, id ASC",
        )
        .bind(&user_id.0)
        .fetch_all(&self.pool)
        .await?;

        let stores = store_rows.into_iter().map(store_from_row).collect::<Result<Vec<_>, _>>()?;
        let sellers =
            seller_rows.into_iter().map(seller_from_row).collect::<Result<Vec<_>, _>>()?;

        Ok(StoreRoster::new(stores, sellers))
    }

    pub async fn fetch_user_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM app_user ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().map(UserId).collect())
    }
}

#[async_trait]
impl SalesRecordSource for SqlSalesRepository {
    async fn list_sales_records(
        &self,
        user_id: &UserId,
        range: DateRange,
    ) -> Result<Vec<SalesRecord>, ApplicationError> {
        self.fetch_records(user_id, range).await.map_err(RepositoryError::into_read_failure)
    }

    async fn store_roster(&self, user_id: &UserId) -> Result<StoreRoster, ApplicationError> {
        self.fetch_roster(user_id).await.map_err(RepositoryError::into_read_failure)
    }
}

#[async_trait]
impl UserDirectory for SqlSalesRepository {
    async fn list_user_ids(&self) -> Result<Vec<UserId>, ApplicationError> {
        self.fetch_user_ids().await.map_err(RepositoryError::into_read_failure)
    }

    async fn user_exists(&self, user_id: &UserId) -> Result<bool, ApplicationError> {
        self.has_user(user_id).await.map_err(RepositoryError::into_read_failure)
    }
}

// Ingestion writes take any executor so fixtures can run them inside one transaction.

pub async fn upsert_user<'e, E>(
    executor: E,
    user_id: &UserId,
    display_name: &str,
    created_at: DateTime<Utc>,
) -> Result<(), RepositoryError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO app_user (id, display_name, created_at)
         VALUES (?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET display_name = excluded.display_name",
    )
    .bind(&user_id.0)
    .bind(display_name)
    .bind(created_at.to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

/// `position` fixes the store's place in roster order.
pub async fn upsert_store<'e, E>(
    executor: E,
    user_id: &UserId,
    store: &Store,
    position: u32,
) -> Result<(), RepositoryError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO store (id, user_id, name, average_ticket, position)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            average_ticket = excluded.average_ticket,
            position = excluded.position",
    )
    .bind(&store.id.0)
    .bind(&user_id.0)
    .bind(&store.name)
    .bind(store.average_ticket.map(|ticket| ticket.to_string()))
    .bind(i64::from(position))
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn upsert_seller<'e, E>(
    executor: E,
    user_id: &UserId,
    seller: &Seller,
    position: u32,
) -> Result<(), RepositoryError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO seller (id, user_id, store_id, name, position)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            store_id = excluded.store_id,
            name = excluded.name,
            position = excluded.position",
    )
    .bind(&seller.id.0)
    .bind(&user_id.0)
    .bind(&seller.store_id.0)
    .bind(&seller.name)
    .bind(i64::from(position))
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn upsert_sales_record<'e, E>(
    executor: E,
    user_id: &UserId,
    record: &SalesRecord,
) -> Result<(), RepositoryError>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO sales_record (id, user_id, seller_id, store_id, record_date, visits, sales)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            seller_id = excluded.seller_id,
            store_id = excluded.store_id,
            record_date = excluded.record_date,
            visits = excluded.visits,
            sales = excluded.sales",
    )
    .bind(&record.id.0)
    .bind(&user_id.0)
    .bind(&record.seller_id.0)
    .bind(&record.store_id.0)
    .bind(record.date.format(DATE_FORMAT).to_string())
    .bind(i64::from(record.visits))
    .bind(i64::from(record.sales))
    .execute(executor)
    .await?;

    Ok(())
}

fn record_from_row(row: SqliteRow) -> Result<SalesRecord, RepositoryError> {
    Ok(SalesRecord {
        id: SalesRecordId(row.try_get("id")?),
        seller_id: SellerId(row.try_get("seller_id")?),
        store_id: StoreId(row.try_get("store_id")?),
        date: parse_date("record_date", row.try_get("record_date")?)?,
        visits: parse_u32("visits", row.try_get("visits")?)?,
        sales: parse_u32("sales", row.try_get("sales")?)?,
    })
}

fn store_from_row(row: SqliteRow) -> Result<Store, RepositoryError> {
    let average_ticket = row
        .try_get::<Option<String>, _>("average_ticket")?
        .map(|raw| {
            Decimal::from_str(raw.trim()).map_err(|error| {
                RepositoryError::Decode(format!("invalid average_ticket `{raw}` ({error})"))
            })
        })
        .transpose()?;

    Ok(Store { id: StoreId(row.try_get("id")?), name: row.try_get("name")?, average_ticket })
}

fn seller_from_row(row: SqliteRow) -> Result<Seller, RepositoryError> {
    Ok(Seller {
        id: SellerId(row.try_get("id")?),
        name: row.try_get("name")?,
        store_id: StoreId(row.try_get("store_id")?),
    })
}

fn parse_u32(column: &str, value: i64) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| {
        RepositoryError::Decode(format!(
            "invalid value for `{column}` (expected non-negative u32): {value}"
        ))
    })
}

fn parse_date(column: &str, value: String) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|error| {
        RepositoryError::Decode(format!("invalid date in `{column}`: `{value}` ({error})"))
    })
}
