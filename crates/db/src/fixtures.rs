use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;

use storepulse_core::domain::sales::{SalesRecord, SalesRecordId, SellerId, StoreId, UserId};
use storepulse_core::domain::store::{Seller, Store, StoreRoster};

use crate::connection::DbPool;
use crate::repositories::sales::{upsert_sales_record, upsert_seller, upsert_store, upsert_user};
use crate::repositories::{InMemorySalesRepository, RepositoryError};

pub const DEMO_USER_ID: &str = "demo-user";
pub const DEMO_DAYS: u64 = 21;

const DEMO_STORES: &[(&str, &str, Option<i64>)] =
    &[("store-centro", "Centro", Some(14990)), ("store-shopping", "Shopping Norte", None)];

const DEMO_SELLERS: &[(&str, &str, &str)] = &[
    ("seller-ana", "Ana Souza", "store-centro"),
    ("seller-bruno", "Bruno Lima", "store-centro"),
    ("seller-carla", "Carla Dias", "store-shopping"),
    ("seller-diego", "Diego Alves", "store-shopping"),
];

/// Deterministic demo data: two stores (one without an average ticket), four
/// sellers and three weeks of daily records ending on the reference date.
///
/// Mondays convert noticeably worse so the weak-weekday card has something to say.
#[derive(Clone, Debug)]
pub struct DemoDataset {
    reference: NaiveDate,
}

impl DemoDataset {
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    pub fn user_id(&self) -> UserId {
        UserId(DEMO_USER_ID.to_string())
    }

    pub fn first_day(&self) -> NaiveDate {
        self.reference.checked_sub_days(Days::new(DEMO_DAYS - 1)).unwrap_or(NaiveDate::MIN)
    }

    pub fn roster(&self) -> StoreRoster {
        let stores = DEMO_STORES
            .iter()
            .map(|(id, name, ticket)| Store {
                id: StoreId((*id).to_string()),
                name: (*name).to_string(),
                average_ticket: ticket.map(|cents| Decimal::new(cents, 2)),
            })
            .collect();
        let sellers = DEMO_SELLERS
            .iter()
            .map(|(id, name, store_id)| Seller {
                id: SellerId((*id).to_string()),
                name: (*name).to_string(),
                store_id: StoreId((*store_id).to_string()),
            })
            .collect();
        StoreRoster::new(stores, sellers)
    }

    pub fn records(&self) -> Vec<SalesRecord> {
        let first_day = self.first_day();
        let mut records = Vec::new();

        for offset in 0..DEMO_DAYS {
            let Some(date) = first_day.checked_add_days(Days::new(offset)) else {
                continue;
            };
            for (index, (seller_id, _, store_id)) in DEMO_SELLERS.iter().enumerate() {
                let seed = index as u64 * 5 + offset * 3;
                let visits = 12 + (seed % 7) as u32 + index as u32 * 2;
                let divisor = if date.weekday() == Weekday::Mon { 6 } else { 3 };
                let sales = visits / divisor + (index as u32 % 2);

                records.push(SalesRecord {
                    id: SalesRecordId(format!("demo-{seller_id}-{date}")),
                    seller_id: SellerId((*seller_id).to_string()),
                    store_id: StoreId((*store_id).to_string()),
                    date,
                    visits,
                    sales,
                });
            }
        }

        records
    }

    pub async fn load(
        &self,
        pool: &DbPool,
        created_at: DateTime<Utc>,
    ) -> Result<SeedResult, RepositoryError> {
        let user_id = self.user_id();
        let roster = self.roster();
        let records = self.records();

        // One transaction: a failed seed leaves no rows behind.
        let mut tx = pool.begin().await?;
        upsert_user(&mut *tx, &user_id, "Demo Retail", created_at).await?;
        for (position, store) in roster.stores.iter().enumerate() {
            upsert_store(&mut *tx, &user_id, store, position as u32).await?;
        }
        for (position, seller) in roster.sellers.iter().enumerate() {
            upsert_seller(&mut *tx, &user_id, seller, position as u32).await?;
        }
        for record in &records {
            upsert_sales_record(&mut *tx, &user_id, record).await?;
        }
        tx.commit().await?;

        Ok(SeedResult {
            user_id,
            stores: roster.stores.len(),
            sellers: roster.sellers.len(),
            records: records.len(),
            first_day: self.first_day(),
            last_day: self.reference,
        })
    }

    pub async fn load_in_memory(&self, repo: &InMemorySalesRepository) {
        let user_id = self.user_id();
        repo.insert_user(user_id.clone(), self.roster()).await;
        repo.insert_records(&user_id, self.records()).await;
    }

    /// Checks that the seeded rows are present with the expected counts.
    pub async fn verify(&self, pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let user_id = self.user_id();
        let mut checks = Vec::new();

        let users: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM app_user WHERE id = ?")
            .bind(&user_id.0)
            .fetch_one(pool)
            .await?;
        checks.push(("demo-user", users == 1));

        let stores: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM store WHERE user_id = ?")
            .bind(&user_id.0)
            .fetch_one(pool)
            .await?;
        checks.push(("demo-stores", stores == DEMO_STORES.len() as i64));

        let missing_ticket: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM store WHERE user_id = ? AND average_ticket IS NULL",
        )
        .bind(&user_id.0)
        .fetch_one(pool)
        .await?;
        checks.push(("demo-store-without-ticket", missing_ticket == 1));

        let sellers: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM seller WHERE user_id = ?")
            .bind(&user_id.0)
            .fetch_one(pool)
            .await?;
        checks.push(("demo-sellers", sellers == DEMO_SELLERS.len() as i64));

        let records: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM sales_record WHERE user_id = ?")
                .bind(&user_id.0)
                .fetch_one(pool)
                .await?;
        checks.push(("demo-records", records == (DEMO_DAYS as usize * DEMO_SELLERS.len()) as i64));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes the demo user and, through cascading keys, everything it owns.
    pub async fn clean(&self, pool: &DbPool) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM app_user WHERE id = ?")
            .bind(DEMO_USER_ID)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub user_id: UserId,
    pub stores: usize,
    pub sellers: usize,
    pub records: usize,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
