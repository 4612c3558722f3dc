use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use storepulse_core::domain::insight::{InsightSet, InsightSetKey};
use storepulse_core::domain::sales::{DateRange, SalesRecord, UserId};
use storepulse_core::domain::store::StoreRoster;
use storepulse_core::errors::ApplicationError;
use storepulse_core::scheduler::{InsightSetStore, SalesRecordSource, UserDirectory};

/// Record store held in memory. Users are listed in id order.
#[derive(Default)]
pub struct InMemorySalesRepository {
    records: RwLock<BTreeMap<UserId, Vec<SalesRecord>>>,
    rosters: RwLock<HashMap<UserId, StoreRoster>>,
}

impl InMemorySalesRepository {
    pub async fn insert_user(&self, user_id: UserId, roster: StoreRoster) {
        self.records.write().await.entry(user_id.clone()).or_default();
        self.rosters.write().await.insert(user_id, roster);
    }

    pub async fn insert_records(
        &self,
        user_id: &UserId,
        records: impl IntoIterator<Item = SalesRecord>,
    ) {
        self.records.write().await.entry(user_id.clone()).or_default().extend(records);
    }
}

#[async_trait]
impl SalesRecordSource for InMemorySalesRepository {
    async fn list_sales_records(
        &self,
        user_id: &UserId,
        range: DateRange,
    ) -> Result<Vec<SalesRecord>, ApplicationError> {
        let records = self.records.read().await;
        Ok(records
            .get(user_id)
            .map(|records| {
                records.iter().filter(|record| range.contains(record.date)).cloned().collect()
            })
            .unwrap_or_default())
    }

    async fn store_roster(&self, user_id: &UserId) -> Result<StoreRoster, ApplicationError> {
        let rosters = self.rosters.read().await;
        Ok(rosters.get(user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl UserDirectory for InMemorySalesRepository {
    async fn list_user_ids(&self) -> Result<Vec<UserId>, ApplicationError> {
        Ok(self.records.read().await.keys().cloned().collect())
    }

    async fn user_exists(&self, user_id: &UserId) -> Result<bool, ApplicationError> {
        Ok(self.records.read().await.contains_key(user_id))
    }
}

/// Insight store held in memory, counting every upsert.
#[derive(Default)]
pub struct InMemoryInsightSetRepository {
    sets: RwLock<HashMap<(UserId, InsightSetKey), InsightSet>>,
    writes: AtomicUsize,
}

impl InMemoryInsightSetRepository {
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.sets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sets.read().await.is_empty()
    }
}

#[async_trait]
impl InsightSetStore for InMemoryInsightSetRepository {
    async fn find_insight_set(
        &self,
        user_id: &UserId,
        key: &InsightSetKey,
    ) -> Result<Option<InsightSet>, ApplicationError> {
        let sets = self.sets.read().await;
        Ok(sets.get(&(user_id.clone(), *key)).cloned())
    }

    async fn upsert_insight_set(&self, set: InsightSet) -> Result<(), ApplicationError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut sets = self.sets.write().await;
        sets.insert((set.user_id.clone(), set.key), set);
        Ok(())
    }
}
