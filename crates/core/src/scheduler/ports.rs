use async_trait::async_trait;

use crate::domain::insight::{InsightSet, InsightSetKey};
use crate::domain::sales::{DateRange, SalesRecord, UserId};
use crate::domain::store::StoreRoster;
use crate::errors::ApplicationError;

/// Read side of the record store. Failures surface as `ApplicationError::Integration`.
#[async_trait]
pub trait SalesRecordSource: Send + Sync {
    /// Records dated within `range`, bounds inclusive.
    async fn list_sales_records(
        &self,
        user_id: &UserId,
        range: DateRange,
    ) -> Result<Vec<SalesRecord>, ApplicationError>;

    async fn store_roster(&self, user_id: &UserId) -> Result<StoreRoster, ApplicationError>;
}

#[async_trait]
pub trait InsightSetStore: Send + Sync {
    async fn find_insight_set(
        &self,
        user_id: &UserId,
        key: &InsightSetKey,
    ) -> Result<Option<InsightSet>, ApplicationError>;

    /// Insert or replace the set stored under `(set.user_id, set.key)`.
    async fn upsert_insight_set(&self, set: InsightSet) -> Result<(), ApplicationError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_user_ids(&self) -> Result<Vec<UserId>, ApplicationError>;

    async fn user_exists(&self, user_id: &UserId) -> Result<bool, ApplicationError>;
}
