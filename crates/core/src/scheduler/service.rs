use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::clock::BusinessClock;
use super::ports::{InsightSetStore, SalesRecordSource, UserDirectory};
use crate::domain::insight::{GenerationSlot, InsightSet, InsightSetKey};
use crate::domain::sales::UserId;
use crate::errors::ApplicationError;
use crate::insights::{ComparisonWindows, GenerationMode, InsightEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotOutcome {
    Generated { insights: usize },
    AlreadyGenerated,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserFailure {
    pub user_id: UserId,
    pub error: String,
}

/// Summary of one batch invocation across all users.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub slot: GenerationSlot,
    pub reference_date: NaiveDate,
    pub generated: usize,
    pub skipped: usize,
    pub failures: Vec<UserFailure>,
}

impl BatchReport {
    fn new(slot: GenerationSlot, reference_date: NaiveDate) -> Self {
        Self { slot, reference_date, generated: 0, skipped: 0, failures: Vec::new() }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Interactive result: either cards to show or a "not enough data yet" state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DailyInsights {
    Ready(InsightSet),
    InsufficientData { generated_at: DateTime<Utc> },
}

impl DailyInsights {
    fn from_set(set: InsightSet) -> Self {
        if set.is_empty() {
            Self::InsufficientData { generated_at: set.generated_at }
        } else {
            Self::Ready(set)
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Ready(_) => "ready",
            Self::InsufficientData { .. } => "insufficient_data",
        }
    }
}

pub struct GenerationService {
    records: Arc<dyn SalesRecordSource>,
    insight_sets: Arc<dyn InsightSetStore>,
    users: Arc<dyn UserDirectory>,
    engine: InsightEngine,
    clock: BusinessClock,
}

impl GenerationService {
    pub fn new(
        records: Arc<dyn SalesRecordSource>,
        insight_sets: Arc<dyn InsightSetStore>,
        users: Arc<dyn UserDirectory>,
        engine: InsightEngine,
        clock: BusinessClock,
    ) -> Self {
        Self { records, insight_sets, users, engine, clock }
    }

    pub fn clock(&self) -> &BusinessClock {
        &self.clock
    }

    /// Generates the batch set for every user's slot of the business day containing `now`.
    ///
    /// Users are processed one after another. A failure for one user is logged and
    /// recorded in the report; the remaining users still run.
    pub async fn run_daily_batch(
        &self,
        now: DateTime<Utc>,
    ) -> Result<BatchReport, ApplicationError> {
        let reference_date = self.clock.local_date(now);
        let slot = self.clock.slot_for(reference_date);
        let slot_label = slot.instant().to_rfc3339_opts(SecondsFormat::Secs, true);
        let user_ids = self.users.list_user_ids().await?;

        info!(
            event_name = "insights.batch.started",
            slot = %slot_label,
            users = user_ids.len(),
            "daily insight batch started"
        );

        let mut report = BatchReport::new(slot, reference_date);
        for user_id in user_ids {
            match self.generate_for_slot(&user_id, slot, reference_date, now).await {
                Ok(SlotOutcome::Generated { insights }) => {
                    info!(
                        event_name = "insights.batch.user_generated",
                        user_id = %user_id.0,
                        slot = %slot_label,
                        insights,
                        "generated daily insights"
                    );
                    report.generated += 1;
                }
                Ok(SlotOutcome::AlreadyGenerated) => {
                    info!(
                        event_name = "insights.batch.user_skipped",
                        user_id = %user_id.0,
                        slot = %slot_label,
                        "insights already generated for slot"
                    );
                    report.skipped += 1;
                }
                Err(error) => {
                    warn!(
                        event_name = "insights.batch.user_failed",
                        user_id = %user_id.0,
                        slot = %slot_label,
                        error = %error,
                        "daily insight generation failed; continuing with next user"
                    );
                    report.failures.push(UserFailure { user_id, error: error.to_string() });
                }
            }
        }

        info!(
            event_name = "insights.batch.completed",
            slot = %slot_label,
            generated = report.generated,
            skipped = report.skipped,
            failed = report.failed(),
            "daily insight batch completed"
        );

        Ok(report)
    }

    /// Check-then-act on the `(user, slot)` key. An existing set is never recomputed.
    pub async fn generate_for_slot(
        &self,
        user_id: &UserId,
        slot: GenerationSlot,
        reference_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<SlotOutcome, ApplicationError> {
        let key = InsightSetKey::Slot(slot);
        if self.insight_sets.find_insight_set(user_id, &key).await?.is_some() {
            return Ok(SlotOutcome::AlreadyGenerated);
        }

        let set = self.compute(user_id, key, reference_date, GenerationMode::Batch, now).await?;
        let insights = set.insights.len();
        self.insight_sets.upsert_insight_set(set).await?;
        Ok(SlotOutcome::Generated { insights })
    }

    /// Insights for the dashboard on `date`, generated once and then served from storage.
    pub async fn daily_insights(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<DailyInsights, ApplicationError> {
        if !self.users.user_exists(user_id).await? {
            return Ok(Self::unknown_user(user_id, date, now));
        }

        let key = InsightSetKey::Day(date);
        if let Some(existing) = self.insight_sets.find_insight_set(user_id, &key).await? {
            return Ok(DailyInsights::from_set(existing));
        }

        let set = self.compute(user_id, key, date, GenerationMode::Interactive, now).await?;
        self.insight_sets.upsert_insight_set(set.clone()).await?;
        info!(
            event_name = "insights.daily.generated",
            user_id = %user_id.0,
            date = %date,
            insights = set.insights.len(),
            "generated interactive insights"
        );
        Ok(DailyInsights::from_set(set))
    }

    /// Recomputes and overwrites the `Day(reference_date)` set, skipping the existence check.
    pub async fn regenerate(
        &self,
        user_id: &UserId,
        reference_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<DailyInsights, ApplicationError> {
        if !self.users.user_exists(user_id).await? {
            return Ok(Self::unknown_user(user_id, reference_date, now));
        }

        let key = InsightSetKey::Day(reference_date);
        let set =
            self.compute(user_id, key, reference_date, GenerationMode::Interactive, now).await?;
        self.insight_sets.upsert_insight_set(set.clone()).await?;
        info!(
            event_name = "insights.daily.regenerated",
            user_id = %user_id.0,
            date = %reference_date,
            insights = set.insights.len(),
            "regenerated interactive insights"
        );
        Ok(DailyInsights::from_set(set))
    }

    /// Users with no account have no records to read and no row to attach a set to.
    fn unknown_user(user_id: &UserId, date: NaiveDate, now: DateTime<Utc>) -> DailyInsights {
        info!(
            event_name = "insights.daily.unknown_user",
            user_id = %user_id.0,
            date = %date,
            "no account for user; reporting insufficient data"
        );
        DailyInsights::InsufficientData { generated_at: now }
    }

    async fn compute(
        &self,
        user_id: &UserId,
        key: InsightSetKey,
        reference_date: NaiveDate,
        mode: GenerationMode,
        now: DateTime<Utc>,
    ) -> Result<InsightSet, ApplicationError> {
        let windows = ComparisonWindows::ending_on(reference_date);
        let records = self.records.list_sales_records(user_id, windows.history()).await?;
        let roster = self.records.store_roster(user_id).await?;
        let insights = self.engine.generate(&records, &roster, reference_date, mode);

        Ok(InsightSet { user_id: user_id.clone(), key, insights, generated_at: now })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use tokio::sync::RwLock;

    use super::{DailyInsights, GenerationService, SlotOutcome};
    use crate::config::InsightsConfig;
    use crate::domain::insight::{InsightSet, InsightSetKey};
    use crate::domain::sales::{DateRange, SalesRecord, SalesRecordId, SellerId, StoreId, UserId};
    use crate::domain::store::{Seller, Store, StoreRoster};
    use crate::errors::ApplicationError;
    use crate::insights::InsightEngine;
    use crate::scheduler::clock::BusinessClock;
    use crate::scheduler::ports::{InsightSetStore, SalesRecordSource, UserDirectory};

    #[derive(Default)]
    struct FakeRecords {
        records: HashMap<UserId, Vec<SalesRecord>>,
        failing: HashSet<UserId>,
        requested: RwLock<Vec<DateRange>>,
    }

    #[async_trait]
    impl SalesRecordSource for FakeRecords {
        async fn list_sales_records(
            &self,
            user_id: &UserId,
            range: DateRange,
        ) -> Result<Vec<SalesRecord>, ApplicationError> {
            if self.failing.contains(user_id) {
                return Err(ApplicationError::Integration("record store offline".to_string()));
            }
            self.requested.write().await.push(range);
            Ok(self.records.get(user_id).cloned().unwrap_or_default())
        }

        async fn store_roster(&self, _user_id: &UserId) -> Result<StoreRoster, ApplicationError> {
            Ok(StoreRoster::new(
                vec![Store {
                    id: StoreId("centro".to_string()),
                    name: "Centro".to_string(),
                    average_ticket: Some(Decimal::new(120, 0)),
                }],
                vec![Seller {
                    id: SellerId("ana".to_string()),
                    name: "Ana".to_string(),
                    store_id: StoreId("centro".to_string()),
                }],
            ))
        }
    }

    #[derive(Default)]
    struct CountingSets {
        sets: RwLock<HashMap<(UserId, InsightSetKey), InsightSet>>,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl InsightSetStore for CountingSets {
        async fn find_insight_set(
            &self,
            user_id: &UserId,
            key: &InsightSetKey,
        ) -> Result<Option<InsightSet>, ApplicationError> {
            Ok(self.sets.read().await.get(&(user_id.clone(), *key)).cloned())
        }

        async fn upsert_insight_set(&self, set: InsightSet) -> Result<(), ApplicationError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.sets.write().await.insert((set.user_id.clone(), set.key), set);
            Ok(())
        }
    }

    struct FixedUsers(Vec<UserId>);

    #[async_trait]
    impl UserDirectory for FixedUsers {
        async fn list_user_ids(&self) -> Result<Vec<UserId>, ApplicationError> {
            Ok(self.0.clone())
        }

        async fn user_exists(&self, user_id: &UserId) -> Result<bool, ApplicationError> {
            Ok(self.0.contains(user_id))
        }
    }

    fn user(id: &str) -> UserId {
        UserId(id.to_string())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 14, 0, 0).unwrap()
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
    }

    fn week_of_records() -> Vec<SalesRecord> {
        (9..=15)
            .map(|day| SalesRecord {
                id: SalesRecordId(format!("rec-{day}")),
                seller_id: SellerId("ana".to_string()),
                store_id: StoreId("centro".to_string()),
                date: NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date"),
                visits: 20,
                sales: 5,
            })
            .collect()
    }

    fn service(
        records: FakeRecords,
        users: Vec<UserId>,
    ) -> (GenerationService, Arc<CountingSets>, Arc<FakeRecords>) {
        let records = Arc::new(records);
        let sets = Arc::new(CountingSets::default());
        let clock =
            BusinessClock::from_config(&InsightsConfig::default()).expect("default config");
        let service = GenerationService::new(
            records.clone(),
            sets.clone(),
            Arc::new(FixedUsers(users)),
            InsightEngine::default(),
            clock,
        );
        (service, sets, records)
    }

    #[tokio::test]
    async fn second_batch_for_same_slot_writes_nothing() {
        let mut records = FakeRecords::default();
        records.records.insert(user("u1"), week_of_records());
        let (service, sets, _) = service(records, vec![user("u1")]);

        let first = service.run_daily_batch(now()).await.expect("first batch");
        let second = service.run_daily_batch(now()).await.expect("second batch");

        assert_eq!(first.generated, 1);
        assert_eq!(second.generated, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(sets.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_user_does_not_stop_siblings() {
        let mut records = FakeRecords::default();
        records.records.insert(user("u1"), week_of_records());
        records.records.insert(user("u3"), week_of_records());
        records.failing.insert(user("u2"));
        let (service, sets, _) = service(records, vec![user("u1"), user("u2"), user("u3")]);

        let report = service.run_daily_batch(now()).await.expect("batch report");

        assert!(!report.is_success());
        assert_eq!(report.generated, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].user_id, user("u2"));
        assert_eq!(sets.writes.load(Ordering::SeqCst), 2);

        let slot = service.clock().slot_for(reference());
        let stored = sets.find_insight_set(&user("u2"), &InsightSetKey::Slot(slot)).await;
        assert_eq!(stored, Ok(None));
    }

    #[tokio::test]
    async fn user_without_data_gets_an_empty_persisted_set() {
        let (service, sets, _) = service(FakeRecords::default(), vec![user("new")]);

        let report = service.run_daily_batch(now()).await.expect("batch report");
        assert!(report.is_success());
        assert_eq!(report.generated, 1);

        let slot = service.clock().slot_for(reference());
        let stored = sets
            .find_insight_set(&user("new"), &InsightSetKey::Slot(slot))
            .await
            .expect("lookup")
            .expect("empty set is persisted");
        assert!(stored.insights.is_empty());
    }

    #[tokio::test]
    async fn generation_requests_both_comparison_weeks() {
        let (service, _, records) = service(FakeRecords::default(), vec![user("u1")]);

        let slot = service.clock().slot_for(reference());
        let outcome = service
            .generate_for_slot(&user("u1"), slot, reference(), now())
            .await
            .expect("slot generation");

        assert_eq!(outcome, SlotOutcome::Generated { insights: 0 });
        let requested = records.requested.read().await;
        assert_eq!(requested[0].since, NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date"));
        assert_eq!(requested[0].until, reference());
    }

    #[tokio::test]
    async fn daily_insights_generate_once_then_serve_stored_set() {
        let mut records = FakeRecords::default();
        records.records.insert(user("u1"), week_of_records());
        let (service, sets, _) = service(records, vec![user("u1")]);

        let first = service.daily_insights(&user("u1"), reference(), now()).await.expect("first");
        let second = service.daily_insights(&user("u1"), reference(), now()).await.expect("second");

        assert_eq!(first, second);
        assert_eq!(first.status(), "ready");
        assert_eq!(sets.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn regenerate_always_overwrites_the_day_set() {
        let mut records = FakeRecords::default();
        records.records.insert(user("u1"), week_of_records());
        let (service, sets, _) = service(records, vec![user("u1")]);

        service.daily_insights(&user("u1"), reference(), now()).await.expect("daily");
        let later = Utc.with_ymd_and_hms(2025, 6, 15, 18, 0, 0).unwrap();
        let regenerated = service.regenerate(&user("u1"), reference(), later).await.expect("regen");

        assert_eq!(sets.writes.load(Ordering::SeqCst), 2);
        match regenerated {
            DailyInsights::Ready(set) => {
                assert_eq!(set.generated_at, later);
                assert_eq!(set.key, InsightSetKey::Day(reference()));
            }
            other => panic!("expected ready insights, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_interactive_result_is_insufficient_data_not_error() {
        let (service, _, _) = service(FakeRecords::default(), vec![user("u1")]);

        let result = service.daily_insights(&user("u1"), reference(), now()).await;

        assert_eq!(result, Ok(DailyInsights::InsufficientData { generated_at: now() }));
    }

    #[tokio::test]
    async fn day_and_slot_keys_do_not_share_state() {
        let mut records = FakeRecords::default();
        records.records.insert(user("u1"), week_of_records());
        let (service, sets, _) = service(records, vec![user("u1")]);

        service.regenerate(&user("u1"), reference(), now()).await.expect("regenerate");
        let report = service.run_daily_batch(now()).await.expect("batch");

        assert_eq!(report.generated, 1);
        assert_eq!(sets.writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_user_gets_insufficient_data_without_a_write() {
        let (service, sets, records) = service(FakeRecords::default(), vec![user("u1")]);
        let later = Utc.with_ymd_and_hms(2025, 6, 15, 18, 0, 0).unwrap();

        let daily = service.daily_insights(&user("nobody"), reference(), now()).await;
        let regenerated = service.regenerate(&user("nobody"), reference(), later).await;

        assert_eq!(daily, Ok(DailyInsights::InsufficientData { generated_at: now() }));
        assert_eq!(regenerated, Ok(DailyInsights::InsufficientData { generated_at: later }));
        assert_eq!(sets.writes.load(Ordering::SeqCst), 0);
        assert!(records.requested.read().await.is_empty());
    }

    #[tokio::test]
    async fn read_failure_surfaces_to_interactive_caller() {
        let mut records = FakeRecords::default();
        records.failing.insert(user("u1"));
        let (service, sets, _) = service(records, vec![user("u1")]);

        let result = service.regenerate(&user("u1"), reference(), now()).await;

        assert!(matches!(result, Err(ApplicationError::Integration(_))));
        assert_eq!(sets.writes.load(Ordering::SeqCst), 0);
    }
}
