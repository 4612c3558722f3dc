use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesRecordId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SellerId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreId(pub String);

/// One seller's attendance and closed sales for a single calendar day.
///
/// `sales <= visits` is expected but not enforced; over-counted days simply
/// contribute zero lost opportunities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub id: SalesRecordId,
    pub seller_id: SellerId,
    pub store_id: StoreId,
    pub date: NaiveDate,
    pub visits: u32,
    pub sales: u32,
}

impl SalesRecord {
    pub fn lost(&self) -> u32 {
        self.visits.saturating_sub(self.sales)
    }
}

/// Inclusive calendar-day range used when reading records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl DateRange {
    pub fn new(since: NaiveDate, until: NaiveDate) -> Self {
        Self { since, until }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.since && date <= self.until
    }
}
