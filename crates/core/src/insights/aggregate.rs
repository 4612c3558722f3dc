use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::domain::sales::{SalesRecord, SellerId, StoreId};
use crate::domain::store::StoreRoster;

pub const WEEKDAY_NAMES: [&str; 7] =
    ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];

/// `sales / visits * 100`, or `0` when there were no visits.
pub fn conversion_rate(sales: u64, visits: u64) -> f64 {
    if visits == 0 {
        0.0
    } else {
        sales as f64 / visits as f64 * 100.0
    }
}

pub fn weekday_name(weekday: u32) -> &'static str {
    WEEKDAY_NAMES.get(weekday as usize).copied().unwrap_or("Unknown")
}

/// Visits and sales only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub visits: u64,
    pub sales: u64,
}

impl Totals {
    pub fn of<'a>(records: impl IntoIterator<Item = &'a SalesRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut totals, record| {
            totals.visits += u64::from(record.visits);
            totals.sales += u64::from(record.sales);
            totals
        })
    }

    pub fn conversion_rate(&self) -> f64 {
        conversion_rate(self.sales, self.visits)
    }
}

/// Visits, sales and lost opportunities for one store or one seller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rollup {
    pub visits: u64,
    pub sales: u64,
    pub lost: u64,
    pub lost_value: Decimal,
}

impl Rollup {
    fn absorb(&mut self, record: &SalesRecord, ticket: Option<Decimal>) {
        let lost = record.lost();
        self.visits += u64::from(record.visits);
        self.sales += u64::from(record.sales);
        self.lost += u64::from(lost);
        self.lost_value += Decimal::from(lost) * ticket.unwrap_or(Decimal::ZERO);
    }

    pub fn conversion_rate(&self) -> f64 {
        conversion_rate(self.sales, self.visits)
    }

    /// Sales per visit with zero visits treated as one. Only for ordering.
    pub fn ranking_ratio(&self) -> f64 {
        self.sales as f64 / self.visits.max(1) as f64
    }
}

/// Per-store, per-seller and per-weekday rollups of one window.
///
/// Keys are held in ordered maps so the snapshot is identical for any
/// permutation of the input records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateSnapshot {
    pub by_store: BTreeMap<StoreId, Rollup>,
    pub by_seller: BTreeMap<SellerId, Rollup>,
    pub by_weekday: BTreeMap<u32, Totals>,
    seller_stores: BTreeMap<SellerId, StoreId>,
}

impl AggregateSnapshot {
    /// The store a seller belongs to: the roster assignment when known,
    /// otherwise the lowest store id among the seller's records.
    pub fn seller_store(&self, seller_id: &SellerId) -> Option<&StoreId> {
        self.seller_stores.get(seller_id)
    }

    pub fn is_empty(&self) -> bool {
        self.by_store.is_empty() && self.by_seller.is_empty() && self.by_weekday.is_empty()
    }
}

pub fn aggregate<'a>(
    records: impl IntoIterator<Item = &'a SalesRecord>,
    roster: &StoreRoster,
) -> AggregateSnapshot {
    let mut snapshot = AggregateSnapshot::default();

    for record in records {
        let ticket = roster.ticket_for(&record.store_id);

        snapshot.by_store.entry(record.store_id.clone()).or_default().absorb(record, ticket);
        snapshot.by_seller.entry(record.seller_id.clone()).or_default().absorb(record, ticket);

        let weekday = snapshot.by_weekday.entry(record.date.weekday().num_days_from_sunday());
        let totals = weekday.or_default();
        totals.visits += u64::from(record.visits);
        totals.sales += u64::from(record.sales);

        let assigned = roster.seller(&record.seller_id).map(|seller| seller.store_id.clone());
        let store_id = match assigned {
            Some(store_id) => store_id,
            None => match snapshot.seller_stores.get(&record.seller_id) {
                Some(existing) if *existing <= record.store_id => existing.clone(),
                _ => record.store_id.clone(),
            },
        };
        snapshot.seller_stores.insert(record.seller_id.clone(), store_id);
    }

    snapshot
}
