use chrono::{Days, NaiveDate};

use crate::domain::sales::{DateRange, SalesRecord};

pub const WINDOW_DAYS: u64 = 7;

/// Two back-to-back, non-overlapping 7-day windows ending on a reference date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComparisonWindows {
    pub reference: NaiveDate,
    pub current: DateRange,
    pub prior: DateRange,
}

/// Records split into the two comparison windows. Rows outside both are dropped.
#[derive(Clone, Debug, Default)]
pub struct WindowedRecords<'a> {
    pub current: Vec<&'a SalesRecord>,
    pub prior: Vec<&'a SalesRecord>,
}

impl ComparisonWindows {
    pub fn ending_on(reference: NaiveDate) -> Self {
        let current = DateRange::new(days_before(reference, WINDOW_DAYS - 1), reference);
        let prior = DateRange::new(
            days_before(reference, 2 * WINDOW_DAYS - 1),
            days_before(reference, WINDOW_DAYS),
        );
        Self { reference, current, prior }
    }

    /// The full span to request from the record store.
    pub fn history(&self) -> DateRange {
        DateRange::new(self.prior.since, self.current.until)
    }

    pub fn split<'a>(&self, records: &'a [SalesRecord]) -> WindowedRecords<'a> {
        let mut windowed = WindowedRecords::default();
        for record in records {
            if self.current.contains(record.date) {
                windowed.current.push(record);
            } else if self.prior.contains(record.date) {
                windowed.prior.push(record);
            }
        }
        windowed
    }
}

fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::ComparisonWindows;
    use crate::domain::sales::{SalesRecord, SalesRecordId, SellerId, StoreId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn record_on(day: NaiveDate) -> SalesRecord {
        SalesRecord {
            id: SalesRecordId(format!("rec-{day}")),
            seller_id: SellerId("seller-1".to_string()),
            store_id: StoreId("store-1".to_string()),
            date: day,
            visits: 10,
            sales: 2,
        }
    }

    #[test]
    fn windows_partition_fourteen_days_without_overlap() {
        let windows = ComparisonWindows::ending_on(date(2025, 6, 15));

        assert_eq!(windows.current.since, date(2025, 6, 9));
        assert_eq!(windows.current.until, date(2025, 6, 15));
        assert_eq!(windows.prior.since, date(2025, 6, 2));
        assert_eq!(windows.prior.until, date(2025, 6, 8));

        let mut day = windows.prior.since;
        while day <= windows.current.until {
            assert!(
                windows.current.contains(day) != windows.prior.contains(day),
                "{day} must fall in exactly one window"
            );
            day = day.succ_opt().expect("next day");
        }
    }

    #[test]
    fn history_spans_both_windows() {
        let windows = ComparisonWindows::ending_on(date(2025, 3, 2));
        let history = windows.history();

        assert_eq!(history.since, date(2025, 2, 17));
        assert_eq!(history.until, date(2025, 3, 2));
    }

    #[test]
    fn split_drops_rows_outside_both_windows() {
        let windows = ComparisonWindows::ending_on(date(2025, 6, 15));
        let records = vec![
            record_on(date(2025, 6, 16)),
            record_on(date(2025, 6, 15)),
            record_on(date(2025, 6, 9)),
            record_on(date(2025, 6, 8)),
            record_on(date(2025, 6, 2)),
            record_on(date(2025, 6, 1)),
        ];

        let windowed = windows.split(&records);

        assert_eq!(windowed.current.len(), 2);
        assert_eq!(windowed.prior.len(), 2);
    }

    #[test]
    fn empty_history_yields_empty_windows() {
        let windows = ComparisonWindows::ending_on(date(2025, 6, 15));
        let windowed = windows.split(&[]);

        assert!(windowed.current.is_empty());
        assert!(windowed.prior.is_empty());
    }
}
