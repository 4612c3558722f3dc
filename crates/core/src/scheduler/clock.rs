use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::config::InsightsConfig;
use crate::domain::insight::GenerationSlot;
use crate::errors::ApplicationError;

/// Business-local calendar with a fixed UTC offset. Daylight saving is not modelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusinessClock {
    offset: FixedOffset,
    slot_time: NaiveTime,
}

impl BusinessClock {
    pub fn new(offset: FixedOffset, slot_hour: u32) -> Result<Self, ApplicationError> {
        let slot_time = NaiveTime::from_hms_opt(slot_hour, 0, 0).ok_or_else(|| {
            ApplicationError::Configuration(format!("slot hour `{slot_hour}` is out of range"))
        })?;
        Ok(Self { offset, slot_time })
    }

    pub fn from_config(config: &InsightsConfig) -> Result<Self, ApplicationError> {
        let offset = config
            .business_offset()
            .map_err(|error| ApplicationError::Configuration(error.to_string()))?;
        Self::new(offset, config.daily_slot_hour)
    }

    /// Calendar date in the business timezone at `now`.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// The UTC instant of the local slot hour on `date`.
    pub fn slot_for(&self, date: NaiveDate) -> GenerationSlot {
        let local = date.and_time(self.slot_time);
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        GenerationSlot(Utc.from_utc_datetime(&utc))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

    use super::BusinessClock;
    use crate::config::InsightsConfig;

    fn brasilia() -> BusinessClock {
        BusinessClock::from_config(&InsightsConfig::default()).expect("default config is valid")
    }

    #[test]
    fn slot_is_local_eight_am_as_utc() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date");

        let slot = brasilia().slot_for(date);

        assert_eq!(slot.instant(), Utc.with_ymd_and_hms(2025, 6, 15, 11, 0, 0).unwrap());
    }

    #[test]
    fn local_date_follows_business_offset() {
        let late_evening = Utc.with_ymd_and_hms(2025, 6, 16, 2, 30, 0).unwrap();
        let morning = Utc.with_ymd_and_hms(2025, 6, 16, 12, 0, 0).unwrap();

        assert_eq!(
            brasilia().local_date(late_evening),
            NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
        );
        assert_eq!(
            brasilia().local_date(morning),
            NaiveDate::from_ymd_opt(2025, 6, 16).expect("valid date")
        );
    }

    #[test]
    fn same_day_always_maps_to_same_slot() {
        let clock = brasilia();
        let first = Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2025, 6, 16, 1, 0, 0).unwrap();

        assert_eq!(
            clock.slot_for(clock.local_date(first)),
            clock.slot_for(clock.local_date(second))
        );
    }

    #[test]
    fn rejects_out_of_range_slot_hour() {
        let offset = FixedOffset::east_opt(0).expect("utc offset");
        assert!(BusinessClock::new(offset, 24).is_err());
        assert!(BusinessClock::new(offset, 23).is_ok());
    }
}
