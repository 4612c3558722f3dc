//! Insight generation: windowing, aggregation, rules and selection.
//!
//! [`InsightEngine::generate`] is a pure function of its inputs. The caller
//! fetches records and the roster, the engine returns the ordered card list.

pub mod aggregate;
pub mod format;
pub mod ranker;
pub mod rules;
pub mod window;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::InsightsConfig;
use crate::domain::insight::Insight;
use crate::domain::sales::SalesRecord;
use crate::domain::store::StoreRoster;

pub use aggregate::{aggregate, conversion_rate, AggregateSnapshot, Rollup, Totals};
pub use rules::{trend_delta, InsightRule, RuleContext};
pub use window::{ComparisonWindows, WindowedRecords, WINDOW_DAYS};

pub const INTERACTIVE_CAP: usize = 5;
pub const BATCH_CAP: usize = 8;
pub const DEFAULT_WEAK_WEEKDAY_MIN_VISITS: u64 = 10;
pub const DEFAULT_CURRENCY_SYMBOL: &str = "R$";

/// Interactive rule list. Missing ticket and conversion lift never both fire,
/// so at most five cards come out of these six rules.
pub const INTERACTIVE_RULES: [InsightRule; 6] = [
    rules::trend,
    rules::store_loss,
    rules::seller_loss,
    rules::weak_weekday,
    rules::missing_ticket,
    rules::conversion_lift,
];

pub const BATCH_RULES: [InsightRule; 8] = [
    rules::trend,
    rules::store_loss,
    rules::seller_loss,
    rules::weak_weekday,
    rules::missing_ticket,
    rules::conversion_lift,
    rules::top_seller,
    rules::lowest_store,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Dashboard path: five cards, weak weekday needs a visit floor.
    Interactive,
    /// Daily batch path: all rules, up to eight cards.
    Batch,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interactive => "interactive",
            Self::Batch => "batch",
        }
    }

    pub fn cap(&self) -> usize {
        match self {
            Self::Interactive => INTERACTIVE_CAP,
            Self::Batch => BATCH_CAP,
        }
    }

    pub fn rules(&self) -> &'static [InsightRule] {
        match self {
            Self::Interactive => &INTERACTIVE_RULES,
            Self::Batch => &BATCH_RULES,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsightEngine {
    weak_weekday_min_visits: u64,
    currency_symbol: String,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new(DEFAULT_WEAK_WEEKDAY_MIN_VISITS, DEFAULT_CURRENCY_SYMBOL)
    }
}

impl InsightEngine {
    pub fn new(weak_weekday_min_visits: u64, currency_symbol: impl Into<String>) -> Self {
        Self { weak_weekday_min_visits, currency_symbol: currency_symbol.into() }
    }

    pub fn from_config(config: &InsightsConfig) -> Self {
        Self::new(config.weak_weekday_min_visits, config.currency_symbol.clone())
    }

    /// Ranked insight cards for the 7 days ending on `reference`.
    ///
    /// Returns an empty list when the current window holds no records. That is
    /// the "insufficient data" outcome, not an error.
    pub fn generate(
        &self,
        records: &[SalesRecord],
        roster: &StoreRoster,
        reference: NaiveDate,
        mode: GenerationMode,
    ) -> Vec<Insight> {
        let windows = ComparisonWindows::ending_on(reference);
        let windowed = windows.split(records);
        if windowed.current.is_empty() {
            return Vec::new();
        }

        let snapshot = aggregate(windowed.current.iter().copied(), roster);
        let ctx = RuleContext {
            snapshot: &snapshot,
            current: Totals::of(windowed.current.iter().copied()),
            prior: Totals::of(windowed.prior.iter().copied()),
            roster,
            weekday_min_visits: match mode {
                GenerationMode::Interactive => Some(self.weak_weekday_min_visits),
                GenerationMode::Batch => None,
            },
            currency_symbol: &self.currency_symbol,
        };

        ranker::select(mode.rules(), &ctx, mode.cap())
    }
}
