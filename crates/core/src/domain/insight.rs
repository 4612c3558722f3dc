use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::sales::UserId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Trend,
    StoreLoss,
    SellerLoss,
    WeakWeekday,
    MissingTicket,
    ConversionLift,
    TopSeller,
    LowestStore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightTag {
    Alert,
    Opportunity,
    Info,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightIcon {
    TrendingUp,
    TrendingDown,
    Store,
    User,
    Calendar,
    AlertTriangle,
    Target,
    Award,
}

/// One rendered insight card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub tag: InsightTag,
    pub icon: InsightIcon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Fixed UTC instant standing for "the business day's generation slot".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationSlot(pub DateTime<Utc>);

impl GenerationSlot {
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Partition key of a persisted insight set.
///
/// Batch runs key by slot instant, the interactive path keys by calendar day.
/// The two spaces are stored side by side and never compared with each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "key_space", content = "key_value", rename_all = "snake_case")]
pub enum InsightSetKey {
    Slot(GenerationSlot),
    Day(NaiveDate),
}

impl InsightSetKey {
    pub fn key_space(&self) -> &'static str {
        match self {
            Self::Slot(_) => "slot",
            Self::Day(_) => "day",
        }
    }

    pub fn key_value(&self) -> String {
        match self {
            Self::Slot(slot) => slot.0.to_rfc3339_opts(SecondsFormat::Secs, true),
            Self::Day(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn parse(key_space: &str, key_value: &str) -> Result<Self, DomainError> {
        match key_space {
            "slot" => DateTime::parse_from_rfc3339(key_value)
                .map(|instant| Self::Slot(GenerationSlot(instant.with_timezone(&Utc))))
                .map_err(|error| {
                    DomainError::InvalidEncoding(format!("slot key `{key_value}`: {error}"))
                }),
            "day" => NaiveDate::parse_from_str(key_value, "%Y-%m-%d")
                .map(Self::Day)
                .map_err(|error| {
                    DomainError::InvalidEncoding(format!("day key `{key_value}`: {error}"))
                }),
            other => Err(DomainError::InvalidEncoding(format!("unknown key space `{other}`"))),
        }
    }
}

/// The persisted outcome of one generation run for one partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightSet {
    pub user_id: UserId,
    pub key: InsightSetKey,
    pub insights: Vec<Insight>,
    pub generated_at: DateTime<Utc>,
}

impl InsightSet {
    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }
}
