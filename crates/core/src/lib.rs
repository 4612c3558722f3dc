pub mod config;
pub mod domain;
pub mod errors;
pub mod insights;
pub mod scheduler;

pub use domain::insight::{
    GenerationSlot, Insight, InsightIcon, InsightKind, InsightSet, InsightSetKey, InsightTag,
};
pub use domain::sales::{DateRange, SalesRecord, SalesRecordId, SellerId, StoreId, UserId};
pub use domain::store::{Seller, Store, StoreRoster};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use insights::{GenerationMode, InsightEngine};
pub use scheduler::{
    BatchReport, BusinessClock, DailyInsights, GenerationService, InsightSetStore,
    SalesRecordSource, SlotOutcome, UserDirectory, UserFailure,
};
