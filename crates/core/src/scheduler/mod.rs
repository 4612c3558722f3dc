//! Daily generation scheduling and the collaborators it reads from and writes to.

pub mod clock;
pub mod ports;
pub mod service;

pub use clock::BusinessClock;
pub use ports::{InsightSetStore, SalesRecordSource, UserDirectory};
pub use service::{BatchReport, DailyInsights, GenerationService, SlotOutcome, UserFailure};
