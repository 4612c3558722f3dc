use thiserror::Error;

use storepulse_core::errors::ApplicationError;

pub mod insight_set;
pub mod memory;
pub mod sales;

pub use insight_set::SqlInsightSetRepository;
pub use memory::{InMemoryInsightSetRepository, InMemorySalesRepository};
pub use sales::SqlSalesRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
}

impl RepositoryError {
    /// A failed read from the record store or insight table.
    pub fn into_read_failure(self) -> ApplicationError {
        ApplicationError::Integration(self.to_string())
    }

    /// A failed insight upsert.
    pub fn into_write_failure(self) -> ApplicationError {
        ApplicationError::Persistence(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use storepulse_core::errors::ApplicationError;

    use super::RepositoryError;

    #[test]
    fn read_and_write_failures_map_to_distinct_classes() {
        let read = RepositoryError::Decode("bad visits".to_string()).into_read_failure();
        let write = RepositoryError::Decode("bad json".to_string()).into_write_failure();

        assert_eq!(read, ApplicationError::Integration("decode error: bad visits".to_string()));
        assert_eq!(write, ApplicationError::Persistence("decode error: bad json".to_string()));
    }

    #[test]
    fn encode_failure_is_reported_as_encode() {
        let write = RepositoryError::Encode("insights: bad float".to_string()).into_write_failure();

        assert_eq!(
            write,
            ApplicationError::Persistence("encode error: insights: bad float".to_string())
        );
    }
}
