//! Common error types for stores, registries and queries

use thiserror::Error;

/// Result type for archive store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for registry loading
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for query execution
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised by an archive store provider
#[derive(Debug, Error)]
pub enum StoreError {
    /// Archive does not exist in the store
    #[error("Archive not found: {0}")]
    NotFound(String),

    /// Local I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote store returned an error or could not be reached
    #[error("HTTP error: {0}")]
    Http(String),

    /// Remote listing could not be decoded
    #[error("Malformed listing: {0}")]
    MalformedListing(String),

    /// Operation not supported by this provider
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Provider configuration is unusable
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while building the code registries at startup
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Source file could not be read
    #[error("Failed to read registry source {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Source is not valid CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Fewer than two columns, so no code/name pair can be located
    #[error("Can't find code/name columns in {source_name}: {headers:?}")]
    MissingColumns {
        source_name: String,
        headers: Vec<String>,
    },

    /// The same key maps to two different values
    #[error("Duplicate registry entry: {0}")]
    Duplicate(String),
}

/// Errors that abort a single query
///
/// Everything below the query boundary (missing archives, corrupt
/// containers, malformed fields) degrades to "no data" instead of
/// surfacing here.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A date input was not `YYYY-MM-DD`
    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// An aggregation name outside Average/Min/Max
    #[error("Unknown aggregation kind: {0}")]
    UnknownAggregation(String),

    /// The query exceeded its time budget
    #[error("Query timed out after {0} seconds")]
    Timeout(u64),

    /// Internal failure (worker panic, runtime shutdown)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryError {
    /// Returns the HTTP status code a response layer should use
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::InvalidDate(_) => 400,
            QueryError::UnknownAggregation(_) => 400,
            QueryError::Timeout(_) => 504,
            QueryError::Internal(_) => 500,
        }
    }

    /// Whether the caller sent a bad request
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_status() {
        assert_eq!(QueryError::InvalidDate("2024-13-01".into()).status_code(), 400);
        assert!(QueryError::UnknownAggregation("Median".into()).is_client_error());
        assert_eq!(QueryError::Timeout(30).status_code(), 504);
        assert!(!QueryError::Internal("boom".into()).is_client_error());
    }

    #[test]
    fn test_missing_columns_message() {
        let err = RegistryError::MissingColumns {
            source_name: "parameters.csv".into(),
            headers: vec!["only".into()],
        };
        assert!(err.to_string().contains("parameters.csv"));
    }
}
