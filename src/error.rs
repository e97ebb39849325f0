use thiserror::Error;

use crate::source::SourceQuery;

/// Failures talking to the external status source. Each variant names the
/// query that failed so aggregates can report it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to parse {query} output: {message}")]
    Parse { query: SourceQuery, message: String },

    #[error("{query} query timed out after {timeout_ms}ms")]
    Timeout { query: SourceQuery, timeout_ms: u64 },

    #[error("{query} query failed: {message}")]
    Failure { query: SourceQuery, message: String },

    #[error("Failed to run {query} query: {source}")]
    Io {
        query: SourceQuery,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub fn parse(query: SourceQuery, message: impl Into<String>) -> Self {
        SourceError::Parse {
            query,
            message: message.into(),
        }
    }

    pub fn failure(query: SourceQuery, message: impl Into<String>) -> Self {
        SourceError::Failure {
            query,
            message: message.into(),
        }
    }

    pub fn query(&self) -> SourceQuery {
        match self {
            SourceError::Parse { query, .. }
            | SourceError::Timeout { query, .. }
            | SourceError::Failure { query, .. }
            | SourceError::Io { query, .. } => *query,
        }
    }
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Agent not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_messages_name_the_query() {
        let err = SourceError::Timeout {
            query: SourceQuery::Health,
            timeout_ms: 5000,
        };
        assert_eq!(err.to_string(), "health query timed out after 5000ms");
        assert_eq!(err.query(), SourceQuery::Health);

        let err = SourceError::parse(SourceQuery::Logs, "expected value at line 1");
        assert_eq!(
            err.to_string(),
            "Failed to parse logs output: expected value at line 1"
        );
    }

    #[test]
    fn test_dashboard_error_wraps_source_transparently() {
        let err: DashboardError = SourceError::failure(SourceQuery::Status, "exit status 1").into();
        assert_eq!(err.to_string(), "status query failed: exit status 1");
    }
}
