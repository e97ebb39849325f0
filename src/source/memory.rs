use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{SourceQuery, StatusSource};
use crate::error::SourceError;

#[derive(Debug, Clone)]
enum Canned {
    Output(String),
    Failure(String),
    Timeout(u64),
}

/// Holds tool output in memory. Outputs can be swapped between queries; a
/// query with nothing recorded fails upstream.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    outputs: Arc<RwLock<HashMap<SourceQuery, Canned>>>,
    calls: Arc<RwLock<HashMap<SourceQuery, usize>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(self, query: SourceQuery, output: impl Into<String>) -> Self {
        self.set_output(query, output);
        self
    }

    pub fn with_failure(self, query: SourceQuery, message: impl Into<String>) -> Self {
        self.record(query, Canned::Failure(message.into()));
        self
    }

    pub fn with_timeout(self, query: SourceQuery, timeout_ms: u64) -> Self {
        self.record(query, Canned::Timeout(timeout_ms));
        self
    }

    pub fn set_output(&self, query: SourceQuery, output: impl Into<String>) {
        self.record(query, Canned::Output(output.into()));
    }

    pub fn calls(&self, query: SourceQuery) -> usize {
        let calls = self.calls.read().unwrap_or_else(|e| e.into_inner());
        calls.get(&query).copied().unwrap_or(0)
    }

    fn record(&self, query: SourceQuery, canned: Canned) {
        let mut outputs = self.outputs.write().unwrap_or_else(|e| e.into_inner());
        outputs.insert(query, canned);
    }
}

#[async_trait]
impl StatusSource for MemorySource {
    async fn query(&self, query: SourceQuery) -> Result<String, SourceError> {
        {
            let mut calls = self.calls.write().unwrap_or_else(|e| e.into_inner());
            *calls.entry(query).or_insert(0) += 1;
        }

        let canned = {
            let outputs = self.outputs.read().unwrap_or_else(|e| e.into_inner());
            outputs.get(&query).cloned()
        };

        match canned {
            Some(Canned::Output(output)) => Ok(output),
            Some(Canned::Failure(message)) => Err(SourceError::failure(query, message)),
            Some(Canned::Timeout(timeout_ms)) => Err(SourceError::Timeout { query, timeout_ms }),
            None => Err(SourceError::failure(query, "no output recorded")),
        }
    }

    fn describe(&self) -> String {
        "in-memory source".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recorded_outputs() {
        let source = MemorySource::new()
            .with_output(SourceQuery::Status, "{}")
            .with_failure(SourceQuery::Health, "gateway closed")
            .with_timeout(SourceQuery::Logs, 5000);

        assert_eq!(source.query(SourceQuery::Status).await.unwrap(), "{}");
        assert!(matches!(
            source.query(SourceQuery::Health).await,
            Err(SourceError::Failure { query: SourceQuery::Health, .. })
        ));
        assert!(matches!(
            source.query(SourceQuery::Logs).await,
            Err(SourceError::Timeout { timeout_ms: 5000, .. })
        ));
        assert!(source.query(SourceQuery::Sessions).await.is_err());
    }

    #[tokio::test]
    async fn test_outputs_can_change_between_queries() {
        let source = MemorySource::new().with_output(SourceQuery::Status, "first");
        assert_eq!(source.query(SourceQuery::Status).await.unwrap(), "first");

        source.set_output(SourceQuery::Status, "second");
        assert_eq!(source.query(SourceQuery::Status).await.unwrap(), "second");
        assert_eq!(source.calls(SourceQuery::Status), 2);
        assert_eq!(source.calls(SourceQuery::Health), 0);
    }
}
