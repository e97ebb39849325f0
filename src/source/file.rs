use async_trait::async_trait;
use std::path::PathBuf;

use super::{SourceQuery, StatusSource};
use crate::error::SourceError;

/// Serves canned tool output from a directory. Files are re-read on every
/// query.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, query: SourceQuery) -> Vec<PathBuf> {
        match query {
            SourceQuery::Logs => vec![
                self.root.join("logs.ndjson"),
                self.root.join("logs.json"),
            ],
            other => vec![self.root.join(format!("{}.json", other.as_str()))],
        }
    }
}

#[async_trait]
impl StatusSource for FileSource {
    async fn query(&self, query: SourceQuery) -> Result<String, SourceError> {
        for path in self.candidates(query) {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => return Ok(content.trim().to_string()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => return Err(SourceError::Io { query, source }),
            }
        }

        Err(SourceError::failure(
            query,
            format!("no fixture for {} in {}", query, self.root.display()),
        ))
    }

    fn describe(&self) -> String {
        format!("fixtures in {}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_query_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("health.json"), "{\"ok\":true}\n").unwrap();

        let source = FileSource::new(dir.path());
        let output = source.query(SourceQuery::Health).await.unwrap();
        assert_eq!(output, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_logs_prefer_ndjson() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("logs.json"), "{\"logs\":[]}").unwrap();
        std::fs::write(dir.path().join("logs.ndjson"), "{\"type\":\"meta\"}").unwrap();

        let source = FileSource::new(dir.path());
        let output = source.query(SourceQuery::Logs).await.unwrap();
        assert_eq!(output, "{\"type\":\"meta\"}");
    }

    #[tokio::test]
    async fn test_missing_file_is_failure() {
        let dir = TempDir::new().unwrap();
        let source = FileSource::new(dir.path());

        let err = source.query(SourceQuery::Sessions).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Failure {
                query: SourceQuery::Sessions,
                ..
            }
        ));
    }
}
