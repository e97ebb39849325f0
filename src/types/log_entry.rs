use serde::Serialize;
use serde_json::Value;

/// A normalized log line, in source order, before ids are assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub timestamp: Option<Value>,
    pub level: String,
    pub message: Option<String>,
    pub agent: Option<String>,
    pub session: Option<String>,
    pub stack: Option<String>,
    pub raw: Option<String>,
}

impl LogRecord {
    pub fn is_level(&self, level: &str) -> bool {
        self.level == level
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    #[serde(flatten)]
    pub record: LogRecord,
}

impl LogEntry {
    /// Numbers records in the order given: `log-001`, `log-002`, ...
    pub fn numbered(records: impl IntoIterator<Item = LogRecord>) -> Vec<LogEntry> {
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| LogEntry {
                id: format!("log-{:03}", index + 1),
                record,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
}
