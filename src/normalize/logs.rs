use serde_json::Value;

use super::{decode, text, Payload};
use crate::error::SourceError;
use crate::source::SourceQuery;
use crate::types::{LogRecord, LogSummary};

const LOG_RECORD_TYPE: &str = "log";
const DEFAULT_LEVEL: &str = "info";

/// All log records in source order, with error and warning counts taken
/// over the whole set before any filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogBatch {
    pub records: Vec<LogRecord>,
    pub summary: LogSummary,
}

impl LogBatch {
    pub fn from_records(records: Vec<LogRecord>) -> Self {
        let errors = records.iter().filter(|r| r.is_level("error")).count();
        let warnings = records.iter().filter(|r| r.is_level("warn")).count();
        Self {
            records,
            summary: LogSummary {
                total: errors + warnings,
                errors,
                warnings,
            },
        }
    }
}

pub fn normalize_logs(raw: &str) -> Result<LogBatch, SourceError> {
    let payload = decode(SourceQuery::Logs, raw)?;
    Ok(logs_from_payload(payload))
}

pub fn logs_from_payload(payload: Payload) -> LogBatch {
    let records = match payload {
        // A batch document: everything under `logs` is a log line unless
        // tagged otherwise.
        Payload::Document(Value::Object(ref map)) if map.get("logs").is_some_and(Value::is_array) => {
            map["logs"]
                .as_array()
                .into_iter()
                .flatten()
                .filter(|entry| match entry.get("type") {
                    None => true,
                    Some(kind) => kind.as_str() == Some(LOG_RECORD_TYPE),
                })
                .filter_map(record_from_value)
                .collect()
        }
        Payload::Document(Value::Array(entries)) | Payload::Stream(entries) => {
            tagged_records(&entries)
        }
        Payload::Document(single) => tagged_records(std::slice::from_ref(&single)),
    };

    LogBatch::from_records(records)
}

/// Stream records are only log lines when tagged `"type": "log"`; other
/// types are metadata.
fn tagged_records(entries: &[Value]) -> Vec<LogRecord> {
    entries
        .iter()
        .filter(|entry| entry.get("type").and_then(Value::as_str) == Some(LOG_RECORD_TYPE))
        .filter_map(record_from_value)
        .collect()
}

fn record_from_value(entry: &Value) -> Option<LogRecord> {
    if !entry.is_object() {
        return None;
    }

    let raw = text(entry.get("raw"));
    let agent = text(entry.get("agent")).or_else(|| raw.as_deref().and_then(agent_from_raw));

    Some(LogRecord {
        timestamp: entry
            .get("time")
            .filter(|v| !v.is_null())
            .or_else(|| entry.get("timestamp").filter(|v| !v.is_null()))
            .cloned(),
        level: text(entry.get("level")).unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
        message: text(entry.get("message")),
        agent,
        session: text(entry.get("session")),
        stack: text(entry.get("stack")),
        raw,
    })
}

fn agent_from_raw(raw: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(raw).ok()?;
    text(parsed.get("agent"))
}
