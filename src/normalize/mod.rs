//! Turns raw status-tool output into stable internal shapes.
//!
//! Every query result goes through [`decode`] exactly once. The per-query
//! normalizers then read fields leniently: absent, `null`, mistyped,
//! negative or non-finite values fall back to defaults instead of failing
//! the whole payload.

pub mod health;
pub mod logs;
pub mod sessions;
pub mod status;

pub use health::{health_from_document, normalize_health, HealthSnapshot, RawChannel};
pub use logs::{normalize_logs, LogBatch};
pub use sessions::{normalize_sessions, SessionSummary};
pub use status::{normalize_status, GatewayReachability, StatusSnapshot};

use serde_json::Value;

use crate::derivation::elapsed_from_f64;
use crate::error::SourceError;
use crate::source::SourceQuery;
use crate::types::Elapsed;

/// Decoded tool output: one JSON document, or newline-delimited records.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Document(Value),
    Stream(Vec<Value>),
}

impl Payload {
    /// The single document this payload carries. A stream yields its first
    /// record.
    pub fn into_document(self) -> Value {
        match self {
            Payload::Document(value) => value,
            Payload::Stream(records) => records.into_iter().next().unwrap_or(Value::Null),
        }
    }
}

pub fn decode(query: SourceQuery, text: &str) -> Result<Payload, SourceError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SourceError::parse(query, "output was empty"));
    }

    if let Ok(document) = serde_json::from_str::<Value>(text) {
        return Ok(Payload::Document(document));
    }

    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str::<Value>(line)
            .map_err(|err| SourceError::parse(query, format!("line {}: {}", index + 1, err)))?;
        records.push(record);
    }

    Ok(Payload::Stream(records))
}

pub(crate) fn count(value: Option<&Value>) -> Option<u64> {
    value
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u64)
}

pub(crate) fn elapsed(value: Option<&Value>) -> Elapsed {
    value.and_then(Value::as_f64).and_then(elapsed_from_f64)
}

pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Strictly `true`; anything else, including truthy strings, is false.
pub(crate) fn flag(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool) == Some(true)
}
