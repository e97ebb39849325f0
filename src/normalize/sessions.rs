use serde_json::Value;

use super::{count, decode, elapsed, text};
use crate::error::SourceError;
use crate::source::SourceQuery;
use crate::types::{AgentId, Elapsed, DEFAULT_CHANNEL, DEFAULT_MODEL};

const UNKNOWN_AGENT: &str = "unknown";

/// One session row from the sessions query, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_key: String,
    pub agent_id: AgentId,
    pub model: String,
    pub context_tokens: Option<u64>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub last_active_age_ms: Elapsed,
    pub channel: String,
}

pub fn normalize_sessions(raw: &str) -> Result<Vec<SessionSummary>, SourceError> {
    let document = decode(SourceQuery::Sessions, raw)?.into_document();
    Ok(sessions_from_document(&document))
}

fn sessions_from_document(document: &Value) -> Vec<SessionSummary> {
    let entries = match document {
        Value::Array(entries) => entries.as_slice(),
        other => other
            .get("sessions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
    };

    entries.iter().filter_map(summarize).collect()
}

fn summarize(entry: &Value) -> Option<SessionSummary> {
    let session_key = text(entry.get("sessionKey")).or_else(|| text(entry.get("key")))?;
    let agent_id = text(entry.get("agentId"))
        .or_else(|| agent_from_key(&session_key))
        .unwrap_or_else(|| UNKNOWN_AGENT.to_string());

    Some(SessionSummary {
        agent_id,
        model: text(entry.get("model")).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        context_tokens: count(entry.get("contextTokens")).filter(|c| *c > 0),
        input_tokens: count(entry.get("inputTokens")).unwrap_or(0),
        output_tokens: count(entry.get("outputTokens")).unwrap_or(0),
        total_tokens: count(entry.get("totalTokens")).unwrap_or(0),
        last_active_age_ms: elapsed(entry.get("lastActiveAgeMs"))
            .or_else(|| elapsed(entry.get("age"))),
        channel: text(entry.get("channel")).unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
        session_key,
    })
}

/// Session keys look like `agent:<id>:<name>`.
fn agent_from_key(key: &str) -> Option<String> {
    let mut parts = key.split(':');
    match (parts.next(), parts.next()) {
        (Some("agent"), Some(id)) if !id.is_empty() => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sessions_with_defaults() {
        let document = json!({
            "sessions": [
                {
                    "sessionKey": "agent:main:main",
                    "agentId": "main",
                    "model": "gpt-5.2",
                    "inputTokens": 50883,
                    "outputTokens": 378,
                    "totalTokens": 54202,
                    "lastActiveAgeMs": 132700,
                    "channel": "telegram"
                },
                { "sessionKey": "agent:neil:main", "agentId": "neil" }
            ]
        });
        let sessions = sessions_from_document(&document);

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].total_tokens, 54_202);
        assert_eq!(sessions[0].channel, "telegram");
        assert_eq!(sessions[1].model, DEFAULT_MODEL);
        assert_eq!(sessions[1].channel, "unknown");
        assert_eq!(sessions[1].last_active_age_ms, None);
    }

    #[test]
    fn test_key_and_age_aliases() {
        let document = json!([ { "key": "agent:archie:build", "age": 1200 } ]);
        let sessions = sessions_from_document(&document);

        assert_eq!(sessions[0].session_key, "agent:archie:build");
        assert_eq!(sessions[0].agent_id, "archie");
        assert_eq!(sessions[0].last_active_age_ms, Some(1200));
    }

    #[test]
    fn test_rows_without_key_are_dropped() {
        let document = json!({ "sessions": [ { "agentId": "main" }, "junk" ] });
        assert!(sessions_from_document(&document).is_empty());
    }

    #[test]
    fn test_orphan_agent_id() {
        let document = json!({ "sessions": [ { "sessionKey": "cron:nightly" } ] });
        let sessions = sessions_from_document(&document);
        assert_eq!(sessions[0].agent_id, "unknown");
    }

    #[test]
    fn test_missing_sessions_array() {
        let sessions = normalize_sessions("{\"count\": 0}").unwrap();
        assert!(sessions.is_empty());
    }
}
