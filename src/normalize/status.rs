use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{count, decode, elapsed, text};
use crate::error::SourceError;
use crate::source::SourceQuery;
use crate::types::{AgentId, AgentSummary, DEFAULT_CONTEXT_TOKENS, DEFAULT_MODEL};

/// Gateway signals carried by the status query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayReachability {
    pub reachable: Option<bool>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub gateway: GatewayReachability,
    pub agents: BTreeMap<AgentId, AgentSummary>,
    order: Vec<AgentId>,
}

impl StatusSnapshot {
    /// A repeated id replaces the earlier summary but keeps its position.
    fn record(&mut self, agent_id: AgentId, summary: AgentSummary) {
        if self.agents.insert(agent_id.clone(), summary).is_none() {
            self.order.push(agent_id);
        }
    }

    /// Agents in the order the status query listed them.
    pub fn agents_in_order(&self) -> impl Iterator<Item = (&AgentId, &AgentSummary)> {
        self.order.iter().filter_map(|id| self.agents.get_key_value(id))
    }
}

/// Fallbacks for agents whose representative session omits model or
/// context size.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionDefaults {
    model: String,
    context_tokens: u64,
}

impl SessionDefaults {
    fn from_sessions(sessions: Option<&Value>) -> Self {
        let defaults = sessions.and_then(|s| s.get("defaults"));
        Self {
            model: text(defaults.and_then(|d| d.get("model")))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            context_tokens: count(defaults.and_then(|d| d.get("contextTokens")))
                .filter(|c| *c > 0)
                .unwrap_or(DEFAULT_CONTEXT_TOKENS),
        }
    }
}

/// The two encodings the tool uses for per-agent session summaries.
enum ByAgent<'a> {
    Mapping(&'a Map<String, Value>),
    Sequence(&'a [Value]),
}

impl<'a> ByAgent<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(ByAgent::Mapping(map)),
            Value::Array(items) => Some(ByAgent::Sequence(items)),
            _ => None,
        }
    }
}

pub fn normalize_status(raw: &str) -> Result<StatusSnapshot, SourceError> {
    let document = decode(SourceQuery::Status, raw)?.into_document();
    Ok(status_from_document(&document))
}

fn status_from_document(document: &Value) -> StatusSnapshot {
    let gateway = document.get("gateway");
    let reachability = GatewayReachability {
        reachable: gateway.and_then(|g| g.get("reachable")).and_then(Value::as_bool),
        version: text(gateway.and_then(|g| g.pointer("/self/version"))),
    };

    let sessions = document.get("sessions");
    let defaults = SessionDefaults::from_sessions(sessions);

    let mut snapshot = StatusSnapshot {
        gateway: reachability,
        ..StatusSnapshot::default()
    };
    match sessions.and_then(|s| s.get("byAgent")).and_then(ByAgent::from_value) {
        Some(ByAgent::Mapping(map)) => {
            for (agent_id, entry) in map {
                if entry.is_object() {
                    snapshot.record(agent_id.clone(), summarize(entry, &defaults));
                }
            }
        }
        Some(ByAgent::Sequence(items)) => {
            for entry in items {
                let Some(agent_id) = text(entry.get("agentId")) else {
                    continue;
                };
                snapshot.record(agent_id, summarize(entry, &defaults));
            }
        }
        None => {}
    }

    snapshot
}

/// Builds one agent summary. Entries in the raw shape carry `count` and a
/// most-recent-first `recent` list whose head is the representative
/// session; entries already in summary shape carry the fields directly.
fn summarize(entry: &Value, defaults: &SessionDefaults) -> AgentSummary {
    let session_count = count(entry.get("sessionCount"))
        .or_else(|| count(entry.get("count")))
        .unwrap_or(0);

    let (latest, age_key) = match entry.get("recent").and_then(Value::as_array) {
        Some(recent) => (recent.first(), "age"),
        None => (Some(entry), "lastActiveAgeMs"),
    };
    let field = |key: &str| latest.and_then(|session| session.get(key));

    AgentSummary {
        session_count,
        model: text(field("model")).unwrap_or_else(|| defaults.model.clone()),
        context_tokens: count(field("contextTokens"))
            .filter(|c| *c > 0)
            .unwrap_or(defaults.context_tokens),
        input_tokens: count(field("inputTokens")).unwrap_or(0),
        output_tokens: count(field("outputTokens")).unwrap_or(0),
        total_tokens: count(field("totalTokens")).unwrap_or(0),
        last_active_age_ms: elapsed(field(age_key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_status() -> Value {
        json!({
            "gateway": {
                "reachable": true,
                "self": { "version": "2026.2.3-1" }
            },
            "sessions": {
                "count": 20,
                "defaults": { "model": "glm-5", "contextTokens": 204800 },
                "byAgent": [
                    {
                        "agentId": "main",
                        "count": 18,
                        "recent": [
                            {
                                "key": "agent:main:main",
                                "age": 132700,
                                "inputTokens": 50883,
                                "outputTokens": 378,
                                "totalTokens": 54202,
                                "model": "gpt-5.2",
                                "contextTokens": 272000
                            },
                            { "key": "agent:main:older", "age": 900000, "totalTokens": 1 }
                        ]
                    },
                    {
                        "agentId": "neil",
                        "count": 2,
                        "recent": [
                            {
                                "age": 330869276,
                                "totalTokens": null,
                                "model": "glm-5",
                                "contextTokens": 204800
                            }
                        ]
                    }
                ]
            }
        })
    }

    #[test]
    fn test_sequence_form_becomes_mapping() {
        let snapshot = status_from_document(&sample_status());

        assert_eq!(snapshot.agents.len(), 2);
        let main = &snapshot.agents["main"];
        assert_eq!(main.session_count, 18);
        assert_eq!(main.model, "gpt-5.2");
        assert_eq!(main.context_tokens, 272_000);
        assert_eq!(main.input_tokens, 50_883);
        assert_eq!(main.output_tokens, 378);
        assert_eq!(main.total_tokens, 54_202);
        assert_eq!(main.last_active_age_ms, Some(132_700));

        let neil = &snapshot.agents["neil"];
        assert_eq!(neil.session_count, 2);
        assert_eq!(neil.total_tokens, 0);
    }

    #[test]
    fn test_agents_keep_listed_order() {
        let document = json!({
            "sessions": {
                "byAgent": [
                    { "agentId": "main", "count": 1, "recent": [] },
                    { "agentId": "archie", "count": 2, "recent": [] },
                    { "agentId": "main", "count": 5, "recent": [] }
                ]
            }
        });
        let snapshot = status_from_document(&document);
        let listed: Vec<(&str, u64)> = snapshot
            .agents_in_order()
            .map(|(id, summary)| (id.as_str(), summary.session_count))
            .collect();
        assert_eq!(listed, vec![("main", 5), ("archie", 2)]);

        let mapping = json!({
            "sessions": { "byAgent": { "trevor": { "sessionCount": 1 }, "alana": { "sessionCount": 1 } } }
        });
        let mapped = status_from_document(&mapping);
        let ids: Vec<&str> = mapped
            .agents_in_order()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(ids, vec!["trevor", "alana"]);
    }

    #[test]
    fn test_gateway_signals_extracted() {
        let snapshot = status_from_document(&sample_status());
        assert_eq!(snapshot.gateway.reachable, Some(true));
        assert_eq!(snapshot.gateway.version.as_deref(), Some("2026.2.3-1"));
    }

    #[test]
    fn test_empty_recent_uses_defaults_and_never() {
        let document = json!({
            "sessions": { "byAgent": [ { "agentId": "kai", "count": 0, "recent": [] } ] }
        });
        let snapshot = status_from_document(&document);
        let kai = &snapshot.agents["kai"];

        assert_eq!(kai.model, DEFAULT_MODEL);
        assert_eq!(kai.context_tokens, DEFAULT_CONTEXT_TOKENS);
        assert_eq!(kai.total_tokens, 0);
        assert_eq!(kai.last_active_age_ms, None);
    }

    #[test]
    fn test_status_defaults_override_hard_defaults() {
        let document = json!({
            "sessions": {
                "defaults": { "model": "opus", "contextTokens": 1000000 },
                "byAgent": [ { "agentId": "kai", "recent": [ { "age": 5 } ] } ]
            }
        });
        let snapshot = status_from_document(&document);
        assert_eq!(snapshot.agents["kai"].model, "opus");
        assert_eq!(snapshot.agents["kai"].context_tokens, 1_000_000);
    }

    #[test]
    fn test_records_without_agent_id_are_dropped() {
        let document = json!({
            "sessions": {
                "byAgent": [
                    { "count": 3, "recent": [] },
                    { "agentId": "", "count": 1 },
                    42,
                    { "agentId": "archie", "count": 1, "recent": [] }
                ]
            }
        });
        let snapshot = status_from_document(&document);
        assert_eq!(snapshot.agents.keys().collect::<Vec<_>>(), vec!["archie"]);
    }

    #[test]
    fn test_sequence_and_mapping_forms_agree() {
        let from_sequence = status_from_document(&sample_status());

        let mapping = serde_json::to_value(&from_sequence.agents).unwrap();
        let document = json!({ "sessions": { "byAgent": mapping } });
        let from_mapping = status_from_document(&document);

        assert_eq!(from_sequence.agents, from_mapping.agents);
    }

    #[test]
    fn test_zero_context_falls_back_to_default() {
        let document = json!({
            "sessions": { "byAgent": { "alana": { "sessionCount": 1, "contextTokens": 0 } } }
        });
        let snapshot = status_from_document(&document);
        assert_eq!(snapshot.agents["alana"].context_tokens, DEFAULT_CONTEXT_TOKENS);
        assert_eq!(snapshot.agents["alana"].last_active_age_ms, None);
    }

    #[test]
    fn test_missing_sessions_is_empty() {
        let snapshot = normalize_status("{\"gateway\": {\"reachable\": false}}").unwrap();
        assert!(snapshot.agents.is_empty());
        assert_eq!(snapshot.gateway.reachable, Some(false));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = normalize_status("openclaw: command not found").unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
