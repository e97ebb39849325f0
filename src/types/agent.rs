use serde::{Deserialize, Serialize};

use super::{ActivityStatus, AgentId, Elapsed, SessionRecord};

/// Per-agent session aggregate as reported by the status query, after
/// normalization to the mapping form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub session_count: u64,
    pub model: String,
    pub context_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub last_active_age_ms: Elapsed,
}

/// Display identity for an agent id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: AgentId,
    pub name: String,
    pub emoji: String,
    pub status: ActivityStatus,
    pub model: String,
    pub context_tokens: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub percent_used: u8,
    pub session_count: u64,
    pub last_active_ms: Elapsed,
    pub last_active_text: String,
}

impl AgentRecord {
    pub fn is_working(&self) -> bool {
        self.status.is_working()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
    pub percent_used: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetail {
    pub id: AgentId,
    pub name: String,
    pub emoji: String,
    pub status: ActivityStatus,
    pub model: String,
    pub context_tokens: u64,
    pub tokens: TokenUsage,
    pub sessions: Vec<SessionRecord>,
    pub last_active_ms: Elapsed,
    pub last_active_text: String,
}
