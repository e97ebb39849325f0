use serde::Serialize;

use super::{ActivityStatus, AgentId, Elapsed};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_key: String,
    pub agent_id: AgentId,
    pub agent_name: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub last_active_ms: Elapsed,
    pub last_active_text: String,
    pub channel: String,
    pub status: ActivityStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTotals {
    pub sessions: usize,
    pub active_sessions: usize,
    pub total_tokens: u64,
}
