use serde::Serialize;
use std::collections::BTreeMap;

use super::{AgentRecord, ChannelStatus, GatewayState, LogEntry, OverallHealth};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub agents: usize,
    pub active_agents: usize,
    pub total_tokens: u64,
    pub total_sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub gateway: GatewayState,
    pub channels: BTreeMap<String, ChannelStatus>,
    pub overall: OverallHealth,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewAggregate {
    pub agents: Vec<AgentRecord>,
    pub health: HealthSummary,
    pub logs: Vec<LogEntry>,
    pub totals: Totals,
}
