pub mod agent;
pub mod health;
pub mod log_entry;
pub mod overview;
pub mod session;

pub use agent::{AgentDetail, AgentProfile, AgentRecord, AgentSummary, TokenUsage};
pub use health::{
    ChannelState, ChannelStatus, GatewayState, GatewayStatus, HealthAssessment, HealthIndicators,
    Indicator, OverallHealth, Timestamp,
};
pub use log_entry::{LogEntry, LogRecord, LogSummary};
pub use overview::{HealthSummary, OverviewAggregate, Totals};
pub use session::{SessionRecord, SessionTotals};

use serde::{Deserialize, Serialize};

pub type AgentId = String;

/// Milliseconds since an agent or session was last active. `None` means it
/// has never been active.
pub type Elapsed = Option<u64>;

pub const DEFAULT_MODEL: &str = "glm-5";
pub const DEFAULT_CONTEXT_TOKENS: u64 = 204_800;
pub const DEFAULT_CHANNEL: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Working,
    Idle,
    Error,
}

impl ActivityStatus {
    pub fn is_working(&self) -> bool {
        *self == ActivityStatus::Working
    }
}
