use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    Running,
    Stopped,
    Unknown,
}

impl GatewayStatus {
    pub fn is_running(&self) -> bool {
        *self == GatewayStatus::Running
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelStatus {
    Connected,
    Connecting,
    Disconnected,
    NotConfigured,
    Error,
    Unknown,
}

impl ChannelStatus {
    /// Derives connectivity from the structured channel flags. A successful
    /// probe outranks `running`, which outranks `configured`.
    pub fn derive(configured: bool, running: bool, probe_ok: bool) -> Self {
        if probe_ok {
            ChannelStatus::Connected
        } else if running {
            ChannelStatus::Connecting
        } else if configured {
            ChannelStatus::Disconnected
        } else {
            ChannelStatus::NotConfigured
        }
    }

    /// Maps a legacy bare-string channel status onto the enum.
    pub fn from_legacy(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "connected" => ChannelStatus::Connected,
            "connecting" => ChannelStatus::Connecting,
            "disconnected" => ChannelStatus::Disconnected,
            "not_configured" => ChannelStatus::NotConfigured,
            "error" => ChannelStatus::Error,
            _ => ChannelStatus::Unknown,
        }
    }
}

/// A point in time as the source reports it: epoch milliseconds or a
/// preformatted string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelState {
    pub status: ChannelStatus,
    pub connected_at: Option<Timestamp>,
    pub configured: bool,
    pub running: bool,
    pub probe_ok: bool,
    pub last_error: Option<String>,
}

impl ChannelState {
    pub fn legacy(status: &str) -> Self {
        Self {
            status: ChannelStatus::from_legacy(status),
            connected_at: None,
            configured: false,
            running: false,
            probe_ok: false,
            last_error: None,
        }
    }

    /// Connected on the strength of a live probe while the process flag says
    /// it is not running.
    pub fn is_probe_only(&self) -> bool {
        self.status == ChannelStatus::Connected && self.probe_ok && !self.running
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayState {
    pub status: GatewayStatus,
    pub version: String,
    pub uptime: String,
    pub uptime_seconds: u64,
    pub pid: Option<u32>,
}

impl Default for GatewayState {
    fn default() -> Self {
        Self {
            status: GatewayStatus::Unknown,
            version: "N/A".to_string(),
            uptime: "N/A".to_string(),
            uptime_seconds: 0,
            pid: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    Healthy,
    Degraded,
    Critical,
}

impl OverallHealth {
    pub fn as_str(&self) -> &str {
        match self {
            OverallHealth::Healthy => "healthy",
            OverallHealth::Degraded => "degraded",
            OverallHealth::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthIndicators {
    pub gateway: Indicator,
    pub channels: Indicator,
    pub errors: Indicator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthAssessment {
    pub overall: OverallHealth,
    pub indicators: HealthIndicators,
}
