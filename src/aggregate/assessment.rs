use std::collections::BTreeMap;

use crate::types::{
    ChannelState, ChannelStatus, GatewayState, HealthAssessment, HealthIndicators, Indicator,
    OverallHealth,
};

/// Scores gateway and channel state into an overall verdict plus one traffic
/// light per dimension.
///
/// `overall` is critical whenever the gateway is not running, degraded when
/// any channel is not connected, and healthy otherwise. A channel connected
/// only by probe (its `running` flag is false) still counts as connected
/// for `overall` but turns the channels light yellow.
pub fn assess(gateway: &GatewayState, channels: &BTreeMap<String, ChannelState>) -> HealthAssessment {
    let gateway_running = gateway.status.is_running();
    let all_connected = channels
        .values()
        .all(|channel| channel.status == ChannelStatus::Connected);
    let any_probe_only = channels.values().any(ChannelState::is_probe_only);
    let any_last_error = channels.values().any(|channel| channel.last_error.is_some());

    let overall = if !gateway_running {
        OverallHealth::Critical
    } else if !all_connected {
        OverallHealth::Degraded
    } else {
        OverallHealth::Healthy
    };

    HealthAssessment {
        overall,
        indicators: HealthIndicators {
            gateway: if gateway_running {
                Indicator::Green
            } else {
                Indicator::Red
            },
            channels: if all_connected && !any_probe_only {
                Indicator::Green
            } else {
                Indicator::Yellow
            },
            errors: if any_last_error {
                Indicator::Yellow
            } else {
                Indicator::Green
            },
        },
    }
}
