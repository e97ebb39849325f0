use serde_json::Value;
use std::collections::BTreeMap;

use super::{count, decode, flag, text, GatewayReachability};
use crate::error::SourceError;
use crate::source::SourceQuery;
use crate::types::{ChannelState, ChannelStatus, GatewayState, GatewayStatus, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub ok: bool,
    pub gateway: GatewayState,
    pub channels: BTreeMap<String, ChannelState>,
}

/// A channel entry as the tool emits it. Older tool versions print a bare
/// status string; newer ones print the connectivity flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawChannel {
    Legacy(String),
    Structured {
        configured: bool,
        running: bool,
        probe_ok: bool,
        connected_at: Option<Timestamp>,
        last_error: Option<String>,
    },
}

impl RawChannel {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(status) => Some(RawChannel::Legacy(status.clone())),
            Value::Object(_) => Some(RawChannel::Structured {
                configured: flag(value.get("configured")),
                running: flag(value.get("running")),
                probe_ok: flag(value.pointer("/probe/ok")),
                connected_at: timestamp(value.get("lastStartAt")),
                last_error: text(value.get("lastError")),
            }),
            _ => None,
        }
    }

    pub fn into_state(self) -> ChannelState {
        match self {
            RawChannel::Legacy(status) => ChannelState::legacy(&status),
            RawChannel::Structured {
                configured,
                running,
                probe_ok,
                connected_at,
                last_error,
            } => ChannelState {
                status: ChannelStatus::derive(configured, running, probe_ok),
                connected_at,
                configured,
                running,
                probe_ok,
                last_error,
            },
        }
    }
}

pub fn normalize_health(
    raw: &str,
    reachability: Option<&GatewayReachability>,
) -> Result<HealthSnapshot, SourceError> {
    let document = decode(SourceQuery::Health, raw)?.into_document();
    Ok(health_from_document(&document, reachability))
}

/// Normalizes a health document. Pass `Value::Null` when the health query
/// failed so the gateway can still be derived from reachability alone.
pub fn health_from_document(
    document: &Value,
    reachability: Option<&GatewayReachability>,
) -> HealthSnapshot {
    let ok = flag(document.get("ok"));
    let raw_gateway = document.get("gateway");

    let status = match reachability.and_then(|r| r.reachable) {
        Some(true) => GatewayStatus::Running,
        Some(false) => GatewayStatus::Stopped,
        None if ok => GatewayStatus::Running,
        None => GatewayStatus::Unknown,
    };

    let defaults = GatewayState::default();
    let gateway = GatewayState {
        status,
        version: reachability
            .and_then(|r| r.version.clone())
            .or_else(|| text(raw_gateway.and_then(|g| g.get("version"))))
            .unwrap_or(defaults.version),
        uptime: text(raw_gateway.and_then(|g| g.get("uptime"))).unwrap_or(defaults.uptime),
        uptime_seconds: count(raw_gateway.and_then(|g| g.get("uptimeSeconds"))).unwrap_or(0),
        pid: count(raw_gateway.and_then(|g| g.get("pid"))).and_then(|pid| u32::try_from(pid).ok()),
    };

    let mut channels = BTreeMap::new();
    if let Some(Value::Object(raw_channels)) = document.get("channels") {
        for (name, value) in raw_channels {
            if let Some(channel) = RawChannel::from_value(value) {
                channels.insert(name.clone(), channel.into_state());
            }
        }
    }

    HealthSnapshot {
        ok,
        gateway,
        channels,
    }
}

fn timestamp(value: Option<&Value>) -> Option<Timestamp> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .map(Timestamp::Millis),
        Value::String(s) if !s.trim().is_empty() => Some(Timestamp::Text(s.clone())),
        _ => None,
    }
}
