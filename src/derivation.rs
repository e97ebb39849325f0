//! Pure derivations applied to every normalized record: activity
//! classification, context usage, and display strings.

use crate::types::{ActivityStatus, Elapsed};

/// Activity within this window counts as working.
pub const WORKING_THRESHOLD_MS: u64 = 5 * 60 * 1000;

const SECOND_MS: u64 = 1000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

pub fn classify_activity(last_active: Elapsed, has_recent_errors: bool) -> ActivityStatus {
    if has_recent_errors {
        return ActivityStatus::Error;
    }
    match last_active {
        Some(ms) if ms < WORKING_THRESHOLD_MS => ActivityStatus::Working,
        _ => ActivityStatus::Idle,
    }
}

/// Share of the context window in use, rounded and capped at 100.
pub fn percent_used(total: u64, capacity: u64) -> u8 {
    if capacity == 0 {
        return 0;
    }
    let percent = (total as f64 / capacity as f64 * 100.0).round();
    percent.min(100.0) as u8
}

/// Converts a raw elapsed-time reading into [`Elapsed`]. Negative, NaN and
/// infinite readings mean "never".
pub fn elapsed_from_f64(ms: f64) -> Elapsed {
    if ms.is_finite() && ms >= 0.0 {
        Some(ms as u64)
    } else {
        None
    }
}

pub fn time_ago_text(last_active: Elapsed) -> String {
    let Some(ms) = last_active else {
        return "Never".to_string();
    };

    if ms >= DAY_MS {
        format!("{}d ago", ms / DAY_MS)
    } else if ms >= HOUR_MS {
        format!("{}h ago", ms / HOUR_MS)
    } else if ms >= MINUTE_MS {
        format!("{}m ago", ms / MINUTE_MS)
    } else {
        "just now".to_string()
    }
}

pub fn token_count_text(tokens: u64) -> String {
    if tokens >= 1_000_000 {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1_000 {
        format!("{:.1}K", tokens as f64 / 1_000.0)
    } else {
        tokens.to_string()
    }
}
