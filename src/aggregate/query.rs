use serde::Deserialize;

pub const DEFAULT_LOG_LIMIT: usize = 10;
pub const MAX_LOG_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelFilter {
    All,
    Only(String),
}

impl LevelFilter {
    pub fn parse(level: Option<&str>) -> Self {
        match level.map(str::trim) {
            None | Some("") | Some("all") => LevelFilter::All,
            Some(level) => LevelFilter::Only(level.to_string()),
        }
    }

    pub fn matches(&self, level: &str) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Only(wanted) => wanted == level,
        }
    }
}

/// Raw `/api/logs` query string. Values stay strings so a bad `limit` falls
/// back to the default instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogParams {
    pub limit: Option<String>,
    pub level: Option<String>,
    pub agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub limit: usize,
    pub level: LevelFilter,
    pub agent: Option<String>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LOG_LIMIT,
            level: LevelFilter::All,
            agent: None,
        }
    }
}

impl From<LogParams> for LogQuery {
    fn from(params: LogParams) -> Self {
        let limit = params
            .limit
            .as_deref()
            .and_then(leading_integer)
            .filter(|limit| *limit > 0)
            .map(|limit| (limit as u64).min(MAX_LOG_LIMIT as u64) as usize)
            .unwrap_or(DEFAULT_LOG_LIMIT);

        Self {
            limit,
            level: LevelFilter::parse(params.level.as_deref()),
            agent: non_empty(params.agent),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionParams {
    pub agent: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQuery {
    pub agent: Option<String>,
    pub active_only: bool,
}

impl From<SessionParams> for SessionQuery {
    fn from(params: SessionParams) -> Self {
        Self {
            agent: non_empty(params.agent),
            active_only: params.active.as_deref() == Some("true"),
        }
    }
}

/// The integer a query value starts with, so `5.5` reads as 5 and `12abc`
/// as 12. Digits too long for `i64` saturate.
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }

    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
