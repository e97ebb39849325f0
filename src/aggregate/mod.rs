pub mod assessment;
pub mod query;

pub use assessment::assess;
pub use query::{LevelFilter, LogParams, LogQuery, SessionParams, SessionQuery};

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::derivation::{classify_activity, percent_used, time_ago_text};
use crate::directory::AgentDirectory;
use crate::error::{DashboardError, DashboardResult, SourceError};
use crate::normalize::{
    health_from_document, normalize_health, normalize_logs, normalize_sessions,
    normalize_status, GatewayReachability, HealthSnapshot, SessionSummary,
};
use crate::source::{SourceQuery, StatusSource};
use crate::types::{
    AgentDetail, AgentId, AgentRecord, AgentSummary, ChannelState, Elapsed, GatewayState,
    HealthIndicators, HealthSummary, LogEntry, LogSummary, OverallHealth, OverviewAggregate,
    SessionRecord, SessionTotals, TokenUsage, Totals, DEFAULT_CONTEXT_TOKENS,
};

pub const OVERVIEW_ERROR_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentListing {
    pub agents: Vec<AgentRecord>,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub gateway: GatewayState,
    pub channels: BTreeMap<String, ChannelState>,
    pub overall: OverallHealth,
    pub indicators: HealthIndicators,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogListing {
    pub logs: Vec<LogEntry>,
    pub summary: LogSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionListing {
    pub sessions: Vec<SessionRecord>,
    pub totals: SessionTotals,
}

/// Answers every dashboard query by calling the status source, normalizing
/// the output, and joining it with the agent directory. Holds no state
/// between calls.
pub struct Dashboard {
    source: Arc<dyn StatusSource>,
    directory: AgentDirectory,
}

impl Dashboard {
    pub fn new(source: Arc<dyn StatusSource>, directory: AgentDirectory) -> Self {
        Self { source, directory }
    }

    pub fn directory(&self) -> &AgentDirectory {
        &self.directory
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }

    /// Everything the dashboard front page shows. Each of the four queries
    /// fails independently; a failed one contributes an empty placeholder.
    pub async fn overview(&self) -> DashboardResult<OverviewAggregate> {
        let (status, health, logs, sessions) = tokio::join!(
            self.source.query(SourceQuery::Status),
            self.source.query(SourceQuery::Health),
            self.source.query(SourceQuery::Logs),
            self.source.query(SourceQuery::Sessions),
        );

        let status = settle(status.and_then(|raw| normalize_status(&raw)));
        let reachability = status.as_ref().map(|s| &s.gateway);
        let health = health_or_placeholder(health, reachability);
        let logs = settle(logs.and_then(|raw| normalize_logs(&raw)));
        let sessions = settle(sessions.and_then(|raw| normalize_sessions(&raw)));

        let agents: Vec<AgentRecord> = match (status, sessions) {
            (Some(status), _) => status
                .agents_in_order()
                .map(|(id, summary)| self.agent_record(id, summary))
                .collect(),
            // Without a status snapshot, rebuild per-agent figures from the
            // session rows.
            (None, Some(sessions)) => summaries_from_sessions(&sessions)
                .iter()
                .map(|(id, summary)| self.agent_record(id, summary))
                .collect(),
            (None, None) => Vec::new(),
        };
        let totals = totals_for(&agents);

        let assessment = assess(&health.gateway, &health.channels);
        let channels = health
            .channels
            .iter()
            .map(|(name, channel)| (name.clone(), channel.status))
            .collect();

        let recent_errors = logs
            .map(|batch| {
                LogEntry::numbered(
                    batch
                        .records
                        .into_iter()
                        .filter(|record| record.is_level("error"))
                        .take(OVERVIEW_ERROR_LIMIT),
                )
            })
            .unwrap_or_default();

        Ok(OverviewAggregate {
            agents,
            health: HealthSummary {
                gateway: health.gateway,
                channels,
                overall: assessment.overall,
            },
            logs: recent_errors,
            totals,
        })
    }

    /// All agents, working ones first, then by name.
    pub async fn agents(&self) -> DashboardResult<AgentListing> {
        let raw = self.source.query(SourceQuery::Status).await?;
        let status = normalize_status(&raw)?;

        let mut agents: Vec<AgentRecord> = status
            .agents
            .iter()
            .map(|(id, summary)| self.agent_record(id, summary))
            .collect();
        sort_agents(&mut agents);

        let totals = totals_for(&agents);
        Ok(AgentListing { agents, totals })
    }

    pub async fn agent(&self, agent_id: &str) -> DashboardResult<AgentDetail> {
        let (status, sessions) = tokio::join!(
            self.source.query(SourceQuery::Status),
            self.source.query(SourceQuery::Sessions),
        );

        let status = normalize_status(&status?)?;
        let sessions = normalize_sessions(&sessions?)?;

        let summary = status
            .agents
            .get(agent_id)
            .ok_or_else(|| DashboardError::NotFound(agent_id.to_string()))?;
        let record = self.agent_record(agent_id, summary);

        let sessions = sessions
            .into_iter()
            .filter(|session| session.agent_id == agent_id)
            .map(|session| self.session_record(session))
            .collect();

        Ok(AgentDetail {
            tokens: TokenUsage {
                input: record.input_tokens,
                output: record.output_tokens,
                total: record.total_tokens,
                percent_used: record.percent_used,
            },
            id: record.id,
            name: record.name,
            emoji: record.emoji,
            status: record.status,
            model: record.model,
            context_tokens: record.context_tokens,
            sessions,
            last_active_ms: record.last_active_ms,
            last_active_text: record.last_active_text,
        })
    }

    pub async fn health(&self) -> DashboardResult<HealthReport> {
        let (health, status) = tokio::join!(
            self.source.query(SourceQuery::Health),
            self.source.query(SourceQuery::Status),
        );

        let status = settle(status.and_then(|raw| normalize_status(&raw)));
        let health = health_or_placeholder(health, status.as_ref().map(|s| &s.gateway));
        let assessment = assess(&health.gateway, &health.channels);

        Ok(HealthReport {
            gateway: health.gateway,
            channels: health.channels,
            overall: assessment.overall,
            indicators: assessment.indicators,
        })
    }

    pub async fn logs(&self, query: &LogQuery) -> DashboardResult<LogListing> {
        let raw = self.source.query(SourceQuery::Logs).await?;
        let batch = normalize_logs(&raw)?;

        let selected = batch
            .records
            .into_iter()
            .filter(|record| query.level.matches(&record.level))
            .filter(|record| match &query.agent {
                Some(agent) => record.agent.as_deref() == Some(agent.as_str()),
                None => true,
            })
            .take(query.limit);

        Ok(LogListing {
            logs: LogEntry::numbered(selected),
            summary: batch.summary,
        })
    }

    /// Sessions ordered most recently active first; never-active sessions
    /// keep their source order at the end.
    pub async fn sessions(&self, query: &SessionQuery) -> DashboardResult<SessionListing> {
        let raw = self.source.query(SourceQuery::Sessions).await?;

        let mut sessions: Vec<SessionRecord> = normalize_sessions(&raw)?
            .into_iter()
            .filter(|session| match &query.agent {
                Some(agent) => &session.agent_id == agent,
                None => true,
            })
            .map(|session| self.session_record(session))
            .filter(|session| !query.active_only || session.status.is_working())
            .collect();
        sessions.sort_by_key(|session| recency_key(session.last_active_ms));

        let totals = SessionTotals {
            sessions: sessions.len(),
            active_sessions: sessions.iter().filter(|s| s.status.is_working()).count(),
            total_tokens: sessions.iter().map(|s| s.total_tokens).sum(),
        };

        Ok(SessionListing { sessions, totals })
    }

    fn agent_record(&self, agent_id: &str, summary: &AgentSummary) -> AgentRecord {
        let profile = self.directory.lookup(agent_id);
        AgentRecord {
            id: agent_id.to_string(),
            name: profile.name,
            emoji: profile.emoji,
            status: classify_activity(summary.last_active_age_ms, false),
            model: summary.model.clone(),
            context_tokens: summary.context_tokens,
            input_tokens: summary.input_tokens,
            output_tokens: summary.output_tokens,
            total_tokens: summary.total_tokens,
            percent_used: percent_used(summary.total_tokens, summary.context_tokens),
            session_count: summary.session_count,
            last_active_ms: summary.last_active_age_ms,
            last_active_text: time_ago_text(summary.last_active_age_ms),
        }
    }

    fn session_record(&self, session: SessionSummary) -> SessionRecord {
        SessionRecord {
            agent_name: self.directory.lookup(&session.agent_id).name,
            status: classify_activity(session.last_active_age_ms, false),
            last_active_text: time_ago_text(session.last_active_age_ms),
            session_key: session.session_key,
            agent_id: session.agent_id,
            model: session.model,
            input_tokens: session.input_tokens,
            output_tokens: session.output_tokens,
            total_tokens: session.total_tokens,
            last_active_ms: session.last_active_age_ms,
            channel: session.channel,
        }
    }
}

fn settle<T>(result: Result<T, SourceError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{} unavailable, continuing without it: {}", e.query(), e);
            None
        }
    }
}

fn health_or_placeholder(
    raw: Result<String, SourceError>,
    reachability: Option<&GatewayReachability>,
) -> HealthSnapshot {
    settle(raw.and_then(|raw| normalize_health(&raw, reachability)))
        .unwrap_or_else(|| health_from_document(&Value::Null, reachability))
}

fn sort_agents(agents: &mut [AgentRecord]) {
    agents.sort_by(|a, b| {
        b.is_working()
            .cmp(&a.is_working())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

fn recency_key(last_active: Elapsed) -> (bool, u64) {
    (last_active.is_none(), last_active.unwrap_or(0))
}

fn totals_for(agents: &[AgentRecord]) -> Totals {
    Totals {
        agents: agents.len(),
        active_agents: agents.iter().filter(|a| a.is_working()).count(),
        total_tokens: agents.iter().map(|a| a.total_tokens).sum(),
        total_sessions: agents.iter().map(|a| a.session_count).sum(),
    }
}

/// Folds session rows into per-agent summaries, taking each agent's most
/// recently active session as its representative.
fn summaries_from_sessions(sessions: &[SessionSummary]) -> BTreeMap<AgentId, AgentSummary> {
    let mut grouped: BTreeMap<&str, (u64, &SessionSummary)> = BTreeMap::new();
    for session in sessions {
        grouped
            .entry(session.agent_id.as_str())
            .and_modify(|(count, latest)| {
                *count += 1;
                if recency_key(session.last_active_age_ms) < recency_key(latest.last_active_age_ms)
                {
                    *latest = session;
                }
            })
            .or_insert((1, session));
    }

    grouped
        .into_iter()
        .map(|(agent_id, (count, latest))| {
            (
                agent_id.to_string(),
                AgentSummary {
                    session_count: count,
                    model: latest.model.clone(),
                    context_tokens: latest.context_tokens.unwrap_or(DEFAULT_CONTEXT_TOKENS),
                    input_tokens: latest.input_tokens,
                    output_tokens: latest.output_tokens,
                    total_tokens: latest.total_tokens,
                    last_active_age_ms: latest.last_active_age_ms,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::types::{ActivityStatus, ChannelStatus, GatewayStatus, Indicator};

    fn dashboard(outputs: &[(SourceQuery, &str)]) -> Dashboard {
        let source = outputs
            .iter()
            .fold(MemorySource::new(), |source, (query, output)| {
                source.with_output(*query, *output)
            });
        Dashboard::new(Arc::new(source), AgentDirectory::builtin())
    }

    const STATUS: &str = r#"{
        "gateway": { "reachable": true, "self": { "version": "2026.2.1" } },
        "sessions": {
            "byAgent": [
                { "agentId": "main", "count": 3, "recent": [
                    { "model": "gpt-5.2", "contextTokens": 272000, "inputTokens": 50883,
                      "outputTokens": 378, "totalTokens": 54202, "age": 132700 }
                ] },
                { "agentId": "neil", "count": 1, "recent": [
                    { "totalTokens": 1000, "age": 7200000 }
                ] },
                { "agentId": "archie", "count": 0, "recent": [] }
            ]
        }
    }"#;

    const SESSIONS: &str = r#"{ "sessions": [
        { "sessionKey": "agent:neil:main", "agentId": "neil", "totalTokens": 1000, "lastActiveAgeMs": 7200000 },
        { "sessionKey": "agent:main:cron", "agentId": "main", "totalTokens": 10 },
        { "sessionKey": "agent:main:main", "agentId": "main", "totalTokens": 54202, "lastActiveAgeMs": 132700 }
    ] }"#;

    const HEALTH: &str = r#"{ "ok": true, "channels": {
        "telegram": { "configured": true, "running": false, "probe": { "ok": true } }
    } }"#;

    #[tokio::test]
    async fn test_overview_totals_and_percent() {
        let dashboard = dashboard(&[
            (SourceQuery::Status, STATUS),
            (SourceQuery::Health, HEALTH),
            (SourceQuery::Sessions, SESSIONS),
        ]);
        let overview = dashboard.overview().await.unwrap();

        let ids: Vec<&str> = overview.agents.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["main", "neil", "archie"]);
        let main = &overview.agents[0];
        assert_eq!(main.name, "Doobs");
        assert_eq!(main.percent_used, 20);
        assert_eq!(main.status, ActivityStatus::Working);

        assert_eq!(overview.totals.agents, 3);
        assert_eq!(overview.totals.active_agents, 1);
        assert_eq!(overview.totals.total_tokens, 55_202);
        assert_eq!(overview.totals.total_sessions, 4);

        assert_eq!(overview.health.gateway.status, GatewayStatus::Running);
        assert_eq!(overview.health.gateway.version, "2026.2.1");
        assert_eq!(overview.health.channels["telegram"], ChannelStatus::Connected);
        assert_eq!(overview.health.overall, OverallHealth::Healthy);
        assert!(overview.logs.is_empty());
    }

    #[tokio::test]
    async fn test_overview_survives_total_outage() {
        let overview = dashboard(&[]).overview().await.unwrap();

        assert!(overview.agents.is_empty());
        assert_eq!(overview.totals, Totals::default());
        assert_eq!(overview.health.gateway.status, GatewayStatus::Unknown);
        assert_eq!(overview.health.overall, OverallHealth::Critical);
    }

    #[tokio::test]
    async fn test_overview_falls_back_to_sessions() {
        let overview = dashboard(&[(SourceQuery::Sessions, SESSIONS)])
            .overview()
            .await
            .unwrap();

        let main = overview.agents.iter().find(|a| a.id == "main").unwrap();
        assert_eq!(main.session_count, 2);
        assert_eq!(main.total_tokens, 54_202);
        assert_eq!(main.last_active_ms, Some(132_700));
        assert_eq!(main.context_tokens, DEFAULT_CONTEXT_TOKENS);
        assert_eq!(overview.totals.total_sessions, 3);
    }

    #[tokio::test]
    async fn test_overview_keeps_five_errors() {
        let logs: String = (1..=7)
            .map(|n| format!("{{\"type\":\"log\",\"level\":\"error\",\"message\":\"e{}\"}}\n", n))
            .chain(std::iter::once(
                "{\"type\":\"log\",\"level\":\"warn\",\"message\":\"w\"}".to_string(),
            ))
            .collect();
        let overview = dashboard(&[(SourceQuery::Logs, logs.as_str())])
            .overview()
            .await
            .unwrap();

        assert_eq!(overview.logs.len(), OVERVIEW_ERROR_LIMIT);
        assert_eq!(overview.logs[0].id, "log-001");
        assert_eq!(overview.logs[0].record.message.as_deref(), Some("e1"));
        assert_eq!(overview.logs[4].record.message.as_deref(), Some("e5"));
    }

    #[tokio::test]
    async fn test_agents_sorted_working_first() {
        let listing = dashboard(&[(SourceQuery::Status, STATUS)])
            .agents()
            .await
            .unwrap();

        let names: Vec<&str> = listing.agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Doobs", "Archie", "Neil"]);
        assert_eq!(listing.totals.active_agents, 1);
    }

    #[tokio::test]
    async fn test_agents_requires_status() {
        let result = dashboard(&[]).agents().await;
        assert!(matches!(result, Err(DashboardError::Source(_))));
    }

    #[tokio::test]
    async fn test_agent_detail_collects_sessions() {
        let detail = dashboard(&[
            (SourceQuery::Status, STATUS),
            (SourceQuery::Sessions, SESSIONS),
        ])
        .agent("main")
        .await
        .unwrap();

        assert_eq!(detail.emoji, "🎯");
        assert_eq!(detail.tokens.total, 54_202);
        assert_eq!(detail.tokens.percent_used, 20);
        let keys: Vec<&str> = detail.sessions.iter().map(|s| s.session_key.as_str()).collect();
        assert_eq!(keys, vec!["agent:main:cron", "agent:main:main"]);
    }

    #[tokio::test]
    async fn test_agent_detail_unknown_id() {
        let result = dashboard(&[
            (SourceQuery::Status, STATUS),
            (SourceQuery::Sessions, SESSIONS),
        ])
        .agent("ghost")
        .await;
        assert!(matches!(result, Err(DashboardError::NotFound(id)) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_agent_detail_needs_sessions() {
        let result = dashboard(&[(SourceQuery::Status, STATUS)]).agent("main").await;
        assert!(matches!(result, Err(DashboardError::Source(_))));
    }

    #[tokio::test]
    async fn test_health_without_status() {
        let report = dashboard(&[(SourceQuery::Health, HEALTH)]).health().await.unwrap();

        assert_eq!(report.gateway.status, GatewayStatus::Running);
        assert_eq!(report.overall, OverallHealth::Healthy);
        assert_eq!(report.indicators.channels, Indicator::Yellow);
    }

    #[tokio::test]
    async fn test_sessions_sorted_and_filtered() {
        let dashboard = dashboard(&[(SourceQuery::Sessions, SESSIONS)]);

        let listing = dashboard.sessions(&SessionQuery::default()).await.unwrap();
        let keys: Vec<&str> = listing.sessions.iter().map(|s| s.session_key.as_str()).collect();
        assert_eq!(keys, vec!["agent:main:main", "agent:neil:main", "agent:main:cron"]);
        assert_eq!(listing.totals.sessions, 3);
        assert_eq!(listing.totals.active_sessions, 1);
        assert_eq!(listing.totals.total_tokens, 55_212);
        assert_eq!(listing.sessions[0].agent_name, "Doobs");

        let active = dashboard
            .sessions(&SessionQuery {
                agent: Some("main".to_string()),
                active_only: true,
            })
            .await
            .unwrap();
        assert_eq!(active.sessions.len(), 1);
        assert_eq!(active.sessions[0].session_key, "agent:main:main");
    }
}
