use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::types::AgentProfile;

pub const GENERIC_EMOJI: &str = "🤖";

/// Display names and emoji for known agent ids. Built once at startup and
/// shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDirectory {
    #[serde(default)]
    agents: BTreeMap<String, AgentProfile>,
}

impl AgentDirectory {
    pub fn builtin() -> Self {
        let entries = [
            ("main", "Doobs", "🎯"),
            ("neil", "Neil", "💻"),
            ("archie", "Archie", "🏗️"),
            ("alana", "Alana", "📅"),
            ("trevor", "Trevor", "🔐"),
            ("kai", "Kai", "🧠"),
        ];

        Self {
            agents: entries
                .into_iter()
                .map(|(id, name, emoji)| {
                    (
                        id.to_string(),
                        AgentProfile {
                            name: name.to_string(),
                            emoji: emoji.to_string(),
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid agent directory")
    }

    /// Loads a TOML directory file layered over the built-in entries.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read agent directory {}", path.display()))?;
        let overrides = Self::from_toml_str(&content)?;
        Ok(Self::builtin().merged(overrides))
    }

    pub fn merged(mut self, other: AgentDirectory) -> Self {
        self.agents.extend(other.agents);
        self
    }

    pub fn lookup(&self, agent_id: &str) -> AgentProfile {
        self.agents.get(agent_id).cloned().unwrap_or_else(|| AgentProfile {
            name: agent_id.to_string(),
            emoji: GENERIC_EMOJI.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for AgentDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}
