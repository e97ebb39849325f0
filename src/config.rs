use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::aggregate::Dashboard;
use crate::directory::AgentDirectory;
use crate::source::cli::{DEFAULT_PROGRAM, DEFAULT_TIMEOUT_MS};
use crate::source::{CliConfig, CliSource, FileSource, StatusSource};

pub const DEFAULT_PORT: u16 = 3200;
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub bin: String,
    pub profile: Option<String>,
    pub timeout_ms: u64,
    pub development: bool,
    pub agents_file: Option<PathBuf>,
    pub fixtures: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bin: DEFAULT_PROGRAM.to_string(),
            profile: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            development: false,
            agents_file: None,
            fixtures: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset, empty or unparsable
    /// values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            host: get("CLAWDASH_HOST").unwrap_or(defaults.host),
            port: get("CLAWDASH_PORT")
                .or_else(|| get("PORT"))
                .and_then(|p| p.trim().parse::<u16>().ok())
                .unwrap_or(defaults.port),
            bin: get("OPENCLAW_BIN").unwrap_or(defaults.bin),
            profile: get("OPENCLAW_PROFILE"),
            timeout_ms: get("CLAWDASH_CLI_TIMEOUT_MS")
                .and_then(|t| t.trim().parse::<u64>().ok())
                .filter(|t| *t > 0)
                .unwrap_or(defaults.timeout_ms),
            development: get("CLAWDASH_ENV").as_deref() == Some("development"),
            agents_file: get("CLAWDASH_AGENTS").map(PathBuf::from),
            fixtures: get("CLAWDASH_FIXTURES").map(PathBuf::from),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn source(&self) -> Arc<dyn StatusSource> {
        match &self.fixtures {
            Some(dir) => Arc::new(FileSource::new(dir.clone())),
            None => {
                let cli = CliConfig::new(self.bin.clone(), self.timeout_ms)
                    .with_profile(self.profile.as_deref());
                Arc::new(CliSource::new(cli))
            }
        }
    }

    pub fn directory(&self) -> Result<AgentDirectory> {
        match &self.agents_file {
            Some(path) => AgentDirectory::load(path),
            None => Ok(AgentDirectory::builtin()),
        }
    }

    pub fn dashboard(&self) -> Result<Dashboard> {
        Ok(Dashboard::new(self.source(), self.directory()?))
    }
}
