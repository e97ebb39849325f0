use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{SourceQuery, StatusSource};
use crate::error::SourceError;

pub const DEFAULT_PROGRAM: &str = "openclaw";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub program: String,
    /// Arguments placed before the query name on every invocation.
    pub leading_args: Vec<String>,
    pub timeout_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            leading_args: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl CliConfig {
    pub fn new(program: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout_ms,
        }
    }

    /// Selects an OpenClaw profile: `dev` maps to `--dev`, any other
    /// non-default name to `--profile <name>`.
    pub fn with_profile(mut self, profile: Option<&str>) -> Self {
        match profile.map(str::trim) {
            Some("dev") => self.leading_args = vec!["--dev".to_string()],
            Some(name) if !name.is_empty() && name != "default" => {
                self.leading_args = vec!["--profile".to_string(), name.to_string()];
            }
            _ => self.leading_args.clear(),
        }
        self
    }

    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }
}

/// Runs the status tool as a child process, one process per query.
#[derive(Debug, Clone)]
pub struct CliSource {
    config: CliConfig,
}

impl CliSource {
    pub fn new(config: CliConfig) -> Self {
        Self { config }
    }

    pub fn args_for(&self, query: SourceQuery) -> Vec<String> {
        let mut args = self.config.leading_args.clone();
        args.extend(query.args().iter().map(|arg| arg.to_string()));
        args
    }
}

#[async_trait]
impl StatusSource for CliSource {
    async fn query(&self, query: SourceQuery) -> Result<String, SourceError> {
        let mut command = Command::new(&self.config.program);
        command
            .args(self.args_for(query))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(
            Duration::from_millis(self.config.timeout_ms),
            command.output(),
        )
        .await
        .map_err(|_| SourceError::Timeout {
            query,
            timeout_ms: self.config.timeout_ms,
        })?
        .map_err(|source| SourceError::Io { query, source })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = first_line(&stderr).unwrap_or_else(|| output.status.to_string());
            log::error!("{} {} failed: {}", self.config.program, query, message);
            return Err(SourceError::failure(query, message));
        }

        if stdout.is_empty() {
            if let Some(message) = first_line(&stderr) {
                log::error!("{} {} wrote only stderr: {}", self.config.program, query, message);
                return Err(SourceError::failure(query, message));
            }
        }

        Ok(stdout)
    }

    fn describe(&self) -> String {
        let mut command = vec![self.config.program.as_str()];
        command.extend(self.config.leading_args.iter().map(String::as_str));
        format!("{} (timeout {}ms)", command.join(" "), self.config.timeout_ms)
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
