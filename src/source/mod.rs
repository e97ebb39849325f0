pub mod cli;
pub mod file;
pub mod memory;

pub use cli::{CliConfig, CliSource};
pub use file::FileSource;
pub use memory::MemorySource;

use async_trait::async_trait;
use std::fmt;

use crate::error::SourceError;

/// The four read-only queries the external status tool answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceQuery {
    Status,
    Health,
    Sessions,
    Logs,
}

impl SourceQuery {
    pub const ALL: [SourceQuery; 4] = [
        SourceQuery::Status,
        SourceQuery::Health,
        SourceQuery::Sessions,
        SourceQuery::Logs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceQuery::Status => "status",
            SourceQuery::Health => "health",
            SourceQuery::Sessions => "sessions",
            SourceQuery::Logs => "logs",
        }
    }

    pub fn args(&self) -> [&'static str; 2] {
        [self.as_str(), "--json"]
    }
}

impl fmt::Display for SourceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point-in-time reader of gateway, agent, channel and log state. Returns
/// the raw text the tool printed; decoding happens in `normalize`.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn query(&self, query: SourceQuery) -> Result<String, SourceError>;

    fn describe(&self) -> String;
}
