pub mod aggregate;
pub mod api;
pub mod config;
pub mod derivation;
pub mod directory;
pub mod error;
pub mod normalize;
pub mod source;
pub mod types;

pub use aggregate::Dashboard;
pub use config::Config;
pub use directory::AgentDirectory;
pub use error::{DashboardError, DashboardResult, SourceError};
pub use types::*;
