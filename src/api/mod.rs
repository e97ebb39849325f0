pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{create_router, serve, AppState};

use chrono::{SecondsFormat, Utc};

/// Current time as stamped on every response, e.g.
/// `2026-02-21T13:40:01.123Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
