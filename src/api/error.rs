use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::api::timestamp;
use crate::error::DashboardError;

/// Error envelope for every failed request:
/// `{error: {code, message, details?}, timestamp, ...defaults}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<String>,
    defaults: Map<String, Value>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            defaults: Map::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn cli(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "CLI_ERROR", message).with_details(details)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    /// Maps a dashboard failure onto the envelope. `context` becomes the
    /// message for upstream and internal failures.
    pub fn from_dashboard(error: DashboardError, context: &str, expose_details: bool) -> Self {
        match error {
            DashboardError::NotFound(_) => Self::not_found(error.to_string()),
            DashboardError::Source(source) => {
                log::error!("{}: {}", context, source);
                Self::cli(context, source.to_string())
            }
            DashboardError::Internal(e) => {
                log::error!("{}: {:#}", context, e);
                let error = Self::internal(context);
                if expose_details {
                    error.with_details(format!("{:#}", e))
                } else {
                    error
                }
            }
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Top-level fields merged into the body next to `error`, so clients
    /// can render an empty state without special-casing failures.
    pub fn with_defaults(mut self, defaults: Value) -> Self {
        if let Value::Object(fields) = defaults {
            self.defaults.extend(fields);
        }
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "code": self.code,
            "message": self.message,
        });
        if let Some(details) = self.details {
            error["details"] = Value::String(details);
        }

        let mut body = self.defaults;
        body.insert("error".to_string(), error);
        body.insert("timestamp".to_string(), Value::String(timestamp()));

        (self.status, Json(Value::Object(body))).into_response()
    }
}
