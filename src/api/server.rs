use anyhow::Result;
use axum::{
    extract::Request,
    http::{header, Method},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::any::Any as PanicPayload;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregate::Dashboard;
use crate::api::error::ApiError;
use crate::api::handlers;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
            expose_error_details: false,
        }
    }

    pub fn with_error_details(mut self, expose: bool) -> Self {
        self.expose_error_details = expose;
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(handlers::discovery))
        .route("/health", get(handlers::liveness))
        .route("/api/overview", get(handlers::overview))
        .route("/api/agents", get(handlers::list_agents))
        .route("/api/agents/:id", get(handlers::get_agent))
        .route("/api/health", get(handlers::health))
        .route("/api/logs", get(handlers::logs))
        .route("/api/sessions", get(handlers::sessions));

    with_layers(routes, state.expose_error_details).with_state(state)
}

fn with_layers(routes: Router<AppState>, expose_error_details: bool) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    routes
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(reject_non_get))
        .layer(middleware::from_fn(log_request))
        .layer(CatchPanicLayer::custom(panic_response(expose_error_details)))
        .layer(cors)
}

/// Renders a panicking handler as the `INTERNAL_ERROR` envelope. The panic
/// message is only sent to clients in development mode.
fn panic_response(
    expose_details: bool,
) -> impl Fn(Box<dyn PanicPayload + Send + 'static>) -> Response + Clone {
    move |panic| {
        let detail = if let Some(message) = panic.downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = panic.downcast_ref::<&str>() {
            message.to_string()
        } else {
            "unknown panic".to_string()
        };
        log::error!("Request handler panicked: {}", detail);

        let error = ApiError::internal("Internal server error");
        let error = if expose_details {
            error.with_details(detail)
        } else {
            error
        };
        error.into_response()
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    log::info!("{} {}", request.method(), request.uri());
    next.run(request).await
}

/// The surface is read-only: every other method gets the not-found
/// envelope, whatever the path.
async fn reject_non_get(request: Request, next: Next) -> Response {
    if request.method() != Method::GET {
        return ApiError::not_found(format!(
            "Endpoint not found: {} {}",
            request.method(),
            request.uri()
        ))
        .into_response();
    }
    next.run(request).await
}

pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let source = state.dashboard.describe_source();
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    log::info!("Dashboard API listening on http://{}", listener.local_addr()?);
    log::info!("Reading status from {}", source);

    axum::serve(listener, app).await?;
    Ok(())
}
