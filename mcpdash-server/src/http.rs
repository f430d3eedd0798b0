//! Dashboard web front end.
//!
//! Each endpoint has a thin axum handler that delegates to an inner function
//! taking plain arguments, so the page logic is testable without the router.
//!
//! Endpoints:
//! - GET  /                       dashboard (SQL agent logs, MCP logs, servers)
//! - GET  /mcp/:server_key        server page; `instruction`/`request_id` select an execution
//! - POST /mcp/:server_key/update update the server configuration
//! - POST /mcp/:server_key/execute run the server with an instruction
//! - GET  /health                 liveness of this process

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use mcpdash_core::models::{ExecuteServerRequest, UpdateServerRequest};
use mcpdash_core::orchestrator::{
    execute_action, load_dashboard, load_server_page, update_server_action, DashboardQuery,
    ServerPageQuery,
};
use mcpdash_core::{DashConfig, DashboardApi, ExecutionSession};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::html::{self, ServerPageExtras};

/// Largest `per_page` a client may ask for.
const MAX_PER_PAGE: u32 = 100;

/// Shared state for all HTTP handlers
#[derive(Clone)]
pub struct HttpState {
    pub api: Arc<dyn DashboardApi>,
    pub config: DashConfig,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/health", get(health_handler))
        .route("/mcp/:server_key", get(server_page_handler))
        .route("/mcp/:server_key/update", post(update_handler))
        .route("/mcp/:server_key/execute", post(execute_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    api: Arc<dyn DashboardApi>,
    config: DashConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let state = Arc::new(HttpState { api, config });

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub sql_page: Option<u32>,
    pub mcp_page: Option<u32>,
    pub per_page: Option<u32>,
    /// `group` (default) or `list`.
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerPageParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub instruction: Option<String>,
    pub request_id: Option<String>,
}

/// Fields of the update and execute forms.
#[derive(Debug, Default, Deserialize)]
pub struct ServerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub instruction: String,
}

fn page_number(page: Option<u32>) -> u32 {
    page.unwrap_or(1).max(1)
}

fn per_page(requested: Option<u32>, config: &DashConfig) -> u32 {
    requested
        .unwrap_or(config.view.per_page)
        .clamp(1, MAX_PER_PAGE)
}

impl DashboardParams {
    pub fn to_query(&self, config: &DashConfig) -> DashboardQuery {
        DashboardQuery {
            sql_page: page_number(self.sql_page),
            mcp_page: page_number(self.mcp_page),
            per_page: per_page(self.per_page, config),
            group_mode: self.mode.as_deref() != Some("list"),
        }
    }
}

impl ServerPageParams {
    pub fn to_query(&self, config: &DashConfig) -> ServerPageQuery {
        ServerPageQuery {
            page: page_number(self.page),
            per_page: per_page(self.per_page, config),
        }
    }

    /// The execution named in the URL, if any.
    pub fn session(&self, server_key: &str) -> Option<ExecutionSession> {
        let instruction = self.instruction.as_deref().filter(|i| !i.trim().is_empty())?;
        Some(ExecutionSession {
            correlation_id: self.request_id.clone().filter(|id| !id.is_empty()),
            ..ExecutionSession::new(server_key, instruction)
        })
    }
}

// ============================================================================
// Inner (directly testable) page functions
// ============================================================================

pub fn health_inner() -> serde_json::Value {
    serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    })
}

pub async fn dashboard_inner(state: &HttpState, params: &DashboardParams) -> String {
    let query = params.to_query(&state.config);
    tracing::debug!(?query, "rendering dashboard");
    let view = load_dashboard(state.api.as_ref(), &query, &state.config.view).await;
    html::dashboard_page(&view, &query)
}

pub async fn server_page_inner(
    state: &HttpState,
    server_key: &str,
    params: &ServerPageParams,
    extras: ServerPageExtras,
) -> String {
    let query = params.to_query(&state.config);
    let extras = ServerPageExtras {
        session: extras.session.or_else(|| params.session(server_key)),
        ..extras
    };
    tracing::debug!(server_key = %server_key, ?query, "rendering server page");
    let view = load_server_page(
        state.api.as_ref(),
        server_key,
        &query,
        extras.session.as_ref(),
        &state.config.view,
    )
    .await;
    html::server_page(&view, &query, &extras)
}

/// Applies the update form, then renders the refreshed server page.
pub async fn update_inner(state: &HttpState, server_key: &str, form: ServerForm) -> String {
    let req = UpdateServerRequest {
        server_key: server_key.to_string(),
        display_name: form.name,
        description: form.description,
        prompt_template: form.prompt,
    };
    let banner = update_server_action(state.api.as_ref(), &req).await;
    let extras = ServerPageExtras {
        banner: Some(banner),
        ..Default::default()
    };
    server_page_inner(state, server_key, &ServerPageParams::default(), extras).await
}

/// Runs the server, then renders its page focused on that execution.
pub async fn execute_inner(state: &HttpState, server_key: &str, form: ServerForm) -> String {
    let req = ExecuteServerRequest {
        server_key: server_key.to_string(),
        display_name: form.name,
        description: form.description,
        instruction: form.instruction,
        prompt_template: form.prompt,
    };
    let output = execute_action(state.api.as_ref(), &req).await;
    let extras = ServerPageExtras {
        banner: Some(output.banner),
        answer: output.answer,
        session: output.session,
    };
    server_page_inner(state, server_key, &ServerPageParams::default(), extras).await
}

// ============================================================================
// Axum handler wrappers (thin, delegate to inner functions)
// ============================================================================

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(health_inner()))
}

pub async fn dashboard_handler(
    State(state): State<Arc<HttpState>>,
    Query(params): Query<DashboardParams>,
) -> impl IntoResponse {
    Html(dashboard_inner(&state, &params).await)
}

pub async fn server_page_handler(
    State(state): State<Arc<HttpState>>,
    Path(server_key): Path<String>,
    Query(params): Query<ServerPageParams>,
) -> impl IntoResponse {
    Html(server_page_inner(&state, &server_key, &params, ServerPageExtras::default()).await)
}

pub async fn update_handler(
    State(state): State<Arc<HttpState>>,
    Path(server_key): Path<String>,
    Form(form): Form<ServerForm>,
) -> impl IntoResponse {
    Html(update_inner(&state, &server_key, form).await)
}

pub async fn execute_handler(
    State(state): State<Arc<HttpState>>,
    Path(server_key): Path<String>,
    Form(form): Form<ServerForm>,
) -> impl IntoResponse {
    Html(execute_inner(&state, &server_key, form).await)
}

// ============================================================================
// Unit Tests
// ============================================================================
