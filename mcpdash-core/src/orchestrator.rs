//! Page loading.
//!
//! Each section runs fetch, unwrap, normalize, group and view on its own and
//! degrades to an inline alert when any step fails, so one broken endpoint
//! never blanks the rest of the page.

use futures::future::{join, join3};
use tracing::{debug, error, info, warn};

use crate::api::DashboardApi;
use crate::config::ViewConfig;
use crate::error::DashError;
use crate::grouping::group_by_correlation;
use crate::models::{DateRangeRequest, ExecuteServerRequest, ServerDetail, UpdateServerRequest};
use crate::pagination::{normalize_page, Page};
use crate::record::{normalize_all, McpLogRecord, SqlAgentLogRecord};
use crate::session::ExecutionSession;
use crate::view::{self, alert, AlertLevel, McpColumns, PageTarget, ViewNode};

const NO_RESULT: &str = "No execution result.";
const NO_STEPS: &str = "No execution logs.";

fn degrade(section: &'static str, context: &str, err: DashError) -> Vec<ViewNode> {
    error!(section, error = %err, "{}", context);
    vec![alert(
        AlertLevel::Danger,
        format!("{context}: {}", err.user_message()),
    )]
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardQuery {
    pub sql_page: u32,
    pub mcp_page: u32,
    pub per_page: u32,
    /// One correlation group per page instead of a flat paginated list.
    pub group_mode: bool,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            sql_page: 1,
            mcp_page: 1,
            per_page: 10,
            group_mode: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub sql_agent_logs: Vec<ViewNode>,
    pub mcp_logs: Vec<ViewNode>,
    pub servers: Vec<ViewNode>,
}

/// Loads the three dashboard sections concurrently.
pub async fn load_dashboard(
    api: &dyn DashboardApi,
    query: &DashboardQuery,
    view: &ViewConfig,
) -> DashboardView {
    let (sql_agent_logs, mcp_logs, servers) = join3(
        sql_agent_logs_section(api, query.sql_page, view.page_radius),
        mcp_logs_section(api, query, view.page_radius),
        servers_section(api, view.preview_chars),
    )
    .await;

    DashboardView {
        sql_agent_logs,
        mcp_logs,
        servers,
    }
}

pub async fn sql_agent_logs_section(api: &dyn DashboardApi, page: u32, radius: u32) -> Vec<ViewNode> {
    let load = async {
        let page: Page<SqlAgentLogRecord> = normalize_page(api.sql_agent_request_groups(page).await?)?;
        debug!(
            current = page.current_page,
            total = page.total_pages,
            "loaded SQL agent request group"
        );
        Ok::<_, DashError>(view::sql_agent_log_table(&page, PageTarget::SqlAgentLogs, radius))
    };
    load.await
        .unwrap_or_else(|err| degrade("sql_agent_logs", "Failed to load SQL agent logs", err))
}

pub async fn mcp_logs_section(api: &dyn DashboardApi, query: &DashboardQuery, radius: u32) -> Vec<ViewNode> {
    let load = async {
        let (payload, columns) = if query.group_mode {
            (
                api.mcp_request_groups(None, query.mcp_page).await?,
                McpColumns {
                    request_id: false,
                    server: true,
                },
            )
        } else {
            (
                api.mcp_logs_paginated(None, query.mcp_page, query.per_page).await?,
                McpColumns {
                    request_id: true,
                    server: true,
                },
            )
        };
        let page: Page<McpLogRecord> = normalize_page(payload)?;
        Ok::<_, DashError>(view::mcp_log_table(
            &page,
            columns,
            PageTarget::McpLogs,
            radius,
            "No MCP server logs.",
        ))
    };
    load.await
        .unwrap_or_else(|err| degrade("mcp_logs", "Failed to load MCP server logs", err))
}

pub async fn servers_section(api: &dyn DashboardApi, preview_chars: usize) -> Vec<ViewNode> {
    match api.list_servers().await {
        Ok(servers) => vec![view::server_cards(&servers, preview_chars)],
        Err(err) => degrade("servers", "Failed to load MCP servers", err),
    }
}

/// SQL agent steps recorded on the given calendar dates, as one table.
pub async fn sql_agent_range_section(api: &dyn DashboardApi, range: &DateRangeRequest) -> Vec<ViewNode> {
    let load = async {
        let items: Vec<SqlAgentLogRecord> = normalize_all(api.sql_agent_logs_by_date_range(range).await?)?;
        let page = Page {
            total_count: items.len() as u64,
            per_page: items.len() as u32,
            items,
            current_page: 1,
            total_pages: 1,
            has_prev: false,
            has_next: false,
            correlation_id: None,
        };
        Ok::<_, DashError>(view::sql_agent_log_table(&page, PageTarget::SqlAgentLogs, 0))
    };
    load.await
        .unwrap_or_else(|err| degrade("sql_agent_logs", "Failed to load SQL agent logs", err))
}

// ============================================================================
// Server page
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerPageQuery {
    pub page: u32,
    pub per_page: u32,
}

impl Default for ServerPageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

/// MCP answers and SQL agent steps of one execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResults {
    pub mcp: Vec<ViewNode>,
    pub sql_agent: Vec<ViewNode>,
}

impl ExecutionResults {
    pub fn none() -> Self {
        Self {
            mcp: vec![alert(AlertLevel::Info, NO_RESULT)],
            sql_agent: vec![alert(AlertLevel::Info, NO_STEPS)],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerPageView {
    pub server_key: String,
    /// Present when the backend knows the server; used to prefill forms.
    pub detail: Option<ServerDetail>,
    pub info: Vec<ViewNode>,
    pub logs: Vec<ViewNode>,
    pub results: ExecutionResults,
}

/// Loads a server page. With a session carrying an instruction, the result
/// panels show that execution; otherwise the server's most recent one.
pub async fn load_server_page(
    api: &dyn DashboardApi,
    server_key: &str,
    query: &ServerPageQuery,
    session: Option<&ExecutionSession>,
    view: &ViewConfig,
) -> ServerPageView {
    let results = async {
        match session.filter(|s| s.has_instruction()) {
            Some(session) => execution_results(api, session).await,
            None => initial_results(api, server_key).await,
        }
    };
    let ((detail, info), logs, results) = join3(
        server_info_section(api, server_key),
        server_logs_section(api, server_key, query, view.page_radius),
        results,
    )
    .await;

    ServerPageView {
        server_key: server_key.to_string(),
        detail,
        info,
        logs,
        results,
    }
}

pub async fn server_info_section(
    api: &dyn DashboardApi,
    server_key: &str,
) -> (Option<ServerDetail>, Vec<ViewNode>) {
    match api.server_detail(server_key).await {
        Ok(detail) if detail.is_known() => {
            let node = view::server_info(&detail);
            (Some(detail), vec![node])
        }
        Ok(_) => {
            warn!(server = server_key, "server detail came back empty");
            (
                None,
                vec![alert(
                    AlertLevel::Warning,
                    format!("Unknown MCP server: {server_key}"),
                )],
            )
        }
        Err(err) => (
            None,
            degrade("server_info", "Failed to load server information", err),
        ),
    }
}

pub async fn server_logs_section(
    api: &dyn DashboardApi,
    server_key: &str,
    query: &ServerPageQuery,
    radius: u32,
) -> Vec<ViewNode> {
    let load = async {
        let page: Page<McpLogRecord> = normalize_page(
            api.mcp_logs_paginated(Some(server_key), query.page, query.per_page)
                .await?,
        )?;
        Ok::<_, DashError>(view::mcp_log_table(
            &page,
            McpColumns {
                request_id: true,
                server: false,
            },
            PageTarget::ServerLogs,
            radius,
            "No logs for this server.",
        ))
    };
    load.await
        .unwrap_or_else(|err| degrade("server_logs", "Failed to load server logs", err))
}

/// The server's most recent execution, if it has one.
pub async fn initial_results(api: &dyn DashboardApi, server_key: &str) -> ExecutionResults {
    let newest = async {
        let page: Page<McpLogRecord> =
            normalize_page(api.mcp_logs_paginated(Some(server_key), 1, 1).await?)?;
        Ok::<_, DashError>(page.items.into_iter().next())
    };

    match newest.await {
        Ok(Some(first)) => {
            let (mcp, sql_agent) = join(mcp_group_from(api, first), sql_agent_group_section(api, None)).await;
            ExecutionResults { mcp, sql_agent }
        }
        Ok(None) => ExecutionResults::none(),
        Err(err) => ExecutionResults {
            mcp: degrade("results", "Failed to load the latest execution", err),
            sql_agent: vec![alert(AlertLevel::Info, NO_STEPS)],
        },
    }
}

/// Results of the execution a session points at. A known correlation id is
/// used directly; otherwise the newest log for the instruction supplies one.
pub async fn execution_results(api: &dyn DashboardApi, session: &ExecutionSession) -> ExecutionResults {
    let (mcp, correlation_id) = match session.correlation_id.clone() {
        Some(id) => (mcp_group_by_id(api, &id).await, Some(id)),
        None => {
            let newest = async {
                let logs: Vec<McpLogRecord> = normalize_all(
                    api.mcp_logs_latest(&session.instruction, Some(&session.server_key))
                        .await?,
                )?;
                Ok::<_, DashError>(logs.into_iter().next())
            };
            match newest.await {
                Ok(Some(first)) => {
                    let id = first.correlation_id.clone();
                    (mcp_group_from(api, first).await, id)
                }
                Ok(None) => return ExecutionResults::none(),
                Err(err) => (
                    degrade("results", "Failed to load the execution result", err),
                    None,
                ),
            }
        }
    };

    let sql_agent = match correlation_id.as_deref() {
        Some(id) => sql_agent_group_section(api, Some(id)).await,
        None => vec![alert(
            AlertLevel::Warning,
            "No request ID; SQL agent logs cannot be loaded.",
        )],
    };

    ExecutionResults { mcp, sql_agent }
}

/// The group `first` belongs to. A log without a correlation id stands alone.
async fn mcp_group_from(api: &dyn DashboardApi, first: McpLogRecord) -> Vec<ViewNode> {
    match first.correlation_id.clone() {
        Some(id) => mcp_group_by_id(api, &id).await,
        None => view::mcp_group(&group_by_correlation(vec![first])),
    }
}

async fn mcp_group_by_id(api: &dyn DashboardApi, correlation_id: &str) -> Vec<ViewNode> {
    let load = async {
        let records: Vec<McpLogRecord> = normalize_all(api.mcp_logs_by_request(correlation_id).await?)?;
        let group = group_by_correlation(records).with_correlation_hint(Some(correlation_id));
        Ok::<_, DashError>(view::mcp_group(&group))
    };
    load.await
        .unwrap_or_else(|err| degrade("results", "Failed to load the execution result", err))
}

/// The newest SQL agent trace. When `hint` names a different execution the
/// trace keeps its own id and a warning is shown above it.
async fn sql_agent_group_section(api: &dyn DashboardApi, hint: Option<&str>) -> Vec<ViewNode> {
    let load = async {
        let records: Vec<SqlAgentLogRecord> = normalize_all(api.sql_agent_latest_group().await?)?;
        let group = group_by_correlation(records);
        let mut nodes = Vec::new();
        let group = match (hint, group.correlation_id.as_deref()) {
            (Some(expected), Some(own)) if expected != own => {
                warn!(expected, found = own, "latest SQL agent trace is from another request");
                nodes.push(alert(
                    AlertLevel::Warning,
                    "The latest SQL agent trace belongs to a different request.",
                ));
                group
            }
            _ => group.with_correlation_hint(hint),
        };
        nodes.extend(view::sql_agent_group(&group));
        Ok::<_, DashError>(nodes)
    };
    load.await
        .unwrap_or_else(|err| degrade("sql_agent_results", "Failed to load SQL agent logs", err))
}

// ============================================================================
// Actions
// ============================================================================

pub async fn update_server_action(api: &dyn DashboardApi, req: &UpdateServerRequest) -> ViewNode {
    match api.update_server(req).await {
        Ok(outcome) => {
            info!(server = %req.server_key, "server configuration updated");
            alert(
                AlertLevel::Success,
                outcome
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Server configuration updated.".to_string()),
            )
        }
        Err(err) => {
            error!(server = %req.server_key, error = %err, "server update failed");
            alert(
                AlertLevel::Danger,
                format!("Server update failed: {}", err.user_message()),
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteOutput {
    pub banner: ViewNode,
    pub answer: Option<String>,
    /// Set when the backend accepted the execution.
    pub session: Option<ExecutionSession>,
}

pub async fn execute_action(api: &dyn DashboardApi, req: &ExecuteServerRequest) -> ExecuteOutput {
    if req.instruction.trim().is_empty() {
        return ExecuteOutput {
            banner: alert(AlertLevel::Warning, "Enter an instruction to execute."),
            answer: None,
            session: None,
        };
    }

    match api.execute_server(req).await {
        Ok(outcome) => {
            let session = ExecutionSession::from_outcome(&req.server_key, &req.instruction, &outcome);
            info!(
                server = %req.server_key,
                request_id = session.correlation_id.as_deref().unwrap_or("none"),
                "server executed"
            );
            ExecuteOutput {
                banner: alert(AlertLevel::Success, "Execution finished."),
                answer: outcome.answer,
                session: Some(session),
            }
        }
        Err(err) => {
            error!(server = %req.server_key, error = %err, "server execution failed");
            ExecuteOutput {
                banner: alert(
                    AlertLevel::Danger,
                    format!("Server execution failed: {}", err.user_message()),
                ),
                answer: None,
                session: None,
            }
        }
    }
}
