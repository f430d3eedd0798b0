//! Client for the dashboard backend HTTP API.
//!
//! `DashboardApi` is the seam the orchestrator talks to; `HttpDashboardClient`
//! is the reqwest implementation. Log endpoints hand back wire payloads
//! (`RawLogRecord`, `PagePayload`) so normalization stays with the caller.
//! No request is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::envelope::{rejection_message, Envelope};
use crate::error::DashError;
use crate::models::{
    DateRangeRequest, ExecuteOutcome, ExecuteServerRequest, ServerDetail, ServerInfo,
    UpdateOutcome, UpdateServerRequest,
};
use crate::pagination::PagePayload;
use crate::record::RawLogRecord;

/// Default row limit of the flat (non-paginated) log endpoints.
pub const DEFAULT_LOG_LIMIT: u32 = 100;

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/mcp-servers`
    async fn list_servers(&self) -> Result<Vec<ServerInfo>, DashError>;

    /// `GET /api/mcp-servers/{server_key}`
    async fn server_detail(&self, server_key: &str) -> Result<ServerDetail, DashError>;

    /// `GET /api/mcp-logs`
    async fn mcp_logs(
        &self,
        server_key: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RawLogRecord>, DashError>;

    /// `GET /api/mcp-logs/paginated`
    async fn mcp_logs_paginated(
        &self,
        server_key: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<PagePayload, DashError>;

    /// `GET /api/mcp-logs/request-groups`, one correlation group per page.
    async fn mcp_request_groups(
        &self,
        server_key: Option<&str>,
        page: u32,
    ) -> Result<PagePayload, DashError>;

    /// `GET /api/mcp-logs/by-request/{correlation_id}`
    async fn mcp_logs_by_request(
        &self,
        correlation_id: &str,
    ) -> Result<Vec<RawLogRecord>, DashError>;

    /// `GET /api/mcp-logs/latest`, most recent first.
    async fn mcp_logs_latest(
        &self,
        instruction: &str,
        server_key: Option<&str>,
    ) -> Result<Vec<RawLogRecord>, DashError>;

    /// `GET /api/sql-agent/logs`
    async fn sql_agent_logs(
        &self,
        instruction: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RawLogRecord>, DashError>;

    /// `GET /api/sql-agent/logs/paginated`
    async fn sql_agent_logs_paginated(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<PagePayload, DashError>;

    /// `GET /api/sql-agent/logs/request-groups`
    async fn sql_agent_request_groups(&self, page: u32) -> Result<PagePayload, DashError>;

    /// `GET /api/sql-agent/logs/latest`
    async fn sql_agent_latest(&self, instruction: &str) -> Result<Vec<RawLogRecord>, DashError>;

    /// `GET /api/sql-agent/logs/latest-by-request-id`, ordered by step.
    async fn sql_agent_latest_group(&self) -> Result<Vec<RawLogRecord>, DashError>;

    /// `POST /api/sql-agent/logs/date-range`
    async fn sql_agent_logs_by_date_range(
        &self,
        range: &DateRangeRequest,
    ) -> Result<Vec<RawLogRecord>, DashError>;

    /// `POST /api/mcp-servers/update`
    async fn update_server(&self, req: &UpdateServerRequest) -> Result<UpdateOutcome, DashError>;

    /// `POST /api/mcp-servers/execute`
    async fn execute_server(
        &self,
        req: &ExecuteServerRequest,
    ) -> Result<ExecuteOutcome, DashError>;
}

/// reqwest-backed [`DashboardApi`].
#[derive(Debug, Clone)]
pub struct HttpDashboardClient {
    client: Client,
    base_url: Url,
}

impl HttpDashboardClient {
    pub fn new(config: &ApiConfig) -> Result<Self, DashError> {
        Self::with_base_url(&config.base_url, Duration::from_secs(config.timeout_seconds))
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, DashError> {
        let base_url =
            Url::parse(base_url).map_err(|e| DashError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DashError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DashError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| DashError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        default: T,
    ) -> Result<T, DashError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(url = %url, "GET");
        let resp = self.client.get(url).query(query).send().await?;
        Ok(read_envelope(resp).await?.unwrap_or(default))
    }

    async fn post<B: Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
        default: T,
    ) -> Result<T, DashError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(url = %url, "POST");
        let resp = self.client.post(url).json(body).send().await?;
        Ok(read_envelope(resp).await?.unwrap_or(default))
    }
}

/// Read a response body into an [`Envelope`], mapping non-2xx HTTP statuses
/// and enveloped failure statuses to [`DashError::Rejected`].
async fn read_envelope(resp: Response) -> Result<Envelope, DashError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::Null);
        let message = rejection_message(&body).unwrap_or_else(|| {
            if text.trim().is_empty() {
                status.to_string()
            } else {
                text.clone()
            }
        });
        tracing::error!(status = status.as_u16(), message = %message, "Dashboard API rejected request");
        return Err(DashError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text)?
    };

    Envelope::from_value(body).into_result()
}

fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        query.push((key, v.to_string()));
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardClient {
    async fn list_servers(&self) -> Result<Vec<ServerInfo>, DashError> {
        self.get(&["api", "mcp-servers"], &[], Vec::new()).await
    }

    async fn server_detail(&self, server_key: &str) -> Result<ServerDetail, DashError> {
        self.get(&["api", "mcp-servers", server_key], &[], ServerDetail::default())
            .await
    }

    async fn mcp_logs(
        &self,
        server_key: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RawLogRecord>, DashError> {
        let mut query = vec![("limit", limit.to_string())];
        push_opt(&mut query, "server_name", server_key);
        self.get(&["api", "mcp-logs"], &query, Vec::new()).await
    }

    async fn mcp_logs_paginated(
        &self,
        server_key: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<PagePayload, DashError> {
        let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        push_opt(&mut query, "server_name", server_key);
        self.get(&["api", "mcp-logs", "paginated"], &query, PagePayload::default())
            .await
    }

    async fn mcp_request_groups(
        &self,
        server_key: Option<&str>,
        page: u32,
    ) -> Result<PagePayload, DashError> {
        let mut query = vec![("page", page.to_string())];
        push_opt(&mut query, "server_name", server_key);
        self.get(&["api", "mcp-logs", "request-groups"], &query, PagePayload::default())
            .await
    }

    async fn mcp_logs_by_request(
        &self,
        correlation_id: &str,
    ) -> Result<Vec<RawLogRecord>, DashError> {
        self.get(&["api", "mcp-logs", "by-request", correlation_id], &[], Vec::new())
            .await
    }

    async fn mcp_logs_latest(
        &self,
        instruction: &str,
        server_key: Option<&str>,
    ) -> Result<Vec<RawLogRecord>, DashError> {
        let mut query = vec![("instruction", instruction.to_string())];
        push_opt(&mut query, "server_name", server_key);
        self.get(&["api", "mcp-logs", "latest"], &query, Vec::new())
            .await
    }

    async fn sql_agent_logs(
        &self,
        instruction: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RawLogRecord>, DashError> {
        let mut query = vec![("limit", limit.to_string())];
        push_opt(&mut query, "instruction", instruction);
        self.get(&["api", "sql-agent", "logs"], &query, Vec::new()).await
    }

    async fn sql_agent_logs_paginated(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<PagePayload, DashError> {
        let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
        self.get(&["api", "sql-agent", "logs", "paginated"], &query, PagePayload::default())
            .await
    }

    async fn sql_agent_request_groups(&self, page: u32) -> Result<PagePayload, DashError> {
        let query = [("page", page.to_string())];
        self.get(
            &["api", "sql-agent", "logs", "request-groups"],
            &query,
            PagePayload::default(),
        )
        .await
    }

    async fn sql_agent_latest(&self, instruction: &str) -> Result<Vec<RawLogRecord>, DashError> {
        let query = [("instruction", instruction.to_string())];
        self.get(&["api", "sql-agent", "logs", "latest"], &query, Vec::new())
            .await
    }

    async fn sql_agent_latest_group(&self) -> Result<Vec<RawLogRecord>, DashError> {
        self.get(
            &["api", "sql-agent", "logs", "latest-by-request-id"],
            &[],
            Vec::new(),
        )
        .await
    }

    async fn sql_agent_logs_by_date_range(
        &self,
        range: &DateRangeRequest,
    ) -> Result<Vec<RawLogRecord>, DashError> {
        self.post(&["api", "sql-agent", "logs", "date-range"], range, Vec::new())
            .await
    }

    async fn update_server(&self, req: &UpdateServerRequest) -> Result<UpdateOutcome, DashError> {
        tracing::info!(server_key = %req.server_key, "Updating MCP server");
        self.post(&["api", "mcp-servers", "update"], req, UpdateOutcome::default())
            .await
    }

    async fn execute_server(
        &self,
        req: &ExecuteServerRequest,
    ) -> Result<ExecuteOutcome, DashError> {
        tracing::info!(server_key = %req.server_key, "Executing MCP server");
        self.post(&["api", "mcp-servers", "execute"], req, ExecuteOutcome::default())
            .await
    }
}
