pub mod api;
pub mod config;
pub mod envelope;
pub mod error;
pub mod grouping;
pub mod models;
pub mod orchestrator;
pub mod pagination;
pub mod record;
pub mod session;
pub mod view;

pub use api::{DashboardApi, HttpDashboardClient, DEFAULT_LOG_LIMIT};
pub use config::DashConfig;
pub use envelope::{unwrap_or, Envelope};
pub use error::DashError;
pub use grouping::{group_by_correlation, CorrelationGroup, GroupLayout};
pub use pagination::{compute_page_window, normalize_page, Page, PagePayload, PageWindow};
pub use record::{
    normalize_log_record, LogSchema, McpLogRecord, RawLogRecord, SqlAgentLogRecord,
    MCP_LOG_SCHEMA, SQL_AGENT_LOG_SCHEMA,
};
pub use session::ExecutionSession;
pub use view::ViewNode;
