use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/mcp-servers/update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateServerRequest {
    #[serde(rename = "server_name")]
    pub server_key: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub description: String,
    #[serde(rename = "prompt")]
    pub prompt_template: String,
}

/// Body of `POST /api/mcp-servers/execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteServerRequest {
    #[serde(rename = "server_name")]
    pub server_key: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub description: String,
    pub instruction: String,
    #[serde(rename = "prompt")]
    pub prompt_template: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteOutcome {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(rename = "request_id", default)]
    pub correlation_id: Option<String>,
}

/// Body of `POST /api/sql-agent/logs/date-range`, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRangeRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
