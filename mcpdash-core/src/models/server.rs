use serde::{Deserialize, Serialize};

/// Entry of `GET /api/mcp-servers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "server_name")]
    pub server_key: String,
    #[serde(rename = "name", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "prompt", default)]
    pub prompt_template: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub process_status: Option<serde_json::Value>,
    #[serde(default)]
    pub is_running: bool,
}

/// Payload of `GET /api/mcp-servers/{server_key}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerDetail {
    #[serde(rename = "server_name", default)]
    pub server_key: String,
    #[serde(rename = "name", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "prompt", default)]
    pub prompt_template: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub transport: Option<String>,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub process_info: Option<serde_json::Value>,
}

impl ServerDetail {
    /// The backend answers an unknown key with an empty item.
    pub fn is_known(&self) -> bool {
        !self.server_key.is_empty()
    }

    /// `status` the backend reports for the server process, e.g. `"running"`.
    pub fn process_state(&self) -> Option<&str> {
        self.process_info
            .as_ref()
            .and_then(|p| p.get("status"))
            .and_then(|s| s.as_str())
    }
}
