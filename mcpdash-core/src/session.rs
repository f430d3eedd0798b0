use serde::{Deserialize, Serialize};

use crate::models::ExecuteOutcome;

/// State of one execution triggered from a server page.
///
/// Returned by the execute action and passed explicitly into the result
/// views, so which instruction and correlation id a view shows is always the
/// caller's choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSession {
    pub server_key: String,
    pub instruction: String,
    #[serde(rename = "request_id", default)]
    pub correlation_id: Option<String>,
}

impl ExecutionSession {
    pub fn new(server_key: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            server_key: server_key.into(),
            instruction: instruction.into(),
            correlation_id: None,
        }
    }

    pub fn from_outcome(
        server_key: impl Into<String>,
        instruction: impl Into<String>,
        outcome: &ExecuteOutcome,
    ) -> Self {
        Self {
            correlation_id: outcome
                .correlation_id
                .clone()
                .filter(|id| !id.is_empty()),
            ..Self::new(server_key, instruction)
        }
    }

    pub fn has_instruction(&self) -> bool {
        !self.instruction.trim().is_empty()
    }
}
