use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed payload: {0}")]
    Payload(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl DashError {
    /// Message shown to the user in an inline alert.
    pub fn user_message(&self) -> String {
        match self {
            DashError::Http(_) => "The dashboard API could not be reached.".to_string(),
            DashError::Rejected { message, .. } => message.clone(),
            DashError::Payload(_) | DashError::Decode(_) => {
                "The dashboard API returned an unexpected response.".to_string()
            }
            other => other.to_string(),
        }
    }
}
