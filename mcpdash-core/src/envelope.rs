//! Response envelope handling.
//!
//! Older backend builds return the payload as bare JSON; newer ones wrap it as
//! `{"status": 200, "message": "...", "item": <payload>}`. The shape is
//! resolved once here so nothing downstream has to branch on it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DashError;

/// A backend response body with its shape resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Wrapped {
        status: Option<u16>,
        message: Option<String>,
        item: Value,
    },
    Bare(Value),
}

impl Envelope {
    pub fn from_value(raw: Value) -> Self {
        match raw {
            Value::Object(mut obj) if obj.contains_key("item") => {
                let item = obj.remove("item").unwrap_or(Value::Null);
                let status = obj
                    .get("status")
                    .and_then(Value::as_u64)
                    .and_then(|s| u16::try_from(s).ok());
                let message = obj
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Envelope::Wrapped {
                    status,
                    message,
                    item,
                }
            }
            other => Envelope::Bare(other),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Envelope::Wrapped { status, .. } => *status,
            Envelope::Bare(_) => None,
        }
    }

    /// The payload, `Value::Null` when there is none.
    pub fn into_item(self) -> Value {
        match self {
            Envelope::Wrapped { item, .. } => item,
            Envelope::Bare(v) => v,
        }
    }

    /// Decode the payload, degrading to `default` when it is absent or does
    /// not fit `T`.
    pub fn unwrap_or<T: DeserializeOwned>(self, default: T) -> T {
        let item = self.into_item();
        if item.is_null() {
            return default;
        }
        match serde_json::from_value(item) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Envelope payload did not match expected shape, using default");
                default
            }
        }
    }

    /// Turn an enveloped failure status (>= 400) into a business rejection.
    pub fn into_result(self) -> Result<Self, DashError> {
        match &self {
            Envelope::Wrapped {
                status: Some(code),
                message,
                item,
            } if *code >= 400 => {
                let message = item_message(item)
                    .or_else(|| message.clone())
                    .unwrap_or_else(|| "unknown error".to_string());
                Err(DashError::Rejected {
                    status: *code,
                    message,
                })
            }
            _ => Ok(self),
        }
    }
}

/// `unwrap(raw, default)`: the payload of a bare or enveloped response.
pub fn unwrap_or<T: DeserializeOwned>(raw: Value, default: T) -> T {
    Envelope::from_value(raw).unwrap_or(default)
}

/// Untyped form of [`unwrap_or`].
pub fn unwrap_payload(raw: Value) -> Value {
    Envelope::from_value(raw).into_item()
}

/// Error message of a rejected request body: `item.message`, then
/// `message`, then `detail`.
pub fn rejection_message(body: &Value) -> Option<String> {
    body.get("item")
        .and_then(item_message)
        .or_else(|| string_field(body, "message"))
        .or_else(|| detail_message(body))
}

fn item_message(item: &Value) -> Option<String> {
    string_field(item, "message")
}

fn string_field(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// FastAPI validation errors put a list under `detail`.
fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|i| i.get("msg").and_then(Value::as_str))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}
