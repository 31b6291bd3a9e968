//! Error taxonomy for calls against the remote service.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Errors surfaced by the API transport and the task directory.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure with no server response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Credentials rejected or missing (401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The server rejected one or more submitted fields (400).
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The referenced resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other server-reported failure.
    #[error("server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Field-level messages from a rejected create/update, plus an optional
/// non-field message for banner display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub message: Option<String>,
}

impl ValidationErrors {
    /// Parse a 400 response body. The service reports either a map of
    /// field name to message list, or a `detail`/`message` string.
    pub(crate) fn from_body(body: &str) -> Self {
        let mut parsed = Self::default();
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str(body) else {
            let trimmed = body.trim();
            if !trimmed.is_empty() {
                parsed.message = Some(trimmed.to_string());
            }
            return parsed;
        };
        for (field, value) in map {
            if field == "detail" || field == "message" {
                if let serde_json::Value::String(text) = value {
                    parsed.message = Some(text);
                }
            } else if field == "non_field_errors" {
                if let serde_json::Value::Array(items) = value {
                    parsed.message = Some(join_messages(&items));
                }
            } else {
                match value {
                    serde_json::Value::Array(items) => {
                        parsed.fields.insert(
                            field,
                            items
                                .iter()
                                .filter_map(|item| item.as_str().map(str::to_string))
                                .collect(),
                        );
                    }
                    serde_json::Value::String(text) => {
                        parsed.fields.insert(field, vec![text]);
                    }
                    _ => {}
                }
            }
        }
        parsed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.message.is_none()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(message) = &self.message {
            write!(f, "{message}")?;
            first = false;
        }
        for (field, messages) in &self.fields {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {}", messages.join(", "))?;
            first = false;
        }
        if first {
            write!(f, "invalid request")?;
        }
        Ok(())
    }
}

fn join_messages(items: &[serde_json::Value]) -> String {
    items
        .iter()
        .filter_map(serde_json::Value::as_str)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Best-effort extraction of the server's human-readable message.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .or_else(|| value.get("message"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}
