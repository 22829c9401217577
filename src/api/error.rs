use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::notify::{Notice, NoticeKind};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session expired - please login again")]
    SessionExpired,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {message}")]
    ValidationFailed {
        message: String,
        /// Field name -> message, parsed from the response body.
        errors: BTreeMap<String, String>,
    },

    #[error("Server error: {0}")]
    ServerFault(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

/// Maximum length for error response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data.
    /// The cut point backs up to a character boundary so multibyte text
    /// never splits mid-character.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..end],
                body.len()
            )
        }
    }

    /// Pull the `message` field out of a JSON error body, if there is one.
    fn body_message(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body).ok()?;
        value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    /// Parse the `errors` object of a 422 body into field -> message.
    /// Accepts both `{"field": "msg"}` and `{"field": ["msg", ...]}` shapes.
    fn body_field_errors(body: &str) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            return out;
        };
        let Some(errors) = value.get("errors").and_then(Value::as_object) else {
            return out;
        };
        for (field, entry) in errors {
            let message = match entry {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                other => other.to_string(),
            };
            if !message.is_empty() {
                out.insert(field.clone(), message);
            }
        }
        out
    }

    /// Classify a non-2xx response into the error taxonomy.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::SessionExpired,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            422 => {
                let errors = Self::body_field_errors(body);
                let message = if errors.is_empty() {
                    Self::body_message(body)
                        .unwrap_or_else(|| "Validation error occurred.".to_string())
                } else {
                    errors.values().cloned().collect::<Vec<_>>().join(", ")
                };
                ApiError::ValidationFailed { message, errors }
            }
            500..=599 => ApiError::ServerFault(truncated),
            _ => {
                let message = Self::body_message(body)
                    .unwrap_or_else(|| format!("Status {}: {}", status, truncated));
                ApiError::Unexpected(message)
            }
        }
    }

    /// The user-visible notice for this failure. The transport layer emits
    /// this exactly once per failed call.
    pub fn notice(&self) -> Notice {
        match self {
            ApiError::SessionExpired => Notice::new(
                NoticeKind::SessionExpired,
                "Session expired. Please login again.",
            ),
            ApiError::AccessDenied(_) => Notice::new(
                NoticeKind::AccessDenied,
                "Access denied. You don't have permission for this action.",
            ),
            ApiError::NotFound(_) => Notice::new(NoticeKind::NotFound, "Resource not found."),
            ApiError::ValidationFailed { message, .. } => {
                Notice::new(NoticeKind::Validation, message.clone())
            }
            ApiError::ServerFault(_) => Notice::new(
                NoticeKind::ServerFault,
                "Server error occurred. Please try again later.",
            ),
            ApiError::Network(e) => Notice::new(NoticeKind::Error, format!("Network error: {}", e)),
            ApiError::Unexpected(message) => Notice::new(NoticeKind::Error, message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_taxonomy() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::SessionExpired
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ApiError::ServerFault(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, ""),
            ApiError::ServerFault(_)
        ));
    }

    #[test]
    fn test_422_field_errors_from_map_of_arrays() {
        let body = r#"{"errors": {"partyName": ["Party name is required"], "phone": ["Invalid phone"]}}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        match err {
            ApiError::ValidationFailed { message, errors } => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors["partyName"], "Party name is required");
                assert!(message.contains("Invalid phone"));
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_422_falls_back_to_body_message() {
        let body = r#"{"message": "Quantity out of range"}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        match err {
            ApiError::ValidationFailed { message, errors } => {
                assert!(errors.is_empty());
                assert_eq!(message, "Quantity out of range");
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_422_generic_message_on_unparseable_body() {
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "<html>");
        match err {
            ApiError::ValidationFailed { message, .. } => {
                assert_eq!(message, "Validation error occurred.");
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_uses_server_message() {
        let body = r#"{"message": "teapot refused"}"#;
        let err = ApiError::from_status(StatusCode::IM_A_TEAPOT, body);
        match err {
            ApiError::Unexpected(message) => assert_eq!(message, "teapot refused"),
            other => panic!("expected Unexpected, got {:?}", other),
        }
    }

    #[test]
    fn test_notice_kinds_match_taxonomy() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.notice().kind, NoticeKind::SessionExpired);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.notice().kind, NoticeKind::ServerFault);
    }

    #[test]
    fn test_truncate_body_multibyte_at_cut_point() {
        // 'é' is two bytes and straddles the 500-byte cut; truncation
        // must back up to the boundary instead of panicking.
        let mut body = "x".repeat(MAX_ERROR_BODY_LENGTH - 1);
        body.push('é');
        body.push_str(&"y".repeat(100));

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            ApiError::ServerFault(msg) => {
                assert!(msg.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH - 1)));
                assert!(msg.contains("truncated"));
                assert!(!msg.contains('é'));
            }
            other => panic!("expected ServerFault, got {:?}", other),
        }
    }

    #[test]
    fn test_truncate_body_long_response() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(StatusCode::FORBIDDEN, &body);
        match err {
            ApiError::AccessDenied(msg) => {
                assert!(msg.contains("truncated"));
                assert!(msg.len() < 600);
            }
            other => panic!("expected AccessDenied, got {:?}", other),
        }
    }
}
