// src/error.rs
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Tagged failure returned by every remote or cache operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// No response from the server (connect error, timeout).
    #[error("Network failure: {0}")]
    Network(String),

    /// Expired or invalid credential, or no session at all.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Valid credential, but the role may not perform the action.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// The server refused a write that clashes with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected server-side.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unexpected status or undecodable body.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Credential store failure.
    #[error("Credential storage error: {0}")]
    Storage(String),
}

/// A `Result` type that uses `SyncError` as the error type.
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    pub fn is_auth(&self) -> bool {
        matches!(self, SyncError::Auth(_))
    }

    pub fn not_logged_in() -> Self {
        SyncError::Auth("No active session".to_string())
    }

    /// Map a non-success HTTP reply to the failure taxonomy.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let detail = parsed
            .as_ref()
            .and_then(|v| v.get("detail"))
            .and_then(Value::as_str)
            .map(str::to_string);

        match status {
            StatusCode::UNAUTHORIZED => {
                SyncError::Auth(detail.unwrap_or_else(|| status.to_string()))
            }
            // Role checks answer 403 for a perfectly valid token.
            StatusCode::FORBIDDEN => {
                SyncError::Forbidden(detail.unwrap_or_else(|| status.to_string()))
            }
            StatusCode::CONFLICT => SyncError::Conflict(detail.unwrap_or_else(|| body.to_string())),
            // The backend answers duplicate writes with a bare `detail` on 400,
            // field errors come back keyed by field name.
            StatusCode::BAD_REQUEST => match detail {
                Some(detail) => SyncError::Conflict(detail),
                None => SyncError::Validation(field_messages(parsed.as_ref(), body)),
            },
            StatusCode::UNPROCESSABLE_ENTITY => {
                SyncError::Validation(field_messages(parsed.as_ref(), body))
            }
            _ => SyncError::InvalidResponse(format!("HTTP {}: {}", status, body)),
        }
    }
}

fn field_messages(parsed: Option<&Value>, raw: &str) -> String {
    let Some(Value::Object(fields)) = parsed else {
        return raw.to_string();
    };

    let mut parts: Vec<String> = fields
        .iter()
        .map(|(field, value)| {
            let message = match value {
                Value::Array(items) => items
                    .iter()
                    .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                    .collect::<Vec<_>>()
                    .join(", "),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}: {}", field, message)
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::from_status(status, "")
        } else {
            SyncError::Network(err.to_string())
        }
    }
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        SyncError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_auth() {
        let err = SyncError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"detail": "Authentication credentials were not provided."}"#,
        );
        assert_eq!(
            err,
            SyncError::Auth("Authentication credentials were not provided.".to_string())
        );
        assert!(err.is_auth());
    }

    #[test]
    fn test_forbidden_is_not_an_auth_failure() {
        let err = SyncError::from_status(
            StatusCode::FORBIDDEN,
            r#"{"detail": "You do not have permission to perform this action."}"#,
        );
        assert_eq!(
            err,
            SyncError::Forbidden("You do not have permission to perform this action.".to_string())
        );
        assert!(!err.is_auth());
    }

    #[test]
    fn test_duplicate_application_maps_to_conflict() {
        let err = SyncError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "You have already applied for this job."}"#,
        );
        assert!(matches!(err, SyncError::Conflict(_)));
    }

    #[test]
    fn test_field_errors_map_to_validation() {
        let err = SyncError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"resume": ["You cannot use this resume."], "job": "required"}"#,
        );
        assert_eq!(
            err,
            SyncError::Validation("job: required; resume: You cannot use this resume.".to_string())
        );
    }

    #[test]
    fn test_plain_body_is_kept() {
        let err = SyncError::from_status(StatusCode::BAD_REQUEST, "bad input");
        assert_eq!(err, SyncError::Validation("bad input".to_string()));
    }

    #[test]
    fn test_server_error_is_invalid_response() {
        let err = SyncError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, SyncError::InvalidResponse(_)));
    }
}
