use reqwest::StatusCode;
use thiserror::Error;

use super::envelope::ErrorBody;
use crate::validation::ValidationErrors;

/// API-specific errors
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        errors: ValidationErrors,
    },

    #[error("Rate limited")]
    RateLimited { retry_after_seconds: Option<u64> },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map a non-success HTTP status and its body to an error.
    ///
    /// The body is read as the `{ success, message, errors }` envelope when
    /// possible, otherwise used as plain text.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(&body).ok();

        let msg = match parsed.as_ref().and_then(|b| b.message.clone()) {
            Some(m) if !m.is_empty() => m,
            _ if !body.is_empty() && parsed.is_none() => body,
            _ => status.canonical_reason().unwrap_or("Unknown error").to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(msg),
            StatusCode::FORBIDDEN => ApiError::Forbidden(msg),
            StatusCode::NOT_FOUND => ApiError::NotFound(msg),
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation {
                message: msg,
                errors: parsed.and_then(|b| b.errors).unwrap_or_default(),
            },
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited {
                retry_after_seconds: None,
            },
            status if status.is_server_error() => ApiError::Server {
                status: status.as_u16(),
                message: msg,
            },
            status if status.is_client_error() => ApiError::BadRequest(msg),
            _ => ApiError::Rejected(msg),
        }
    }

    /// Classify a transport failure from reqwest
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status, String::new())
        } else {
            ApiError::Network(err.to_string())
        }
    }

    /// HTTP status the error came from; 0 when the server was never reached
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Network(_) | ApiError::Timeout => 0,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Validation { .. } => 422,
            ApiError::RateLimited { .. } => 429,
            ApiError::Server { status, .. } => *status,
            ApiError::Rejected(_) | ApiError::Decode(_) => 200,
        }
    }

    /// Worth another attempt: the server was unreachable, overloaded or failing
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_)
                | ApiError::Timeout
                | ApiError::RateLimited { .. }
                | ApiError::Server { .. }
        )
    }

    /// The failure happened before any response arrived
    pub fn is_network(&self) -> bool {
        self.status_code() == 0
    }

    /// The stored session is no longer valid and local credentials must go
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Timeout => {
                "Unable to reach the server. Check your internet connection.".to_string()
            }
            ApiError::Unauthorized(_) => {
                "Your session has expired. Please log in again.".to_string()
            }
            ApiError::Forbidden(_) => {
                "You do not have permission to perform this action.".to_string()
            }
            ApiError::NotFound(_) => "The requested resource was not found.".to_string(),
            ApiError::Validation { message, errors } => {
                if errors.is_empty() {
                    message.clone()
                } else {
                    errors.messages().join("\n")
                }
            }
            ApiError::RateLimited { .. } => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            ApiError::Server { .. } => {
                "The server encountered an error. Please try again later.".to_string()
            }
            ApiError::BadRequest(msg) | ApiError::Rejected(msg) => msg.clone(),
            ApiError::Decode(_) => {
                "The server sent a response that could not be understood.".to_string()
            }
        }
    }
}

/// Find an `ApiError` anywhere in an anyhow error chain
pub fn find_api_error(err: &anyhow::Error) -> Option<&ApiError> {
    err.chain().find_map(|cause| cause.downcast_ref::<ApiError>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ApiError::RateLimited { .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, String::new()),
            ApiError::Server { status: 502, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, String::new()),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn test_validation_body_is_parsed() {
        let body = r#"{"success":false,"message":"Invalid input","errors":{"email":["Email is already registered"],"password":["Too short"]}}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body.to_string());

        match &err {
            ApiError::Validation { message, errors } => {
                assert_eq!(message, "Invalid input");
                assert_eq!(errors.field("email"), ["Email is already registered"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(err.user_message(), "Email is already registered\nToo short");
    }

    #[test]
    fn test_plain_text_body_becomes_message() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "no such goal".to_string());
        assert_eq!(err.to_string(), "Resource not found: no such goal");
    }

    #[test]
    fn test_empty_body_uses_reason_phrase() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, String::new());
        assert_eq!(err.to_string(), "Forbidden: Forbidden");
    }

    #[test]
    fn test_retry_classification() {
        assert!(ApiError::Timeout.is_retryable());
        assert!(ApiError::Network("reset".into()).is_retryable());
        assert!(ApiError::Server { status: 503, message: String::new() }.is_retryable());
        assert!(!ApiError::Unauthorized(String::new()).is_retryable());
        assert!(!ApiError::NotFound(String::new()).is_retryable());
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(ApiError::Timeout.status_code(), 0);
        assert!(ApiError::Network("x".into()).user_message().contains("internet connection"));
        assert!(ApiError::Unauthorized("x".into()).user_message().contains("log in again"));
        assert!(ApiError::RateLimited { retry_after_seconds: None }
            .user_message()
            .contains("Too many requests"));
    }

    #[test]
    fn test_find_api_error_through_context() {
        let err = anyhow::Error::new(ApiError::Timeout).context("Failed to load goals");
        assert!(matches!(find_api_error(&err), Some(ApiError::Timeout)));
    }
}
