use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::validation::ValidationErrors;

/// `{ success, data, message }` wrapper around every backend response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// A missing field decodes as `None`; no `T: Default` needed
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Unwrap the payload. A `success: false` body is an error even on 2xx.
    /// A missing `data` field decodes as JSON `null`, which suits `()` and
    /// `Option<_>` payloads.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| "Request was not successful".to_string()),
            ));
        }

        match self.data {
            Some(data) => Ok(data),
            None => serde_json::from_value(serde_json::Value::Null)
                .map_err(|_| ApiError::Decode("Response envelope has no data".to_string())),
        }
    }
}

/// Error-side view of the envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<ValidationErrors>,
}
