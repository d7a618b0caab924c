use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::models::{AuthSession, User};

/// Login request payload
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request payload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

impl ApiClient {
    /// Exchange credentials for a session token
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession> {
        tracing::debug!("Logging in as {}", request.email);
        let session: AuthSession = self.post("/api/auth/login", request).await?;
        tracing::info!("Successfully logged in as {}", session.user.username);
        Ok(session)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession> {
        tracing::debug!("Registering {}", request.username);
        let session: AuthSession = self.post("/api/auth/register", request).await?;
        tracing::info!("Registered account {}", session.user.username);
        Ok(session)
    }

    /// Ask the backend to email a password reset link
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<()> {
        self.post("/api/auth/reset-password", request).await
    }

    /// Invalidate the current token server-side
    pub async fn logout(&self) -> Result<()> {
        self.post("/api/auth/logout", &serde_json::json!({})).await
    }

    /// Get current user information
    pub async fn me(&self) -> Result<User> {
        if !self.has_token().await {
            return Err(anyhow::anyhow!("Not logged in"));
        }
        self.get("/api/auth/me", None).await
    }
}
