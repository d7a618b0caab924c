use anyhow::{Context, Result};
use chrono::Duration;

use crate::api::{find_api_error, ApiClient, ApiError};
use crate::models::User;
use crate::storage::Storage;
use crate::validation::{LoginForm, RegisterForm, ResetPasswordForm};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// A 401 from the credential endpoints means the credentials were wrong,
/// not that a session expired
fn credentials_rejected(err: anyhow::Error) -> anyhow::Error {
    let message = match find_api_error(&err) {
        Some(ApiError::Unauthorized(msg)) if msg.is_empty() || msg == "Unauthorized" => {
            Some(INVALID_CREDENTIALS.to_string())
        }
        Some(ApiError::Unauthorized(msg)) => Some(msg.clone()),
        _ => None,
    };
    match message {
        Some(message) => ApiError::Rejected(message).into(),
        None => err,
    }
}

/// Session management on top of the API client and the local store.
///
/// The token lives in the store so it survives between runs; the client
/// only holds a copy for the current process.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
    storage: Storage,
    session_max_age: Option<Duration>,
}

impl AuthService {
    pub fn new(client: ApiClient, storage: Storage) -> Self {
        Self {
            client,
            storage,
            session_max_age: None,
        }
    }

    /// Discard stored sessions older than `max_age`
    pub fn with_session_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.session_max_age = max_age;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Load a stored token into the client. Returns whether a session exists.
    pub async fn restore(&self) -> Result<bool> {
        let token = self.storage.token(self.session_max_age)?;
        let restored = token.is_some();
        if !restored {
            // Token expired or never existed; drop the cached user with it
            self.storage.remove(crate::storage::CURRENT_USER_KEY)?;
        }
        self.client.set_token(token).await;
        Ok(restored)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.client.has_token().await
    }

    /// Route guard: fail with `Unauthorized` when there is no session
    pub async fn require_auth(&self) -> Result<()> {
        if self.is_authenticated().await {
            Ok(())
        } else {
            Err(ApiError::Unauthorized("Not logged in".to_string()).into())
        }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<User> {
        let request = form.to_request()?;
        let session = self
            .client
            .login(&request)
            .await
            .map_err(credentials_rejected)?;

        self.storage
            .save_session(&session.token, &session.user)
            .context("Failed to store session")?;
        self.client.set_token(Some(session.token)).await;

        Ok(session.user)
    }

    /// Create an account; the new session is stored like a login
    pub async fn register(&self, form: &RegisterForm) -> Result<User> {
        let request = form.to_request()?;
        let session = self
            .client
            .register(&request)
            .await
            .map_err(credentials_rejected)?;

        self.storage
            .save_session(&session.token, &session.user)
            .context("Failed to store session")?;
        self.client.set_token(Some(session.token)).await;

        Ok(session.user)
    }

    pub async fn reset_password(&self, form: &ResetPasswordForm) -> Result<()> {
        let request = form.to_request()?;
        self.client.reset_password(&request).await
    }

    /// End the session. The server call is best effort; local state is
    /// always cleared.
    pub async fn logout(&self) -> Result<()> {
        if self.is_authenticated().await {
            if let Err(e) = self.client.logout().await {
                tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }
        self.clear_local().await
    }

    /// User cached at login, refreshed from the server when online
    pub async fn current_user(&self) -> Result<Option<User>> {
        if !self.is_authenticated().await {
            return Ok(None);
        }

        match self.client.me().await {
            Ok(user) => {
                self.storage.set(crate::storage::CURRENT_USER_KEY, &user)?;
                Ok(Some(user))
            }
            Err(e) => match find_api_error(&e) {
                Some(api) if api.is_network() => self.storage.current_user(),
                _ => Err(e),
            },
        }
    }

    /// React to a failed call: an expired session clears local
    /// credentials. Returns the message to show.
    pub async fn handle_error(&self, err: &anyhow::Error) -> String {
        if let Some(api) = find_api_error(err) {
            if api.requires_login() {
                tracing::info!("Session rejected by server, clearing local credentials");
                if let Err(e) = self.clear_local().await {
                    tracing::warn!("Failed to clear session: {}", e);
                }
            }
        }
        crate::notifications::message_for(err)
    }

    async fn clear_local(&self) -> Result<()> {
        self.client.set_token(None).await;
        self.client.cache().clear();
        self.storage.clear_session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn service() -> AuthService {
        let client = ApiClient::new(&Config::default()).unwrap();
        AuthService::new(client, Storage::temporary().unwrap())
    }

    #[tokio::test]
    async fn test_require_auth_without_session() {
        let auth = service();
        let err = auth.require_auth().await.unwrap_err();
        assert!(matches!(find_api_error(&err), Some(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_restore_loads_token() {
        let auth = service();
        assert!(!auth.restore().await.unwrap());

        auth.storage.set(crate::storage::AUTH_TOKEN_KEY, &"stored-token").unwrap();
        assert!(auth.restore().await.unwrap());
        assert_eq!(auth.client.token().await.as_deref(), Some("stored-token"));
    }

    #[tokio::test]
    async fn test_invalid_form_never_hits_network() {
        let auth = service();
        let err = auth.login(&LoginForm::default()).await.unwrap_err();
        assert!(err.downcast_ref::<crate::validation::ValidationErrors>().is_some());
    }

    #[tokio::test]
    async fn test_unauthorized_error_clears_session() {
        let auth = service();
        auth.storage.set(crate::storage::AUTH_TOKEN_KEY, &"old").unwrap();
        auth.restore().await.unwrap();
        auth.client.cache().insert("goals", &1u8);

        let err = anyhow::Error::new(ApiError::Unauthorized("expired".into()));
        let message = auth.handle_error(&err).await;

        assert!(message.contains("log in again"));
        assert!(!auth.is_authenticated().await);
        assert!(auth.storage.token(None).unwrap().is_none());
        assert!(auth.client.cache().is_empty());
    }

    #[tokio::test]
    async fn test_other_errors_keep_session() {
        let auth = service();
        auth.storage.set(crate::storage::AUTH_TOKEN_KEY, &"keep").unwrap();
        auth.restore().await.unwrap();

        let err = anyhow::Error::new(ApiError::NotFound("goal".into()));
        auth.handle_error(&err).await;
        assert!(auth.is_authenticated().await);
    }
}
