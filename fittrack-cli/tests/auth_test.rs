use std::sync::Arc;
use std::time::Duration;

use fittrack_cli::api::{find_api_error, ApiClient, ApiError, ResponseCache, RetryConfig};
use fittrack_cli::auth::AuthService;
use fittrack_cli::config::Config;
use fittrack_cli::models::User;
use fittrack_cli::notifications::message_for;
use fittrack_cli::storage::Storage;
use fittrack_cli::validation::LoginForm;
use mockito::{Matcher, Server};

const SESSION_BODY: &str = r#"{"success":true,"data":{
    "token":"tok-123",
    "user":{"id":"u1","username":"runner42","email":"runner@example.com","firstName":"Ada"}
}}"#;

fn auth_for(server: &Server, storage: Storage) -> AuthService {
    let mut config = Config::default();
    config.api.base_url = server.url();
    let cache = Arc::new(ResponseCache::new(Duration::from_secs(60)));
    let client = ApiClient::with_parts(&config, RetryConfig::none(), cache).unwrap();
    AuthService::new(client, storage)
}

fn credentials() -> LoginForm {
    LoginForm {
        email: "runner@example.com".to_string(),
        password: "Secret123".to_string(),
    }
}

#[tokio::test]
async fn test_login_stores_session() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::PartialJsonString(
            r#"{"email":"runner@example.com"}"#.to_string(),
        ))
        .with_body(SESSION_BODY)
        .create_async()
        .await;

    let storage = Storage::temporary().unwrap();
    let auth = auth_for(&server, storage.clone());

    let user = auth.login(&credentials()).await.unwrap();
    assert_eq!(user.display_name(), "Ada");
    assert!(auth.is_authenticated().await);
    assert_eq!(storage.token(None).unwrap().as_deref(), Some("tok-123"));
    assert_eq!(storage.current_user().unwrap().unwrap().username, "runner42");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_form_never_reaches_server() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/login")
        .expect(0)
        .create_async()
        .await;

    let auth = auth_for(&server, Storage::temporary().unwrap());
    let form = LoginForm {
        email: "not-an-email".to_string(),
        password: String::new(),
    };

    assert!(auth.login(&form).await.is_err());
    assert!(!auth.is_authenticated().await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_restore_and_logout() {
    let mut server = Server::new_async().await;
    let logout = server
        .mock("POST", "/api/auth/logout")
        .match_header("authorization", "Bearer tok-123")
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;

    let storage = Storage::temporary().unwrap();
    let user = serde_json::from_str(
        r#"{"id":"u1","username":"runner42","email":"runner@example.com"}"#,
    )
    .unwrap();
    storage.save_session("tok-123", &user).unwrap();

    let auth = auth_for(&server, storage.clone());
    assert!(auth.restore().await.unwrap());
    assert!(auth.require_auth().await.is_ok());

    auth.logout().await.unwrap();
    assert!(!auth.is_authenticated().await);
    assert!(storage.token(None).unwrap().is_none());
    logout.assert_async().await;
}

#[tokio::test]
async fn test_logout_clears_local_session_when_server_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/logout")
        .with_status(500)
        .create_async()
        .await;

    let storage = Storage::temporary().unwrap();
    let auth = auth_for(&server, storage.clone());
    auth.client().set_token(Some("tok-123".to_string())).await;

    auth.logout().await.unwrap();
    assert!(!auth.is_authenticated().await);
}

#[tokio::test]
async fn test_rejected_session_is_cleared() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/goals")
        .with_status(401)
        .create_async()
        .await;

    let storage = Storage::temporary().unwrap();
    let user = serde_json::from_str(
        r#"{"id":"u1","username":"runner42","email":"runner@example.com"}"#,
    )
    .unwrap();
    storage.save_session("stale", &user).unwrap();

    let auth = auth_for(&server, storage.clone());
    auth.restore().await.unwrap();

    let err = auth.client().goals().await.unwrap_err();
    assert!(matches!(find_api_error(&err), Some(ApiError::Unauthorized(_))));

    let message = auth.handle_error(&err).await;
    assert!(message.contains("log in again"));
    assert!(!auth.is_authenticated().await);
    assert!(storage.token(None).unwrap().is_none());
}

#[tokio::test]
async fn test_require_auth_without_session() {
    let server = Server::new_async().await;
    let auth = auth_for(&server, Storage::temporary().unwrap());

    assert!(!auth.restore().await.unwrap());
    let err = auth.require_auth().await.unwrap_err();
    assert!(find_api_error(&err).map_or(false, ApiError::requires_login));
}

#[tokio::test]
async fn test_wrong_password_shows_server_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .with_status(401)
        .with_body(r#"{"success":false,"message":"Invalid email or password"}"#)
        .create_async()
        .await;

    let storage = Storage::temporary().unwrap();
    let user: User =
        serde_json::from_str(r#"{"id":"u1","username":"runner42","email":"runner@example.com"}"#)
            .unwrap();
    storage.save_session("old-token", &user).unwrap();
    let auth = auth_for(&server, storage.clone());

    let err = auth.login(&credentials()).await.unwrap_err();
    assert_eq!(message_for(&err), "Invalid email or password");
    assert!(!find_api_error(&err).unwrap().requires_login());

    // A failed login leaves whatever session was stored alone
    assert_eq!(auth.handle_error(&err).await, "Invalid email or password");
    assert_eq!(storage.token(None).unwrap().as_deref(), Some("old-token"));
}

#[tokio::test]
async fn test_bare_401_on_login_means_bad_credentials() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .with_status(401)
        .create_async()
        .await;

    let auth = auth_for(&server, Storage::temporary().unwrap());
    let err = auth.login(&credentials()).await.unwrap_err();
    assert_eq!(message_for(&err), "Invalid email or password");
}
