use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account record returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name shown in greetings: "First Last" when known, otherwise the username
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.username.clone(),
        }
    }
}

/// Token plus user returned by login and register
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            username: "runner42".to_string(),
            email: "runner@example.com".to_string(),
            first_name: None,
            last_name: None,
            created_at: None,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut u = user();
        assert_eq!(u.display_name(), "runner42");

        u.first_name = Some("Ada".to_string());
        assert_eq!(u.display_name(), "Ada");

        u.last_name = Some("Lovelace".to_string());
        assert_eq!(u.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_user_deserializes_camel_case() {
        let json = r#"{"id":"7","username":"sam","email":"s@x.io","firstName":"Sam"}"#;
        let u: User = serde_json::from_str(json).unwrap();
        assert_eq!(u.first_name.as_deref(), Some("Sam"));
        assert!(u.last_name.is_none());
    }
}
