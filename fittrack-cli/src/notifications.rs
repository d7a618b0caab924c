//! Transient toast messages shown in the status bar and after commands.

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::api::{find_api_error, ApiError};

const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub level: Level,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub lifetime: Duration,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= self.lifetime
    }
}

/// Bounded queue of toasts; the oldest is dropped when full
#[derive(Debug)]
pub struct NotificationCenter {
    queue: VecDeque<Notification>,
    lifetime: Duration,
}

impl NotificationCenter {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            lifetime,
        }
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) -> Uuid {
        self.push_at(level, message, Utc::now())
    }

    fn push_at(&mut self, level: Level, message: impl Into<String>, now: DateTime<Utc>) -> Uuid {
        // Errors stay on screen twice as long
        let lifetime = match level {
            Level::Error => self.lifetime * 2,
            _ => self.lifetime,
        };

        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: now,
            lifetime,
        };
        let id = notification.id;

        if self.queue.len() == MAX_TOASTS {
            self.queue.pop_front();
        }
        self.queue.push_back(notification);
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> Uuid {
        self.push(Level::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> Uuid {
        self.push(Level::Success, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> Uuid {
        self.push(Level::Warning, message)
    }

    /// Push the user-facing message for `err`
    pub fn error(&mut self, err: &anyhow::Error) -> Uuid {
        self.push(Level::Error, message_for(err))
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.queue.len();
        self.queue.retain(|n| n.id != id);
        before != self.queue.len()
    }

    /// Drop expired toasts and return the rest, oldest first
    pub fn active(&mut self) -> impl Iterator<Item = &Notification> {
        self.active_at(Utc::now())
    }

    fn active_at(&mut self, now: DateTime<Utc>) -> impl Iterator<Item = &Notification> {
        self.queue.retain(|n| !n.is_expired(now));
        self.queue.iter()
    }

    /// Newest toast, if any
    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::seconds(4))
    }
}

/// Message to show for any error: the API mapping when there is one,
/// otherwise the error with its context chain
pub fn message_for(err: &anyhow::Error) -> String {
    match find_api_error(err) {
        Some(api) => api.user_message(),
        None => match err.downcast_ref::<crate::validation::ValidationErrors>() {
            Some(v) => ApiError::Validation {
                message: v.to_string(),
                errors: v.clone(),
            }
            .user_message(),
            None => format!("{:#}", err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let mut center = NotificationCenter::new(Duration::seconds(4));
        let start = Utc::now();
        center.push_at(Level::Info, "saved", start);
        center.push_at(Level::Error, "failed", start);

        assert_eq!(center.active_at(start + Duration::seconds(3)).count(), 2);

        let left: Vec<_> = center
            .active_at(start + Duration::seconds(5))
            .map(|n| n.message.clone())
            .collect();
        assert_eq!(left, vec!["failed".to_string()]);

        assert_eq!(center.active_at(start + Duration::seconds(9)).count(), 0);
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut center = NotificationCenter::default();
        for i in 0..7 {
            center.info(format!("toast {}", i));
        }
        assert_eq!(center.active().count(), MAX_TOASTS);
        assert_eq!(center.latest().unwrap().message, "toast 6");
    }

    #[test]
    fn test_dismiss() {
        let mut center = NotificationCenter::default();
        let id = center.success("done");
        assert!(center.dismiss(id));
        assert!(!center.dismiss(id));
    }

    #[test]
    fn test_error_uses_user_message() {
        let mut center = NotificationCenter::default();
        let err = anyhow::Error::new(ApiError::RateLimited { retry_after_seconds: None });
        center.error(&err);
        assert_eq!(center.latest().unwrap().level, Level::Error);
        assert!(center.latest().unwrap().message.starts_with("Too many requests"));

        assert_eq!(message_for(&anyhow::anyhow!("plain failure")), "plain failure");

        let chained = anyhow::anyhow!("disk full").context("Failed to store session");
        assert_eq!(message_for(&chained), "Failed to store session: disk full");
    }
}
