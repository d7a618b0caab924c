// Local key-value store using the sled embedded database.
// Every value is kept as JSON wrapped with the time it was written.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;

use crate::builder::WorkoutDraft;
use crate::models::{ExerciseProgress, User};

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const CURRENT_USER_KEY: &str = "current_user";
pub const WORKOUT_DRAFT_KEY: &str = "workout_draft";
pub const EXERCISE_PROGRESS_PREFIX: &str = "exercise_progress:";

/// Stored value with the time it was written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timestamped<T> {
    pub value: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> Timestamped<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            timestamp: Utc::now(),
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }
}

/// Storage manager for local embedded database
#[derive(Clone)]
pub struct Storage {
    db: Db,
}

impl Storage {
    /// Open (or create) the store in `path`
    pub fn open(path: &Path) -> Result<Self> {
        tracing::info!("Initializing sled database at {:?}", path);

        let db = sled::open(path).context("Failed to open sled database")?;

        Ok(Self { db })
    }

    /// In-memory store that disappears on drop
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .context("Failed to open temporary sled database")?;
        Ok(Self { db })
    }

    /// Store `value` under `key`, stamped with the current time
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set_entry(key, &Timestamped::new(value))
    }

    fn set_entry<T: Serialize>(&self, key: &str, entry: &Timestamped<T>) -> Result<()> {
        let bytes = serde_json::to_vec(entry)
            .with_context(|| format!("Failed to serialize value for '{}'", key))?;

        self.db
            .insert(key.as_bytes(), bytes)
            .with_context(|| format!("Failed to store '{}'", key))?;

        self.db.flush().context("Failed to flush database")?;

        tracing::debug!("Stored {}", key);
        Ok(())
    }

    /// Value and timestamp for `key`
    pub fn get_entry<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Timestamped<T>>> {
        match self
            .db
            .get(key.as_bytes())
            .with_context(|| format!("Failed to read '{}'", key))?
        {
            Some(bytes) => {
                let entry = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Failed to deserialize '{}'", key))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Ok(self.get_entry(key)?.map(|e| e.value))
    }

    /// Value for `key` if it was written less than `max_age` ago.
    /// Older entries are removed.
    pub fn get_fresh<T: DeserializeOwned>(&self, key: &str, max_age: Duration) -> Result<Option<T>> {
        self.get_fresh_at(key, max_age, Utc::now())
    }

    fn get_fresh_at<T: DeserializeOwned>(
        &self,
        key: &str,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<T>> {
        match self.get_entry::<T>(key)? {
            Some(entry) if entry.age(now) < max_age => Ok(Some(entry.value)),
            Some(_) => {
                tracing::debug!("Evicting stale entry {}", key);
                self.remove(key)?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        let removed = self
            .db
            .remove(key.as_bytes())
            .with_context(|| format!("Failed to remove '{}'", key))?
            .is_some();

        if removed {
            self.db.flush().context("Failed to flush database")?;
            tracing::debug!("Removed {}", key);
        }

        Ok(removed)
    }

    /// All values whose key starts with `prefix`, in key order
    pub fn scan_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let mut values = Vec::new();

        for item in self.db.scan_prefix(prefix.as_bytes()) {
            let (_key, bytes) = item.context("Failed to iterate store")?;
            let entry: Timestamped<T> =
                serde_json::from_slice(&bytes).context("Failed to deserialize entry")?;
            values.push(entry.value);
        }

        Ok(values)
    }

    // Session

    pub fn save_session(&self, token: &str, user: &User) -> Result<()> {
        self.set(AUTH_TOKEN_KEY, &token)?;
        self.set(CURRENT_USER_KEY, user)
    }

    /// Stored token, optionally bounded by age
    pub fn token(&self, max_age: Option<Duration>) -> Result<Option<String>> {
        match max_age {
            Some(age) => self.get_fresh(AUTH_TOKEN_KEY, age),
            None => self.get(AUTH_TOKEN_KEY),
        }
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        self.get(CURRENT_USER_KEY)
    }

    /// Remove token and cached user
    pub fn clear_session(&self) -> Result<()> {
        self.remove(AUTH_TOKEN_KEY)?;
        self.remove(CURRENT_USER_KEY)?;
        Ok(())
    }

    // Workout builder draft

    pub fn save_draft(&self, draft: &WorkoutDraft) -> Result<()> {
        self.set(WORKOUT_DRAFT_KEY, draft)
    }

    pub fn load_draft(&self) -> Result<Option<WorkoutDraft>> {
        self.get(WORKOUT_DRAFT_KEY)
    }

    pub fn clear_draft(&self) -> Result<bool> {
        self.remove(WORKOUT_DRAFT_KEY)
    }

    // Exercise viewing progress

    pub fn save_exercise_progress(&self, progress: &ExerciseProgress) -> Result<()> {
        self.set(
            &format!("{}{}", EXERCISE_PROGRESS_PREFIX, progress.exercise_id),
            progress,
        )
    }

    pub fn exercise_progress(&self, exercise_id: &str) -> Result<Option<ExerciseProgress>> {
        self.get(&format!("{}{}", EXERCISE_PROGRESS_PREFIX, exercise_id))
    }

    pub fn all_exercise_progress(&self) -> Result<Vec<ExerciseProgress>> {
        self.scan_prefix(EXERCISE_PROGRESS_PREFIX)
    }
}
