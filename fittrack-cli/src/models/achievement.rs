use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

/// Gamification score from `GET /api/user/score`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScore {
    pub total_points: u32,
    pub level: u32,
    #[serde(default)]
    pub points_to_next_level: u32,
    #[serde(default)]
    pub rank: Option<u32>,
}

impl UserScore {
    /// Progress through the current level, where the level spans
    /// `total_points + points_to_next_level` from the level floor of 0
    pub fn level_progress_percentage(&self) -> u8 {
        let span = self.total_points + self.points_to_next_level;
        if span == 0 {
            return 0;
        }
        ((self.total_points as f64 / span as f64) * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_progress() {
        let score = UserScore {
            total_points: 750,
            level: 3,
            points_to_next_level: 250,
            rank: None,
        };
        assert_eq!(score.level_progress_percentage(), 75);
        assert_eq!(UserScore::default().level_progress_percentage(), 0);
    }
}
