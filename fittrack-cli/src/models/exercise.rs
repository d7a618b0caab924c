use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Difficulty;

/// Entry of the exercise library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub fallback_video_urls: Vec<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub calories_per_minute: Option<f64>,
}

impl Exercise {
    /// Playable sources in preference order: primary first, then fallbacks.
    /// Blank and repeated URLs are skipped.
    pub fn video_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for url in self.video_url.iter().chain(self.fallback_video_urls.iter()) {
            let url = url.trim();
            if !url.is_empty() && !sources.iter().any(|s| s == url) {
                sources.push(url.to_string());
            }
        }
        sources
    }

    pub fn targets(&self, muscle: &str) -> bool {
        self.muscle_groups
            .iter()
            .any(|m| m.eq_ignore_ascii_case(muscle))
    }
}

/// Query options for the exercise library
#[derive(Debug, Default, Clone)]
pub struct ExerciseFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl ExerciseFilter {
    pub fn matches(&self, exercise: &Exercise) -> bool {
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            let in_name = exercise.name.to_lowercase().contains(&needle);
            let in_muscles = exercise
                .muscle_groups
                .iter()
                .any(|m| m.to_lowercase().contains(&needle));
            if !in_name && !in_muscles {
                return false;
            }
        }

        if let Some(ref category) = self.category {
            if !exercise.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }

        if let Some(difficulty) = self.difficulty {
            if exercise.difficulty != difficulty {
                return false;
            }
        }

        true
    }

    /// Query string for `GET /api/exercises`
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(ref category) = self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(difficulty) = self.difficulty {
            pairs.push(("difficulty", difficulty.to_string().to_lowercase()));
        }
        pairs
    }
}

/// How far the user got through an exercise video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseProgress {
    pub exercise_id: String,
    pub position_seconds: f64,
    pub duration_seconds: Option<f64>,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl ExerciseProgress {
    pub fn new(exercise_id: impl Into<String>) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            position_seconds: 0.0,
            duration_seconds: None,
            completed: false,
            updated_at: Utc::now(),
        }
    }

    /// Watched share of the video in whole percent, 0 when the length is unknown
    pub fn percent_watched(&self) -> u8 {
        match self.duration_seconds {
            Some(d) if d > 0.0 => ((self.position_seconds / d) * 100.0).round().clamp(0.0, 100.0) as u8,
            _ => 0,
        }
    }
}
