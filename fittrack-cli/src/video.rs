//! Playback state for exercise videos.
//!
//! The controller owns an ordered list of candidate URLs. When the active
//! source fails it moves on to the next one and remembers where playback
//! was, so the fallback resumes at the same position.

use chrono::Utc;

use crate::models::ExerciseProgress;

/// Share of the video after which it counts as watched
const COMPLETION_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing requested yet
    Idle,
    Loading,
    Playing,
    Paused,
    Ended,
    /// Every source failed
    Failed,
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    exercise_id: String,
    sources: Vec<String>,
    current: usize,
    state: PlaybackState,
    position: f64,
    duration: Option<f64>,
    play_when_loaded: bool,
    failures: Vec<String>,
}

impl PlaybackController {
    pub fn new(exercise_id: impl Into<String>, sources: Vec<String>) -> Self {
        let state = if sources.is_empty() {
            PlaybackState::Failed
        } else {
            PlaybackState::Idle
        };

        Self {
            exercise_id: exercise_id.into(),
            sources,
            current: 0,
            state,
            position: 0.0,
            duration: None,
            play_when_loaded: false,
            failures: Vec::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// URL currently being played, `None` once every source has failed
    pub fn current_source(&self) -> Option<&str> {
        match self.state {
            PlaybackState::Failed => None,
            _ => self.sources.get(self.current).map(String::as_str),
        }
    }

    /// Sources that have failed so far, in order
    pub fn failed_sources(&self) -> &[String] {
        &self.failures
    }

    pub fn remaining_sources(&self) -> usize {
        match self.state {
            PlaybackState::Failed => 0,
            _ => self.sources.len() - self.current - 1,
        }
    }

    /// Start fetching the current source without playing it
    pub fn load(&mut self) {
        if self.state == PlaybackState::Idle {
            self.state = PlaybackState::Loading;
        }
    }

    /// Media metadata arrived for the current source
    pub fn on_loaded(&mut self, duration: f64) {
        if self.state != PlaybackState::Loading {
            return;
        }

        self.duration = (duration.is_finite() && duration > 0.0).then_some(duration);
        self.position = self.clamp(self.position);

        self.state = if self.play_when_loaded {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        };

        tracing::debug!(exercise = %self.exercise_id, "Video loaded ({:?}s)", self.duration);
    }

    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Idle => {
                self.state = PlaybackState::Loading;
                self.play_when_loaded = true;
            }
            PlaybackState::Loading => self.play_when_loaded = true,
            PlaybackState::Paused => self.state = PlaybackState::Playing,
            PlaybackState::Ended => {
                self.position = 0.0;
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Playing | PlaybackState::Failed => {}
        }
    }

    pub fn pause(&mut self) {
        match self.state {
            PlaybackState::Playing => self.state = PlaybackState::Paused,
            PlaybackState::Loading => self.play_when_loaded = false,
            _ => {}
        }
    }

    pub fn toggle(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Loading if self.play_when_loaded => self.pause(),
            _ => self.play(),
        }
    }

    /// Jump to `seconds`, clamped into the playable range
    pub fn seek(&mut self, seconds: f64) {
        if self.state == PlaybackState::Failed {
            return;
        }
        self.position = self.clamp(seconds);
        if self.state == PlaybackState::Ended && !self.at_end() {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn seek_by(&mut self, delta: f64) {
        self.seek(self.position + delta);
    }

    /// Periodic position report from the player
    pub fn on_time_update(&mut self, seconds: f64) {
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            self.position = self.clamp(seconds);
            if self.at_end() {
                self.state = PlaybackState::Ended;
            }
        }
    }

    pub fn on_ended(&mut self) {
        if let Some(d) = self.duration {
            self.position = d;
        }
        self.state = PlaybackState::Ended;
    }

    /// The current source failed: move to the next one, keeping the
    /// position, or give up when none are left.
    /// Returns the next URL to try.
    pub fn on_error(&mut self, reason: &str) -> Option<&str> {
        if self.state == PlaybackState::Failed {
            return None;
        }

        if let Some(url) = self.sources.get(self.current) {
            tracing::info!(exercise = %self.exercise_id, "Video source {} failed: {}", url, reason);
            self.failures.push(url.clone());
        }

        let was_playing = matches!(self.state, PlaybackState::Playing)
            || (self.state == PlaybackState::Loading && self.play_when_loaded);

        if self.current + 1 < self.sources.len() {
            self.current += 1;
            self.state = PlaybackState::Loading;
            self.play_when_loaded = was_playing;
            self.duration = None;
            self.sources.get(self.current).map(String::as_str)
        } else {
            self.state = PlaybackState::Failed;
            None
        }
    }

    /// Continue from saved progress; finished videos start over
    pub fn resume_from(&mut self, progress: &ExerciseProgress) {
        if progress.exercise_id != self.exercise_id || progress.completed {
            return;
        }
        self.position = progress.position_seconds.max(0.0);
        if self.duration.is_some() {
            self.position = self.clamp(self.position);
        }
    }

    /// Snapshot to persist as viewing progress
    pub fn progress(&self) -> ExerciseProgress {
        let completed = self.state == PlaybackState::Ended
            || self
                .duration
                .map_or(false, |d| self.position >= d * COMPLETION_THRESHOLD);

        ExerciseProgress {
            exercise_id: self.exercise_id.clone(),
            position_seconds: self.position,
            duration_seconds: self.duration,
            completed,
            updated_at: Utc::now(),
        }
    }

    fn clamp(&self, seconds: f64) -> f64 {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        match self.duration {
            Some(d) => seconds.min(d),
            None => seconds,
        }
    }

    fn at_end(&self) -> bool {
        self.duration.map_or(false, |d| self.position >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PlaybackController {
        PlaybackController::new(
            "ex-1",
            vec![
                "https://cdn/a.mp4".to_string(),
                "https://cdn/b.mp4".to_string(),
                "https://cdn/c.webm".to_string(),
            ],
        )
    }

    #[test]
    fn test_starts_idle_until_requested() {
        let mut c = controller();
        assert_eq!(c.state(), PlaybackState::Idle);

        // Metadata for a source nobody asked for is ignored
        c.on_loaded(30.0);
        c.pause();
        assert_eq!(c.state(), PlaybackState::Idle);
        assert_eq!(c.duration(), None);

        c.load();
        assert_eq!(c.state(), PlaybackState::Loading);
        c.on_loaded(30.0);
        assert_eq!(c.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_play_before_load_starts_after_load() {
        let mut c = controller();
        c.play();
        assert_eq!(c.state(), PlaybackState::Loading);
        c.on_loaded(120.0);
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_toggle_and_seek_clamping() {
        let mut c = controller();
        c.load();
        c.on_loaded(60.0);
        assert_eq!(c.state(), PlaybackState::Paused);

        c.toggle();
        assert_eq!(c.state(), PlaybackState::Playing);
        c.toggle();
        assert_eq!(c.state(), PlaybackState::Paused);

        c.seek(90.0);
        assert_eq!(c.position(), 60.0);
        c.seek(-5.0);
        assert_eq!(c.position(), 0.0);
        c.seek_by(15.0);
        assert_eq!(c.position(), 15.0);
    }

    #[test]
    fn test_fallback_chain_keeps_position() {
        let mut c = controller();
        c.play();
        c.on_loaded(100.0);
        c.on_time_update(42.0);

        assert_eq!(c.on_error("decode error"), Some("https://cdn/b.mp4"));
        assert_eq!(c.state(), PlaybackState::Loading);
        assert_eq!(c.position(), 42.0);
        assert_eq!(c.remaining_sources(), 1);

        // Resumes playing on the fallback
        c.on_loaded(100.0);
        assert_eq!(c.state(), PlaybackState::Playing);
        assert_eq!(c.position(), 42.0);
    }

    #[test]
    fn test_all_sources_failing() {
        let mut c = controller();
        assert!(c.on_error("404").is_some());
        assert!(c.on_error("404").is_some());
        assert!(c.on_error("404").is_none());

        assert_eq!(c.state(), PlaybackState::Failed);
        assert_eq!(c.current_source(), None);
        assert_eq!(c.failed_sources().len(), 3);
        assert!(c.on_error("again").is_none());
    }

    #[test]
    fn test_no_sources_is_failed() {
        let c = PlaybackController::new("ex-2", vec![]);
        assert_eq!(c.state(), PlaybackState::Failed);
        assert_eq!(c.remaining_sources(), 0);
    }

    #[test]
    fn test_ended_and_progress() {
        let mut c = controller();
        c.play();
        c.on_loaded(100.0);
        c.on_time_update(50.0);
        assert!(!c.progress().completed);

        c.on_time_update(95.0);
        assert!(c.progress().completed);

        c.on_time_update(100.0);
        assert_eq!(c.state(), PlaybackState::Ended);

        c.play();
        assert_eq!(c.position(), 0.0);
        assert_eq!(c.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_resume_from_saved_progress() {
        let mut c = controller();
        let mut saved = ExerciseProgress::new("ex-1");
        saved.position_seconds = 30.0;
        c.resume_from(&saved);
        c.load();
        c.on_loaded(20.0);
        // Clamped once the real length is known
        assert_eq!(c.position(), 20.0);

        let mut other = controller();
        let mut done = ExerciseProgress::new("ex-1");
        done.position_seconds = 30.0;
        done.completed = true;
        other.resume_from(&done);
        assert_eq!(other.position(), 0.0);
    }
}
