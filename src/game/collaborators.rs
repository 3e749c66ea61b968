//! Boundary traits for the systems the controller calls into but does not own.
//!
//! Every collaborator is optional. A missing one silently skips the matching
//! side effect; the transition itself still happens.

use std::sync::Arc;

/// Fire-and-forget scene switch.
pub trait SceneLoader: Send + Sync {
    fn load_scene(&self, name: &str);
}

/// Score of the run in progress.
pub trait ScoreStore: Send + Sync {
    fn reset_score(&self);
    fn current_score(&self) -> u64;
}

/// Where finished runs are persisted.
pub trait HighScoreStore: Send + Sync {
    fn add_score(&self, value: u64);
}

pub trait SettingsLoader: Send + Sync {
    fn load_settings(&self);
}

/// The process hosting the game loop.
pub trait HostEnvironment: Send + Sync {
    /// Global time multiplier: 1.0 runs normally, 0.0 freezes simulation time.
    fn request_time_scale(&self, value: f32);
    /// End the process (packaged builds).
    fn terminate(&self);
    /// Stop the development harness without killing the process.
    fn halt(&self);
}

#[derive(Clone, Default)]
pub struct Collaborators {
    pub scene_loader: Option<Arc<dyn SceneLoader>>,
    pub score: Option<Arc<dyn ScoreStore>>,
    pub high_scores: Option<Arc<dyn HighScoreStore>>,
    pub settings: Option<Arc<dyn SettingsLoader>>,
    pub host: Option<Arc<dyn HostEnvironment>>,
}

impl Collaborators {
    /// No collaborators wired; every side effect is skipped.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scene_loader(mut self, loader: Arc<dyn SceneLoader>) -> Self {
        self.scene_loader = Some(loader);
        self
    }

    pub fn with_score(mut self, score: Arc<dyn ScoreStore>) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_high_scores(mut self, store: Arc<dyn HighScoreStore>) -> Self {
        self.high_scores = Some(store);
        self
    }

    pub fn with_settings(mut self, loader: Arc<dyn SettingsLoader>) -> Self {
        self.settings = Some(loader);
        self
    }

    pub fn with_host(mut self, host: Arc<dyn HostEnvironment>) -> Self {
        self.host = Some(host);
        self
    }
}
