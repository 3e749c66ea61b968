//! Test utilities & fixtures.
//! Recording collaborators that let tests observe every side effect the
//! controller triggers.
#![allow(dead_code)] // each test binary uses a different subset

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use downhill::config::{Config, RunMode};
use downhill::game::collaborators::{
    HighScoreStore, HostEnvironment, SceneLoader, ScoreStore, SettingsLoader,
};
use downhill::game::{Collaborators, GameEvent, GameStateController, SubscriptionId};

#[derive(Default)]
pub struct RecordingScenes {
    pub loads: Mutex<Vec<String>>,
}

impl RecordingScenes {
    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.loads().iter().filter(|n| n.as_str() == name).count()
    }
}

impl SceneLoader for RecordingScenes {
    fn load_scene(&self, name: &str) {
        self.loads.lock().unwrap().push(name.to_string());
    }
}

#[derive(Default)]
pub struct FixedScore {
    pub value: AtomicU64,
    pub resets: AtomicUsize,
}

impl FixedScore {
    pub fn with_value(value: u64) -> Self {
        Self {
            value: AtomicU64::new(value),
            resets: AtomicUsize::new(0),
        }
    }
}

impl ScoreStore for FixedScore {
    fn reset_score(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }

    fn current_score(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingHighScores {
    pub added: Mutex<Vec<u64>>,
}

impl RecordingHighScores {
    pub fn added(&self) -> Vec<u64> {
        self.added.lock().unwrap().clone()
    }
}

impl HighScoreStore for RecordingHighScores {
    fn add_score(&self, value: u64) {
        self.added.lock().unwrap().push(value);
    }
}

#[derive(Default)]
pub struct CountingSettings {
    pub loads: AtomicUsize,
}

impl SettingsLoader for CountingSettings {
    fn load_settings(&self) {
        self.loads.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    TimeScale(f32),
    Terminate,
    Halt,
}

#[derive(Default)]
pub struct RecordingHost {
    pub calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_time_scale(&self) -> Option<f32> {
        self.calls().iter().rev().find_map(|c| match c {
            HostCall::TimeScale(v) => Some(*v),
            _ => None,
        })
    }
}

impl HostEnvironment for RecordingHost {
    fn request_time_scale(&self, value: f32) {
        self.calls.lock().unwrap().push(HostCall::TimeScale(value));
    }

    fn terminate(&self) {
        self.calls.lock().unwrap().push(HostCall::Terminate);
    }

    fn halt(&self) {
        self.calls.lock().unwrap().push(HostCall::Halt);
    }
}

/// A controller wired to recording collaborators, plus handles to inspect them.
pub struct Rig {
    pub controller: Arc<GameStateController>,
    pub scenes: Arc<RecordingScenes>,
    pub score: Arc<FixedScore>,
    pub high_scores: Arc<RecordingHighScores>,
    pub settings: Arc<CountingSettings>,
    pub host: Arc<RecordingHost>,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_run_mode(RunMode::Packaged)
    }

    pub fn with_run_mode(run_mode: RunMode) -> Self {
        let scenes = Arc::new(RecordingScenes::default());
        let score = Arc::new(FixedScore::with_value(1500));
        let high_scores = Arc::new(RecordingHighScores::default());
        let settings = Arc::new(CountingSettings::default());
        let host = Arc::new(RecordingHost::default());
        let collaborators = Collaborators::new()
            .with_scene_loader(scenes.clone())
            .with_score(score.clone())
            .with_high_scores(high_scores.clone())
            .with_settings(settings.clone())
            .with_host(host.clone());
        let mut config = Config::default();
        config.game.run_mode = run_mode;
        let controller = Arc::new(GameStateController::from_config(collaborators, &config));
        Rig {
            controller,
            scenes,
            score,
            high_scores,
            settings,
            host,
        }
    }
}

/// Subscribe a listener that records every event it sees.
pub fn record_events(controller: &GameStateController) -> (Arc<Mutex<Vec<GameEvent>>>, SubscriptionId) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = controller.subscribe(Arc::new(move |event: &GameEvent| {
        sink.lock().unwrap().push(*event);
    }));
    (seen, id)
}
