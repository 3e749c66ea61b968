//! In-process collaborators for running the game core without an engine.
//!
//! The `simulate` command wires these into a [`GameStateController`]; tests and
//! embedders can use them as reference implementations of the collaborator
//! traits.
//!
//! [`GameStateController`]: crate::game::GameStateController

use anyhow::{anyhow, Result};
use fs2::FileExt;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::game::collaborators::{
    HighScoreStore, HostEnvironment, SceneLoader, ScoreStore, SettingsLoader,
};
use crate::game::{GameState, GameStateController};

/// One step of a scripted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAction {
    NewGame,
    Tutorial,
    Pause,
    Resume,
    MainMenu,
    GameOver,
    Quit,
    /// Raw `set_state` call, written `set:<state>`.
    Set(GameState),
}

impl ScriptAction {
    pub fn apply(&self, controller: &GameStateController) {
        match self {
            ScriptAction::NewGame => controller.start_new_game(),
            ScriptAction::Tutorial => controller.start_tutorial(),
            ScriptAction::Pause => {
                if !controller.pause_game() {
                    info!("pause ignored in {}", controller.current_state());
                }
            }
            ScriptAction::Resume => {
                if !controller.resume_game() {
                    info!("resume ignored in {}", controller.current_state());
                }
            }
            ScriptAction::MainMenu => controller.return_to_main_menu(),
            ScriptAction::GameOver => controller.trigger_game_over(),
            ScriptAction::Quit => controller.quit_game(),
            ScriptAction::Set(state) => {
                if !controller.set_state(*state) {
                    info!("already in {}", state);
                }
            }
        }
    }
}

impl std::str::FromStr for ScriptAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        if let Some(state) = key.strip_prefix("set:") {
            return Ok(ScriptAction::Set(state.parse()?));
        }
        match key.as_str() {
            "new" | "play" => Ok(ScriptAction::NewGame),
            "tutorial" => Ok(ScriptAction::Tutorial),
            "pause" => Ok(ScriptAction::Pause),
            "resume" => Ok(ScriptAction::Resume),
            "menu" => Ok(ScriptAction::MainMenu),
            "over" | "gameover" => Ok(ScriptAction::GameOver),
            "quit" => Ok(ScriptAction::Quit),
            other => Err(anyhow!("Unknown script action '{}'", other)),
        }
    }
}

/// Parse a comma separated action list such as `new,pause,resume,over`.
pub fn parse_script(script: &str) -> Result<Vec<ScriptAction>> {
    script
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Logs every scene request and keeps the history.
#[derive(Debug, Default)]
pub struct LoggingSceneLoader {
    loaded: Mutex<Vec<String>>,
}

impl LoggingSceneLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current(&self) -> Option<String> {
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl SceneLoader for LoggingSceneLoader {
    fn load_scene(&self, name: &str) {
        info!("Loading scene '{}'", name);
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_string());
    }
}

/// Score of the run in progress.
#[derive(Debug, Default)]
pub struct RunScore {
    value: AtomicU64,
}

impl RunScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, points: u64) -> u64 {
        self.value.fetch_add(points, Ordering::Relaxed) + points
    }
}

impl ScoreStore for RunScore {
    fn reset_score(&self) {
        self.value.store(0, Ordering::Relaxed);
    }

    fn current_score(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
struct HighScoreFile {
    scores: Vec<u64>,
}

/// Best scores, highest first, capped at `capacity` entries.
#[derive(Debug)]
pub struct HighScoreTable {
    capacity: usize,
    scores: Mutex<Vec<u64>>,
}

impl HighScoreTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            scores: Mutex::new(Vec::new()),
        }
    }

    /// Load from a JSON file; a missing file yields an empty table.
    pub fn load(path: &Path, capacity: usize) -> Result<Self> {
        let table = Self::new(capacity);
        if !path.exists() {
            return Ok(table);
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read high scores {}: {}", path.display(), e))?;
        let file: HighScoreFile = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse high scores {}: {}", path.display(), e))?;
        for score in file.scores {
            table.insert(score);
        }
        Ok(table)
    }

    /// Like [`HighScoreTable::load`], but an unreadable or corrupt file is
    /// logged and replaced by an empty table.
    pub fn load_or_empty(path: &Path, capacity: usize) -> Self {
        Self::load(path, capacity).unwrap_or_else(|e| {
            warn!("{} (starting with an empty high-score table)", e);
            Self::new(capacity)
        })
    }

    /// Write the table under an exclusive lock via temp file + rename, so an
    /// interrupted save never leaves truncated JSON behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = HighScoreFile {
            scores: self.scores(),
        };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| anyhow!("Failed to serialize high scores: {}", e))?;
        write_file_locked(path, &content)
            .map_err(|e| anyhow!("Failed to write high scores {}: {}", path.display(), e))
    }

    pub fn scores(&self) -> Vec<u64> {
        self.scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn best(&self) -> Option<u64> {
        self.scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .first()
            .copied()
    }

    /// Returns the 1-based rank the score landed on, or `None` if it did not
    /// make the table.
    fn insert(&self, value: u64) -> Option<usize> {
        let mut scores = self.scores.lock().unwrap_or_else(PoisonError::into_inner);
        let pos = scores.partition_point(|&s| s >= value);
        if pos >= self.capacity {
            return None;
        }
        scores.insert(pos, value);
        scores.truncate(self.capacity);
        Some(pos + 1)
    }
}

impl HighScoreStore for HighScoreTable {
    fn add_score(&self, value: u64) {
        match self.insert(value) {
            Some(rank) => info!("Score {} entered the high-score table at #{}", value, rank),
            None => info!("Score {} did not make the high-score table", value),
        }
    }
}

fn write_file_locked(path: &Path, content: &str) -> Result<()> {
    use std::fs::{self, File, OpenOptions};
    use std::io::Write;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    // Lock the destination itself; the temp file is renamed over it.
    let lock_file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(path)?;
    lock_file.lock_exclusive()?;

    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("highscores.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                let _ = tmp.sync_all();
                break candidate;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
            }
            Err(e) => return Err(anyhow!("Failed to create temp file for atomic write: {}", e)),
        }
    };

    fs::rename(&tmp_path, path)?;

    // Persist the rename (best-effort)
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }
    drop(lock_file);
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerSettings {
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub invert_steering: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            music_volume: 0.8,
            sfx_volume: 1.0,
            invert_steering: false,
        }
    }
}

/// Reads [`PlayerSettings`] from a TOML file when asked to.
#[derive(Debug)]
pub struct FileSettingsLoader {
    path: String,
    settings: RwLock<PlayerSettings>,
}

impl FileSettingsLoader {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            settings: RwLock::new(PlayerSettings::default()),
        }
    }

    pub fn settings(&self) -> PlayerSettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn read_file(&self) -> Result<PlayerSettings> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| anyhow!("Failed to read settings {}: {}", self.path, e))?;
        toml::from_str(&content).map_err(|e| anyhow!("Failed to parse settings {}: {}", self.path, e))
    }
}

impl SettingsLoader for FileSettingsLoader {
    fn load_settings(&self) {
        let loaded = match self.read_file() {
            Ok(settings) => {
                info!("Loaded player settings from {}", self.path);
                settings
            }
            Err(e) => {
                warn!("{} (using defaults)", e);
                PlayerSettings::default()
            }
        };
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = loaded;
    }
}

/// Host stand-in for the simulated frame loop.
#[derive(Debug)]
pub struct HeadlessHost {
    time_scale_bits: AtomicU32,
    halted: AtomicBool,
    terminated: AtomicBool,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self {
            time_scale_bits: AtomicU32::new(1.0f32.to_bits()),
            halted: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        }
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_scale(&self) -> f32 {
        f32::from_bits(self.time_scale_bits.load(Ordering::Relaxed))
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Relaxed)
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Relaxed)
    }

    /// The frame loop keeps going until either quit path was taken.
    pub fn should_stop(&self) -> bool {
        self.is_halted() || self.is_terminated()
    }
}

impl HostEnvironment for HeadlessHost {
    fn request_time_scale(&self, value: f32) {
        self.time_scale_bits.store(value.to_bits(), Ordering::Relaxed);
    }

    // The binary owns process exit so it can flush high scores first.
    fn terminate(&self) {
        self.terminated.store(true, Ordering::Relaxed);
    }

    fn halt(&self) {
        self.halted.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_parsing() {
        let actions = parse_script("new, pause,RESUME,,over,quit").unwrap();
        assert_eq!(
            actions,
            vec![
                ScriptAction::NewGame,
                ScriptAction::Pause,
                ScriptAction::Resume,
                ScriptAction::GameOver,
                ScriptAction::Quit
            ]
        );
        assert!(parse_script("new,jump").is_err());
    }

    #[test]
    fn set_action_accepts_state_names() {
        let actions = parse_script("set:Playing,set:game_over, set:menu").unwrap();
        assert_eq!(
            actions,
            vec![
                ScriptAction::Set(GameState::Playing),
                ScriptAction::Set(GameState::GameOver),
                ScriptAction::Set(GameState::MainMenu)
            ]
        );
        let err = parse_script("set:sliding").unwrap_err();
        assert!(err.to_string().contains("sliding"));
    }

    #[test]
    fn high_scores_keep_top_n_descending() {
        let table = HighScoreTable::new(3);
        for s in [500, 1500, 200, 900, 1500, 100] {
            table.add_score(s);
        }
        assert_eq!(table.scores(), vec![1500, 1500, 900]);
        assert_eq!(table.best(), Some(1500));
    }

    #[test]
    fn high_scores_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("scores.json");
        let table = HighScoreTable::new(5);
        table.add_score(42);
        table.add_score(7);
        table.save(&path).unwrap();

        let reloaded = HighScoreTable::load(&path, 1).unwrap();
        assert_eq!(reloaded.scores(), vec![42]);
        let missing = HighScoreTable::load(&dir.path().join("none.json"), 5).unwrap();
        assert!(missing.scores().is_empty());
    }

    #[test]
    fn corrupt_high_score_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("highscores.json");
        std::fs::write(&path, "{\"scores\": [1500, 9").unwrap();

        assert!(HighScoreTable::load(&path, 10).is_err());
        let table = HighScoreTable::load_or_empty(&path, 10);
        assert!(table.scores().is_empty());

        // The next save replaces the damaged file with a readable one.
        table.add_score(1500);
        table.save(&path).unwrap();
        assert_eq!(HighScoreTable::load(&path, 10).unwrap().scores(), vec![1500]);
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("highscores.json");
        let table = HighScoreTable::new(3);
        table.add_score(10);
        table.save(&path).unwrap();
        table.add_score(20);
        table.save(&path).unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["highscores.json"]);
        assert_eq!(HighScoreTable::load(&path, 3).unwrap().scores(), vec![20, 10]);
    }

    #[test]
    fn settings_fall_back_to_defaults() {
        let loader = FileSettingsLoader::new("/nonexistent/settings.toml");
        loader.load_settings();
        assert_eq!(loader.settings(), PlayerSettings::default());
    }

    #[test]
    fn settings_read_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "music_volume = 0.25\ninvert_steering = true\n").unwrap();
        let loader = FileSettingsLoader::new(path.to_str().unwrap());
        loader.load_settings();
        let settings = loader.settings();
        assert_eq!(settings.music_volume, 0.25);
        assert_eq!(settings.sfx_volume, 1.0);
        assert!(settings.invert_steering);
    }

    #[test]
    fn host_tracks_time_scale_and_quit() {
        let host = HeadlessHost::new();
        assert_eq!(host.time_scale(), 1.0);
        host.request_time_scale(0.0);
        assert_eq!(host.time_scale(), 0.0);
        assert!(!host.should_stop());
        host.halt();
        assert!(host.should_stop());
        assert!(!host.is_terminated());
    }

    #[test]
    fn scene_loader_records_history() {
        let loader = LoggingSceneLoader::new();
        loader.load_scene("Gameplay");
        loader.load_scene("GameOver");
        assert_eq!(loader.history(), vec!["Gameplay", "GameOver"]);
        assert_eq!(loader.current().as_deref(), Some("GameOver"));
    }
}
