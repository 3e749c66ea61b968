use log::{debug, info};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::collaborators::Collaborators;
use super::events::{EventBus, GameEvent, GameEventListener, SubscriptionId};
use super::registry::{InstanceRegistry, Placement};
use super::state::GameState;
use crate::config::{Config, RunMode, SceneNames};
use crate::metrics;

/// # Game State Controller
///
/// Owns the authoritative game phase and drives the side effects of phase
/// changes. One controller is shared through the [`InstanceRegistry`]; UI code
/// subscribes to its [`GameEvent`]s.
///
/// ## Transitions
///
/// Every change goes through [`GameStateController::set_state`]:
///
/// 1. the new state and the paused flag are committed together;
/// 2. [`GameEvent::StateChanged`] is delivered to every subscriber;
/// 3. state-specific side effects run (time scale, score finalisation).
///
/// Requesting the current state again is a no-op. There is no rollback: a side
/// effect that misbehaves leaves the committed state in place.
///
/// ## Usage
///
/// ```rust
/// use std::sync::Arc;
/// use downhill::game::{Collaborators, GameState, GameStateController, InstanceRegistry};
/// use downhill::game::registry::Placement;
/// use downhill::config::Config;
///
/// let registry = InstanceRegistry::new();
/// let controller = GameStateController::from_config(Collaborators::new(), &Config::default());
/// let controller = GameStateController::install(&registry, Arc::new(controller), Placement::Root)
///     .expect("first controller is accepted");
///
/// controller.start_new_game();
/// assert!(controller.pause_game());
/// assert!(controller.is_paused());
/// assert_eq!(
///     registry.get_instance::<GameStateController>().unwrap().current_state(),
///     GameState::Paused
/// );
/// ```
pub struct GameStateController {
    state: Mutex<PhaseState>,
    events: EventBus,
    collaborators: Collaborators,
    options: ControllerOptions,
    settings_loaded: AtomicBool,
}

#[derive(Debug, Clone, Copy)]
struct PhaseState {
    current: GameState,
    paused: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    pub scenes: SceneNames,
    pub run_mode: RunMode,
}

/// Point-in-time view of the controller, used by the CLI `status` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub state: GameState,
    pub paused: bool,
}

impl GameStateController {
    pub fn new(collaborators: Collaborators, options: ControllerOptions) -> Self {
        GameStateController {
            state: Mutex::new(PhaseState {
                current: GameState::MainMenu,
                paused: false,
            }),
            events: EventBus::new(),
            collaborators,
            options,
            settings_loaded: AtomicBool::new(false),
        }
    }

    pub fn from_config(collaborators: Collaborators, config: &Config) -> Self {
        Self::new(
            collaborators,
            ControllerOptions {
                scenes: config.scenes.clone(),
                run_mode: config.game.run_mode,
            },
        )
    }

    /// Startup hook: claim the registry slot, then run [`Self::start`].
    ///
    /// Returns `None` when another controller already owns the slot; the caller
    /// should drop `controller`.
    pub fn install(
        registry: &InstanceRegistry,
        controller: Arc<Self>,
        placement: Placement,
    ) -> Option<Arc<Self>> {
        if !registry.register(&controller, placement).is_accepted() {
            return None;
        }
        controller.start();
        Some(controller)
    }

    /// Teardown hook. Only the registered controller clears the slot.
    pub fn teardown(registry: &InstanceRegistry, controller: &Arc<Self>) -> bool {
        registry.unregister(controller)
    }

    /// Loads player settings once per controller.
    pub fn start(&self) {
        if self.settings_loaded.swap(true, Ordering::SeqCst) {
            return;
        }
        match &self.collaborators.settings {
            Some(loader) => loader.load_settings(),
            None => debug!("No settings loader; keeping defaults"),
        }
    }

    pub fn current_state(&self) -> GameState {
        self.phase().current
    }

    pub fn is_paused(&self) -> bool {
        self.phase().paused
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let phase = self.phase();
        StatusSnapshot {
            state: phase.current,
            paused: phase.paused,
        }
    }

    pub fn subscribe(&self, listener: Arc<dyn GameEventListener>) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Returns true when the state actually changed.
    pub fn set_state(&self, new_state: GameState) -> bool {
        self.transition(None, new_state)
    }

    pub fn start_new_game(&self) {
        match &self.collaborators.score {
            Some(score) => score.reset_score(),
            None => debug!("No score store; skipping score reset"),
        }
        self.set_state(GameState::Playing);
        self.load_scene(&self.options.scenes.gameplay);
    }

    pub fn start_tutorial(&self) {
        self.set_state(GameState::Tutorial);
        self.load_scene(&self.options.scenes.tutorial);
    }

    /// Only valid while playing; otherwise silently ignored.
    pub fn pause_game(&self) -> bool {
        if !self.transition(Some(GameState::Playing), GameState::Paused) {
            return false;
        }
        self.events.emit(GameEvent::Paused);
        true
    }

    /// Only valid while paused; otherwise silently ignored.
    pub fn resume_game(&self) -> bool {
        if !self.transition(Some(GameState::Paused), GameState::Playing) {
            return false;
        }
        self.events.emit(GameEvent::Resumed);
        true
    }

    pub fn return_to_main_menu(&self) {
        self.set_state(GameState::MainMenu);
        self.load_scene(&self.options.scenes.main_menu);
    }

    pub fn trigger_game_over(&self) {
        self.set_state(GameState::GameOver);
        self.load_scene(&self.options.scenes.game_over);
    }

    pub fn quit_game(&self) {
        let Some(host) = &self.collaborators.host else {
            debug!("No host environment; quit request dropped");
            return;
        };
        match self.options.run_mode {
            RunMode::Harness => {
                info!("Quit requested; halting harness");
                host.halt();
            }
            RunMode::Packaged => {
                info!("Quit requested; terminating");
                host.terminate();
            }
        }
    }

    /// Commit `new_state` if it differs from the current one and, when
    /// `required` is set, only if the current state matches it. The check and
    /// the commit share one critical section.
    fn transition(&self, required: Option<GameState>, new_state: GameState) -> bool {
        let previous = {
            let mut phase = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if required.is_some_and(|r| r != phase.current) || phase.current == new_state {
                return false;
            }
            let previous = phase.current;
            phase.current = new_state;
            phase.paused = new_state == GameState::Paused;
            previous
        };

        info!("Game state {} -> {}", previous, new_state);
        metrics::record_transition(new_state);
        self.events.emit(GameEvent::StateChanged(new_state));
        self.apply_side_effects(new_state);
        true
    }

    fn apply_side_effects(&self, state: GameState) {
        match state {
            GameState::Playing => self.request_time_scale(1.0),
            GameState::Paused => self.request_time_scale(0.0),
            GameState::GameOver => {
                self.request_time_scale(0.0);
                self.finalize_score();
            }
            GameState::MainMenu | GameState::Tutorial => {}
        }
    }

    fn finalize_score(&self) {
        let (Some(score), Some(high_scores)) =
            (&self.collaborators.score, &self.collaborators.high_scores)
        else {
            debug!("Score or high-score store missing; final score not saved");
            return;
        };
        let value = score.current_score();
        high_scores.add_score(value);
        metrics::inc_scores_finalized();
        info!("Final score {} submitted", value);
    }

    fn request_time_scale(&self, value: f32) {
        if let Some(host) = &self.collaborators.host {
            host.request_time_scale(value);
        }
    }

    fn load_scene(&self, name: &str) {
        match &self.collaborators.scene_loader {
            Some(loader) => {
                loader.load_scene(name);
                metrics::inc_scene_loads();
            }
            None => debug!("No scene loader; '{}' not loaded", name),
        }
    }

    fn phase(&self) -> PhaseState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
