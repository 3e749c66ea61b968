//! # Downhill - game-state core for an endless-runner skiing game
//!
//! Downhill is the engine-independent runtime behind a downhill endless runner:
//! the part of the game that decides *which phase the run is in* and what has to
//! happen when that changes. Rendering, physics and input stay in the host engine.
//!
//! ## Features
//!
//! - **Instance Registry**: one live instance per type, duplicate eviction and shutdown awareness.
//! - **Game State Controller**: MainMenu / Tutorial / Playing / Paused / GameOver with ordered change events.
//! - **Collaborator traits**: scene loading, scoring, high scores, settings and the host process are all optional.
//! - **Threat Gauge**: colour bands with a tick-driven blink in the critical band.
//! - **Decor Scroller**: wrapping background offsets for endless scenery.
//! - **Headless driver**: the `downhill` binary runs scripted sessions without an engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use downhill::config::Config;
//! use downhill::game::{Collaborators, GameState, GameStateController, InstanceRegistry, Placement};
//! use downhill::headless::{HeadlessHost, RunScore};
//!
//! let host = Arc::new(HeadlessHost::new());
//! let collaborators = Collaborators::new()
//!     .with_host(host.clone())
//!     .with_score(Arc::new(RunScore::new()));
//! let controller = GameStateController::from_config(collaborators, &Config::default());
//!
//! let registry = InstanceRegistry::new();
//! let controller = GameStateController::install(&registry, Arc::new(controller), Placement::Root).unwrap();
//! controller.start_new_game();
//! controller.pause_game();
//! assert_eq!(controller.current_state(), GameState::Paused);
//! assert_eq!(host.time_scale(), 0.0);
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - registry, controller, events and collaborator traits
//! - [`hud`] - threat gauge
//! - [`track`] - decor scrolling
//! - [`headless`] - in-process collaborator implementations
//! - [`config`] - configuration loading and validation
//! - [`metrics`] - process-wide counters
//! - [`errors`] - error types

pub mod config;
pub mod errors;
pub mod game;
pub mod headless;
pub mod hud;
pub mod metrics;
pub mod track;
