//! # Game Core
//!
//! The runtime core that the host's frame loop drives.
//!
//! ## Components
//!
//! - [`registry`] - process-wide, type-keyed single-instance holder
//! - [`controller`] - game phase state machine and transition side effects
//! - [`events`] - ordered subscriber list for controller notifications
//! - [`collaborators`] - traits for scene loading, scoring, settings and the host
//! - [`state`] - the [`GameState`] enum
//!
//! ## Dependency order
//!
//! ```text
//! ┌─────────────────────┐
//! │  InstanceRegistry   │ ← owns the shared controller reference
//! └─────────────────────┘
//!          │
//! ┌─────────────────────┐
//! │ GameStateController │ ← state, pause flag, events
//! └─────────────────────┘
//!          │
//! ┌─────────────────────┐
//! │   Collaborators     │ ← scene loader, score stores, host
//! └─────────────────────┘
//! ```

pub mod collaborators;
pub mod controller;
pub mod events;
pub mod registry;
pub mod state;

pub use collaborators::Collaborators;
pub use controller::{ControllerOptions, GameStateController, StatusSnapshot};
pub use events::{GameEvent, GameEventListener, SubscriptionId};
pub use registry::{InstanceRegistry, Placement, Registration};
pub use state::GameState;
