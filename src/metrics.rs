//! Process-wide counters for controller activity.
//! Read by the `status` command and by tests; no exposition endpoint yet.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::game::GameState;

static SCENE_LOADS: AtomicU64 = AtomicU64::new(0);
static DUPLICATES_REJECTED: AtomicU64 = AtomicU64::new(0);
static SCORES_FINALIZED: AtomicU64 = AtomicU64::new(0);

static TRANSITIONS: OnceLock<Mutex<HashMap<GameState, u64>>> = OnceLock::new();

pub fn inc_scene_loads() {
    SCENE_LOADS.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_duplicates_rejected() {
    DUPLICATES_REJECTED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_scores_finalized() {
    SCORES_FINALIZED.fetch_add(1, Ordering::Relaxed);
}

fn transitions_lock() -> &'static Mutex<HashMap<GameState, u64>> {
    TRANSITIONS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Count an effective transition into `state`; returns the new total for it.
pub fn record_transition(state: GameState) -> u64 {
    let mut guard = transitions_lock()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let counter = guard.entry(state).or_default();
    *counter = counter.saturating_add(1);
    *counter
}

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Snapshot {
    pub scene_loads: u64,
    pub duplicates_rejected: u64,
    pub scores_finalized: u64,
    pub transitions: HashMap<GameState, u64>,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        scene_loads: SCENE_LOADS.load(Ordering::Relaxed),
        duplicates_rejected: DUPLICATES_REJECTED.load(Ordering::Relaxed),
        scores_finalized: SCORES_FINALIZED.load(Ordering::Relaxed),
        transitions: transitions_lock()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone(),
    }
}
