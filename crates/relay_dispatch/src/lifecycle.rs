//! World and session lifecycle
//!
//! Turns engine world/session notifications into `Session/*` events and runs
//! the teardown sweep once a world is fully detached.
//!
//! ```text
//! Unattached --attach--> Attached --prepared--> PreSession --restored--> InSession
//!      ^                                                                   |
//!      +------ after detach ------ Detaching <------ before detach --------+
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use relay_event::GameSessionEvent;

use crate::controllers::{
    SESSION_AFTER_SAVE, SESSION_BEFORE_END, SESSION_BEFORE_SAVE, SESSION_BEFORE_START,
    SESSION_END, SESSION_PAUSE, SESSION_READY, SESSION_RESUME, SESSION_START,
};
use crate::registry::{CallbackSystem, DispatchReport};

/// Where the current world is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No world
    #[default]
    Unattached,
    /// World attached, session not started
    Attached,
    /// Session prepared, not yet playable
    PreSession,
    /// Session running
    InSession,
    /// World is being torn down
    Detaching,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Drives the session events of a [`CallbackSystem`]
pub struct SessionDriver {
    system: Arc<CallbackSystem>,
    state: Mutex<SessionState>,
}

impl SessionDriver {
    pub fn new(system: Arc<CallbackSystem>) -> Self {
        Self {
            system,
            state: Mutex::new(SessionState::Unattached),
        }
    }

    pub fn system(&self) -> &Arc<CallbackSystem> {
        &self.system
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// A world was attached. `pre_game` marks the main menu world.
    pub fn on_world_attached(&self, pre_game: bool) -> DispatchReport {
        self.system.set_pre_game(pre_game);
        self.transition("world attached", &[SessionState::Unattached], SessionState::Attached);
        self.emit(SESSION_BEFORE_START)
    }

    /// A save is about to be loaded into the session
    pub fn on_game_load(&self) {
        self.system.set_restored(true);
        log::debug!("Session is restored from a save");
    }

    pub fn on_game_prepared(&self) -> DispatchReport {
        self.transition("game prepared", &[SessionState::Attached], SessionState::PreSession);
        self.emit(SESSION_START)
    }

    pub fn on_game_restored(&self) -> DispatchReport {
        self.transition(
            "game restored",
            &[SessionState::Attached, SessionState::PreSession],
            SessionState::InSession,
        );
        self.emit(SESSION_READY)
    }

    pub fn on_before_game_save(&self) -> DispatchReport {
        self.emit(SESSION_BEFORE_SAVE)
    }

    pub fn on_after_game_save(&self) -> DispatchReport {
        self.emit(SESSION_AFTER_SAVE)
    }

    pub fn on_game_paused(&self) -> DispatchReport {
        self.emit(SESSION_PAUSE)
    }

    pub fn on_game_resumed(&self) -> DispatchReport {
        self.emit(SESSION_RESUME)
    }

    pub fn on_before_world_detach(&self) -> DispatchReport {
        self.transition(
            "before world detach",
            &[SessionState::Attached, SessionState::PreSession, SessionState::InSession],
            SessionState::Detaching,
        );
        self.emit(SESSION_BEFORE_END)
    }

    pub fn on_world_detached(&self) -> DispatchReport {
        self.emit(SESSION_END)
    }

    /// The world is gone: reset session flags and sweep scoped handlers.
    /// Returns the number of handlers removed.
    pub fn on_after_world_detach(&self) -> usize {
        self.system.set_restored(false);
        self.system.set_pre_game(false);
        self.transition("after world detach", &[SessionState::Detaching], SessionState::Unattached);
        self.system.sweep()
    }

    fn emit(&self, event: &str) -> DispatchReport {
        let payload = GameSessionEvent::new(self.system.is_pre_game(), self.system.is_restored());
        self.system.dispatch_native(event, payload)
    }

    /// The engine does not always report every step, so an unexpected
    /// transition is logged and applied anyway.
    fn transition(&self, step: &str, expected: &[SessionState], next: SessionState) {
        let mut state = self.state.lock();
        if !expected.contains(&state) {
            log::warn!("Unexpected {} while {}", step, *state);
        }
        log::info!("Session {} -> {} ({})", *state, next, step);
        *state = next;
    }
}
