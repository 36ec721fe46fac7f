//! Session events
//!
//! Session events come from the lifecycle driver rather than an engine hook,
//! so the controller only declares them.

use relay_event::{GameSessionEvent, NativeEvent};

use crate::controller::{EventSpec, HookController, NoHook};

pub const SESSION_BEFORE_START: &str = "Session/BeforeStart";
pub const SESSION_START: &str = "Session/Start";
pub const SESSION_READY: &str = "Session/Ready";
pub const SESSION_BEFORE_SAVE: &str = "Session/BeforeSave";
pub const SESSION_AFTER_SAVE: &str = "Session/AfterSave";
pub const SESSION_PAUSE: &str = "Session/Pause";
pub const SESSION_RESUME: &str = "Session/Resume";
pub const SESSION_BEFORE_END: &str = "Session/BeforeEnd";
pub const SESSION_END: &str = "Session/End";

const SESSION_EVENTS: [&str; 9] = [
    SESSION_BEFORE_START,
    SESSION_START,
    SESSION_READY,
    SESSION_BEFORE_SAVE,
    SESSION_AFTER_SAVE,
    SESSION_PAUSE,
    SESSION_RESUME,
    SESSION_BEFORE_END,
    SESSION_END,
];

/// Declares the `Session/*` events
pub struct GameSessionController {
    inner: HookController,
}

impl GameSessionController {
    pub fn new() -> Self {
        let events = SESSION_EVENTS
            .iter()
            .map(|event| EventSpec::new(event, GameSessionEvent::TYPE_NAME))
            .collect();
        Self {
            inner: HookController::new("GameSession", events, Box::new(NoHook)),
        }
    }
}

impl Default for GameSessionController {
    fn default() -> Self {
        Self::new()
    }
}

delegate_controller!(GameSessionController);
