//! Event controllers
//!
//! A controller owns one engine hook point and the event names it feeds. The
//! hook is expensive to keep installed, so it is armed only while at least one
//! of the controller's events has handlers.

use std::collections::HashSet;

use parking_lot::Mutex;
use relay_core::Name;

use crate::error::Result;

/// An event name a controller serves, with its payload type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSpec {
    pub event: Name,
    pub type_name: Name,
}

impl EventSpec {
    pub fn new(event: &str, type_name: &str) -> Self {
        Self {
            event: Name::new(event),
            type_name: Name::new(type_name),
        }
    }
}

/// Engine-level interception point
///
/// `install` and `remove` run with no registry state lock held and may
/// dispatch. They must not register or unregister handlers for the same
/// controller.
pub trait EngineHook: Send + Sync {
    /// Start intercepting
    fn install(&self) -> Result<()>;

    /// Stop intercepting
    fn remove(&self);
}

/// Hook for controllers fed directly by the lifecycle driver
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl EngineHook for NoHook {
    fn install(&self) -> Result<()> {
        Ok(())
    }

    fn remove(&self) {}
}

/// Activation interface the registry drives
pub trait EventController: Send + Sync {
    /// Controller name, used for logging and configuration
    fn name(&self) -> &str;

    /// Events this controller produces
    fn events(&self) -> &[EventSpec];

    /// An event gained its first handler
    fn activate_event(&self, event: &Name);

    /// An event lost its last handler
    fn deactivate_event(&self, event: &Name);

    /// Check if the engine hook is armed
    fn is_active(&self) -> bool;
}

#[derive(Default)]
struct ActivationState {
    active: HashSet<Name>,
    armed: bool,
}

/// Shared activation bookkeeping for a single engine hook
pub struct HookController {
    name: String,
    events: Vec<EventSpec>,
    hook: Box<dyn EngineHook>,
    state: Mutex<ActivationState>,
}

impl HookController {
    pub fn new(name: impl Into<String>, events: Vec<EventSpec>, hook: Box<dyn EngineHook>) -> Self {
        Self {
            name: name.into(),
            events,
            hook,
            state: Mutex::new(ActivationState::default()),
        }
    }

    /// Check if `event` is one of ours
    pub fn serves(&self, event: &Name) -> bool {
        self.events.iter().any(|decl| decl.event == *event)
    }

    /// Number of events that currently have handlers
    pub fn active_events(&self) -> usize {
        self.state.lock().active.len()
    }
}

impl EventController for HookController {
    fn name(&self) -> &str {
        &self.name
    }

    fn events(&self) -> &[EventSpec] {
        &self.events
    }

    fn activate_event(&self, event: &Name) {
        debug_assert!(self.serves(event), "{} does not serve {}", self.name, event);

        let mut state = self.state.lock();
        state.active.insert(event.clone());

        // A failed install is retried on the next activation
        if !state.armed {
            match self.hook.install() {
                Ok(()) => {
                    state.armed = true;
                    log::debug!("Armed hook '{}' for '{}'", self.name, event);
                }
                Err(e) => log::error!("{}", e),
            }
        }
    }

    fn deactivate_event(&self, event: &Name) {
        let mut state = self.state.lock();
        if !state.active.remove(event) || !state.active.is_empty() {
            return;
        }

        if state.armed {
            self.hook.remove();
            state.armed = false;
            log::debug!("Disarmed hook '{}'", self.name);
        }
    }

    fn is_active(&self) -> bool {
        self.state.lock().armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counts {
        installs: AtomicUsize,
        removes: AtomicUsize,
        fail: AtomicBool,
    }

    struct CountingHook(Arc<Counts>);

    impl EngineHook for CountingHook {
        fn install(&self) -> Result<()> {
            if self.0.fail.load(Ordering::SeqCst) {
                return Err(DispatchError::hook_install_failed("test", "refused"));
            }
            self.0.installs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn remove(&self) {
            self.0.removes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn controller(counts: &Arc<Counts>) -> HookController {
        HookController::new(
            "RawInput",
            vec![
                EventSpec::new("Input/Key", "KeyInputEvent"),
                EventSpec::new("Input/Axis", "AxisInputEvent"),
            ],
            Box::new(CountingHook(counts.clone())),
        )
    }

    #[test]
    fn test_hook_armed_once_for_many_events() {
        let counts = Arc::new(Counts::default());
        let controller = controller(&counts);
        let key = Name::new("Input/Key");
        let axis = Name::new("Input/Axis");

        controller.activate_event(&key);
        controller.activate_event(&axis);
        controller.activate_event(&key);
        assert!(controller.is_active());
        assert_eq!(controller.active_events(), 2);
        assert_eq!(counts.installs.load(Ordering::SeqCst), 1);

        controller.deactivate_event(&key);
        assert!(controller.is_active());
        assert_eq!(counts.removes.load(Ordering::SeqCst), 0);

        controller.deactivate_event(&axis);
        controller.deactivate_event(&axis);
        assert!(!controller.is_active());
        assert_eq!(counts.removes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_install_retries() {
        let counts = Arc::new(Counts::default());
        counts.fail.store(true, Ordering::SeqCst);
        let controller = controller(&counts);
        let key = Name::new("Input/Key");

        controller.activate_event(&key);
        assert!(!controller.is_active());

        counts.fail.store(false, Ordering::SeqCst);
        controller.activate_event(&Name::new("Input/Axis"));
        assert!(controller.is_active());

        // Nothing to remove for a hook that was never armed
        controller.deactivate_event(&key);
        controller.deactivate_event(&Name::new("Input/Axis"));
        assert_eq!(counts.removes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_hook() {
        let controller = HookController::new(
            "GameSession",
            vec![EventSpec::new("Session/Start", "GameSessionEvent")],
            Box::new(NoHook),
        );
        controller.activate_event(&Name::new("Session/Start"));
        assert!(controller.is_active());
        assert!(controller.serves(&Name::new("Session/Start")));
        assert!(!controller.serves(&Name::new("Session/End")));
    }
}
