//! Raw input hook

use relay_core::Name;
use relay_event::{AxisInputEvent, KeyAction, KeyInputEvent, NativeEvent};

use super::HookPoint;
use crate::controller::{EngineHook, EventController, EventSpec, HookController};
use crate::guard;
use crate::registry::CallbackSystem;

pub const INPUT_KEY: &str = "Input/Key";
pub const INPUT_AXIS: &str = "Input/Axis";

/// Fans raw input out to `Input/Key` and `Input/Axis`
pub struct RawInputHook {
    key_event: Name,
    axis_event: Name,
    inner: HookController,
}

impl RawInputHook {
    pub fn new(hook: Box<dyn EngineHook>) -> Self {
        let inner = HookController::new(
            HookPoint::RawInput.controller_name(),
            vec![
                EventSpec::new(INPUT_KEY, KeyInputEvent::TYPE_NAME),
                EventSpec::new(INPUT_AXIS, AxisInputEvent::TYPE_NAME),
            ],
            hook,
        );
        Self {
            key_event: Name::new(INPUT_KEY),
            axis_event: Name::new(INPUT_AXIS),
            inner,
        }
    }

    /// Key press, release or repeat. Unknown action codes are dropped.
    pub fn on_key(&self, system: &CallbackSystem, key: u32, raw_action: u8) {
        let Some(action) = KeyAction::from_raw(raw_action) else {
            log::warn!("Dropping key {} with unknown action {}", key, raw_action);
            return;
        };
        guard::contain(self.inner.name(), || {
            system.dispatch_native(self.key_event.clone(), KeyInputEvent::new(key, action));
        });
    }

    /// Axis movement
    pub fn on_axis(&self, system: &CallbackSystem, axis: u32, value: f32) {
        guard::contain(self.inner.name(), || {
            system.dispatch_native(self.axis_event.clone(), AxisInputEvent::new(axis, value));
        });
    }
}

delegate_controller!(RawInputHook);
