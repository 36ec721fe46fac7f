//! Vehicle light control hook

use relay_core::Name;
use relay_event::{NativeEvent, VehicleLightControlEvent};

use super::HookPoint;
use crate::controller::{EngineHook, EventController, EventSpec, HookController};
use crate::guard;
use crate::registry::CallbackSystem;

pub const VEHICLE_LIGHT_CONTROL: &str = "Vehicle/LightControl";

/// Relays vehicle light switches as `Vehicle/LightControl`
pub struct VehicleLightControlHook {
    event: Name,
    inner: HookController,
}

impl VehicleLightControlHook {
    pub fn new(hook: Box<dyn EngineHook>) -> Self {
        let inner = HookController::new(
            HookPoint::VehicleLightControl.controller_name(),
            vec![EventSpec::new(VEHICLE_LIGHT_CONTROL, VehicleLightControlEvent::TYPE_NAME)],
            hook,
        );
        Self {
            event: Name::new(VEHICLE_LIGHT_CONTROL),
            inner,
        }
    }

    pub fn on_light_control(&self, system: &CallbackSystem, vehicle: u64, light_type: u32, enabled: bool) {
        guard::contain(self.inner.name(), || {
            let payload = VehicleLightControlEvent::new(vehicle, light_type, enabled);
            system.dispatch_native(self.event.clone(), payload);
        });
    }
}

delegate_controller!(VehicleLightControlHook);
