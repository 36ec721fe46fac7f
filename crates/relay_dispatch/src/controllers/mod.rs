//! Built-in controllers
//!
//! One controller per engine hook point. Each translates the raw engine
//! callback into named envelopes and hands them to the [`CallbackSystem`].
//! Translation routines are called from engine threads and never unwind.
//!
//! [`CallbackSystem`]: crate::registry::CallbackSystem

/// Forward [`EventController`] to the wrapped `inner` [`HookController`]
///
/// [`EventController`]: crate::controller::EventController
/// [`HookController`]: crate::controller::HookController
macro_rules! delegate_controller {
    ($ty:ty) => {
        impl $crate::controller::EventController for $ty {
            fn name(&self) -> &str {
                $crate::controller::EventController::name(&self.inner)
            }

            fn events(&self) -> &[$crate::controller::EventSpec] {
                $crate::controller::EventController::events(&self.inner)
            }

            fn activate_event(&self, event: &relay_core::Name) {
                $crate::controller::EventController::activate_event(&self.inner, event)
            }

            fn deactivate_event(&self, event: &relay_core::Name) {
                $crate::controller::EventController::deactivate_event(&self.inner, event)
            }

            fn is_active(&self) -> bool {
                $crate::controller::EventController::is_active(&self.inner)
            }
        }
    };
}

mod entity;
mod input;
mod resource;
mod session;
mod vehicle;

pub use entity::{EntityLifecycleHook, EntityStage, PlayerSpawnedHook, PLAYER_SPAWNED};
pub use input::{RawInputHook, INPUT_AXIS, INPUT_KEY};
pub use resource::{ResourceLoadHook, ResourceReadyHook, RESOURCE_LOAD, RESOURCE_POST_LOAD, RESOURCE_READY};
pub use session::*;
pub use vehicle::{VehicleLightControlHook, VEHICLE_LIGHT_CONTROL};

use crate::controller::EngineHook;

/// Engine interception points the built-in controllers wrap
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    EntityExtract = 0,
    EntityAssemble = 1,
    EntityAttach = 2,
    EntityDetach = 3,
    EntityRequestComponents = 4,
    EntityUninitialize = 5,
    PlayerSpawned = 6,
    RawInput = 7,
    ResourceLoad = 8,
    ResourceReady = 9,
    VehicleLightControl = 10,
}

impl HookPoint {
    pub const ALL: [HookPoint; 11] = [
        HookPoint::EntityExtract,
        HookPoint::EntityAssemble,
        HookPoint::EntityAttach,
        HookPoint::EntityDetach,
        HookPoint::EntityRequestComponents,
        HookPoint::EntityUninitialize,
        HookPoint::PlayerSpawned,
        HookPoint::RawInput,
        HookPoint::ResourceLoad,
        HookPoint::ResourceReady,
        HookPoint::VehicleLightControl,
    ];

    /// Decode a raw hook id
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Name of the controller wrapping this hook
    pub fn controller_name(&self) -> &'static str {
        match self {
            HookPoint::EntityExtract => "EntityExtract",
            HookPoint::EntityAssemble => "EntityAssemble",
            HookPoint::EntityAttach => "EntityAttach",
            HookPoint::EntityDetach => "EntityDetach",
            HookPoint::EntityRequestComponents => "EntityRequestComponents",
            HookPoint::EntityUninitialize => "EntityUninitialize",
            HookPoint::PlayerSpawned => "PlayerSpawned",
            HookPoint::RawInput => "RawInput",
            HookPoint::ResourceLoad => "ResourceLoad",
            HookPoint::ResourceReady => "ResourceReady",
            HookPoint::VehicleLightControl => "VehicleLightControl",
        }
    }
}

/// Creates the engine hook for a hook point
pub trait HookFactory {
    fn create_hook(&self, point: HookPoint) -> Box<dyn EngineHook>;
}

impl<F> HookFactory for F
where
    F: Fn(HookPoint) -> Box<dyn EngineHook>,
{
    fn create_hook(&self, point: HookPoint) -> Box<dyn EngineHook> {
        self(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_point_codes() {
        for (index, point) in HookPoint::ALL.iter().enumerate() {
            assert_eq!(*point as u32, index as u32);
            assert_eq!(HookPoint::from_raw(index as u32), Some(*point));
        }
        assert_eq!(HookPoint::from_raw(11), None);
    }
}
