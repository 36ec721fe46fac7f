//! Entity lifecycle hooks

use relay_core::Name;
use relay_event::{EntityInfo, EntityLifecycleEvent, NativeEvent};

use super::HookPoint;
use crate::controller::{EngineHook, EventController, EventSpec, HookController};
use crate::guard;
use crate::registry::CallbackSystem;

pub const PLAYER_SPAWNED: &str = "Entity/PlayerSpawned";

/// Entity lifecycle stage the engine reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityStage {
    Extract,
    Assemble,
    Attach,
    Detach,
    RequestComponents,
    Uninitialize,
}

impl EntityStage {
    pub const ALL: [EntityStage; 6] = [
        EntityStage::Extract,
        EntityStage::Assemble,
        EntityStage::Attach,
        EntityStage::Detach,
        EntityStage::RequestComponents,
        EntityStage::Uninitialize,
    ];

    /// Event name the stage is delivered under
    pub fn event_name(&self) -> &'static str {
        match self {
            EntityStage::Extract => "Entity/Extract",
            EntityStage::Assemble => "Entity/Assemble",
            EntityStage::Attach => "Entity/Attach",
            EntityStage::Detach => "Entity/Detach",
            EntityStage::RequestComponents => "Entity/RequestComponents",
            EntityStage::Uninitialize => "Entity/Uninitialize",
        }
    }

    pub fn hook_point(&self) -> HookPoint {
        match self {
            EntityStage::Extract => HookPoint::EntityExtract,
            EntityStage::Assemble => HookPoint::EntityAssemble,
            EntityStage::Attach => HookPoint::EntityAttach,
            EntityStage::Detach => HookPoint::EntityDetach,
            EntityStage::RequestComponents => HookPoint::EntityRequestComponents,
            EntityStage::Uninitialize => HookPoint::EntityUninitialize,
        }
    }

    /// Stage for an entity hook point
    pub fn from_hook_point(point: HookPoint) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.hook_point() == point)
    }
}

/// Relays one entity lifecycle stage as `Entity/<Stage>`
pub struct EntityLifecycleHook {
    stage: EntityStage,
    event: Name,
    inner: HookController,
}

impl EntityLifecycleHook {
    pub fn new(stage: EntityStage, hook: Box<dyn EngineHook>) -> Self {
        let event = Name::new(stage.event_name());
        let inner = HookController::new(
            stage.hook_point().controller_name(),
            vec![EventSpec::new(stage.event_name(), EntityLifecycleEvent::TYPE_NAME)],
            hook,
        );
        Self { stage, event, inner }
    }

    pub fn stage(&self) -> EntityStage {
        self.stage
    }

    /// Engine reported `entity` reaching this stage
    pub fn on_entity(&self, system: &CallbackSystem, entity: EntityInfo) {
        guard::contain(self.inner.name(), || {
            system.dispatch_native(self.event.clone(), EntityLifecycleEvent::new(entity));
        });
    }
}

/// Relays `Entity/PlayerSpawned` for the local player outside pre-game
pub struct PlayerSpawnedHook {
    event: Name,
    inner: HookController,
}

impl PlayerSpawnedHook {
    pub fn new(hook: Box<dyn EngineHook>) -> Self {
        let inner = HookController::new(
            HookPoint::PlayerSpawned.controller_name(),
            vec![EventSpec::new(PLAYER_SPAWNED, EntityLifecycleEvent::TYPE_NAME)],
            hook,
        );
        Self {
            event: Name::new(PLAYER_SPAWNED),
            inner,
        }
    }

    /// Engine attached a player entity. Returns whether it was relayed.
    pub fn on_player_attached(&self, system: &CallbackSystem, entity: EntityInfo) -> bool {
        if !entity.is_local_player || system.is_pre_game() {
            return false;
        }
        guard::contain(self.inner.name(), || {
            system.dispatch_native(self.event.clone(), EntityLifecycleEvent::new(entity));
        })
        .is_some()
    }
}

delegate_controller!(EntityLifecycleHook);
delegate_controller!(PlayerSpawnedHook);
