//! Native event payloads
//!
//! Payloads produced by the built-in controllers. Each maps to one engine-side
//! type name.

use serde::{Deserialize, Serialize};

use crate::NativeEvent;

/// Session state change (world attach/detach, save, load, pause)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSessionEvent {
    /// Main menu / pre-gameplay world
    pub is_pre_game: bool,
    /// Session was loaded from a save
    pub is_restored: bool,
}

impl GameSessionEvent {
    pub fn new(is_pre_game: bool, is_restored: bool) -> Self {
        Self {
            is_pre_game,
            is_restored,
        }
    }
}

impl NativeEvent for GameSessionEvent {
    const TYPE_NAME: &'static str = "GameSessionEvent";
}

/// Engine entity as seen by lifecycle hooks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    /// Entity ID
    pub id: u64,
    /// Runtime class of the entity
    pub class_name: String,
    /// Whether this is the local player
    pub is_local_player: bool,
}

impl EntityInfo {
    /// Create a new entity description
    pub fn new(id: u64, class_name: impl Into<String>) -> Self {
        Self {
            id,
            class_name: class_name.into(),
            is_local_player: false,
        }
    }

    /// Mark as the local player
    pub fn local_player(mut self) -> Self {
        self.is_local_player = true;
        self
    }
}

/// Entity passed through a lifecycle stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLifecycleEvent {
    pub entity: EntityInfo,
}

impl EntityLifecycleEvent {
    pub fn new(entity: EntityInfo) -> Self {
        Self { entity }
    }
}

impl NativeEvent for EntityLifecycleEvent {
    const TYPE_NAME: &'static str = "EntityLifecycleEvent";
}

/// Key state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    Press,
    Release,
    Hold,
}

impl KeyAction {
    /// Decode the engine's action code
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Press),
            1 => Some(Self::Release),
            2 => Some(Self::Hold),
            _ => None,
        }
    }
}

/// Raw keyboard/button input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInputEvent {
    /// Engine key code
    pub key: u32,
    pub action: KeyAction,
}

impl KeyInputEvent {
    pub fn new(key: u32, action: KeyAction) -> Self {
        Self { key, action }
    }
}

impl NativeEvent for KeyInputEvent {
    const TYPE_NAME: &'static str = "KeyInputEvent";
}

/// Raw analog input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisInputEvent {
    /// Engine axis code
    pub axis: u32,
    pub value: f32,
}

impl AxisInputEvent {
    pub fn new(axis: u32, value: f32) -> Self {
        Self { axis, value }
    }
}

impl NativeEvent for AxisInputEvent {
    const TYPE_NAME: &'static str = "AxisInputEvent";
}

/// Resource load progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEvent {
    /// Depot path of the resource
    pub path: String,
}

impl ResourceEvent {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl NativeEvent for ResourceEvent {
    const TYPE_NAME: &'static str = "ResourceEvent";
}

/// Vehicle lights switched by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleLightControlEvent {
    /// Vehicle entity ID
    pub vehicle: u64,
    /// Engine light type mask (head, tail, brake, ...)
    pub light_type: u32,
    pub enabled: bool,
}

impl VehicleLightControlEvent {
    pub fn new(vehicle: u64, light_type: u32, enabled: bool) -> Self {
        Self {
            vehicle,
            light_type,
            enabled,
        }
    }
}

impl NativeEvent for VehicleLightControlEvent {
    const TYPE_NAME: &'static str = "VehicleLightControlEvent";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_action_codes() {
        assert_eq!(KeyAction::from_raw(0), Some(KeyAction::Press));
        assert_eq!(KeyAction::from_raw(2), Some(KeyAction::Hold));
        assert_eq!(KeyAction::from_raw(9), None);
    }

    #[test]
    fn test_entity_builder() {
        let entity = EntityInfo::new(7, "PlayerPuppet").local_player();
        assert_eq!(entity.id, 7);
        assert!(entity.is_local_player);
        assert!(!EntityInfo::new(8, "NPCPuppet").is_local_player);
    }
}
