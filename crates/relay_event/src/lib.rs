//! # relay_event - Event Envelopes
//!
//! Every dispatch carries an [`EventEnvelope`]: a payload plus the name it is
//! being delivered under. The name is separate from the payload's static type
//! so one payload type can be routed under several logical names.
//!
//! Payloads are erased behind [`EventPayload`]. Handlers downcast to the
//! concrete type they expect; the scripting bridge marshals through JSON.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use relay_core::Name;
use serde::Serialize;

pub mod events;

pub use events::*;

/// Erased event payload
pub trait EventPayload: Any + Send + Sync + fmt::Debug {
    /// Get as Any reference (for downcasting)
    fn as_any(&self) -> &dyn Any;

    /// Marshal the payload fields for the scripting side
    fn to_json(&self) -> serde_json::Value;
}

impl<T: Serialize + fmt::Debug + Send + Sync + 'static> EventPayload for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A payload type with a fixed engine-side type name
pub trait NativeEvent: Serialize + fmt::Debug + Send + Sync + 'static {
    /// Type name the payload is declared under
    const TYPE_NAME: &'static str;

    /// Get the type name as a [`Name`]
    fn type_name() -> Name {
        Name::new(Self::TYPE_NAME)
    }
}

/// Event envelope containing the delivery name and the payload
#[derive(Clone)]
pub struct EventEnvelope {
    event_name: Name,
    type_name: Name,
    payload: Arc<dyn EventPayload>,
}

impl EventEnvelope {
    /// Create an envelope for a payload of the given type.
    /// The event name starts out as the type name.
    pub fn new(type_name: impl Into<Name>, payload: impl EventPayload) -> Self {
        let type_name = type_name.into();
        Self {
            event_name: type_name.clone(),
            type_name,
            payload: Arc::new(payload),
        }
    }

    /// Create an envelope from a native payload
    pub fn from_event<E: NativeEvent>(event: E) -> Self {
        Self::new(E::type_name(), event)
    }

    /// Create an envelope from a native payload, delivered under `event_name`
    pub fn named<E: NativeEvent>(event_name: impl Into<Name>, event: E) -> Self {
        let mut envelope = Self::from_event(event);
        envelope.event_name = event_name.into();
        envelope
    }

    /// Name the envelope is currently delivered under
    #[inline]
    pub fn event_name(&self) -> &Name {
        &self.event_name
    }

    /// Change the delivery name
    #[inline]
    pub fn set_event_name(&mut self, name: impl Into<Name>) {
        self.event_name = name.into();
    }

    /// Static type name of the payload
    #[inline]
    pub fn type_name(&self) -> &Name {
        &self.type_name
    }

    /// Get the erased payload
    pub fn payload(&self) -> &dyn EventPayload {
        self.payload.as_ref()
    }

    /// Try to downcast the payload
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.as_any().downcast_ref::<T>()
    }

    /// Marshal the payload
    pub fn to_json(&self) -> serde_json::Value {
        self.payload.to_json()
    }
}

impl fmt::Debug for EventEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEnvelope")
            .field("event_name", &self.event_name)
            .field("type_name", &self.type_name)
            .field("payload", &self.payload)
            .finish()
    }
}

/// Prelude
pub mod prelude {
    pub use crate::events::*;
    pub use crate::{EventEnvelope, EventPayload, NativeEvent};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_starts_with_type_name() {
        let envelope = EventEnvelope::from_event(ResourceEvent::new("base/a.ent"));
        assert_eq!(envelope.event_name(), &Name::new(ResourceEvent::TYPE_NAME));
        assert_eq!(envelope.type_name(), envelope.event_name());
    }

    #[test]
    fn test_rename_keeps_type() {
        let mut envelope = EventEnvelope::named("Resource/Load", ResourceEvent::new("base/a.ent"));
        assert_eq!(envelope.event_name(), &"Resource/Load");

        envelope.set_event_name("Resource/Ready");
        assert_eq!(envelope.event_name(), &"Resource/Ready");
        assert_eq!(envelope.type_name(), &"ResourceEvent");
    }

    #[test]
    fn test_downcast_and_json() {
        let envelope = EventEnvelope::from_event(GameSessionEvent::new(true, false));
        let session = envelope.downcast_ref::<GameSessionEvent>().unwrap();
        assert!(session.is_pre_game);
        assert!(envelope.downcast_ref::<ResourceEvent>().is_none());
        assert_eq!(
            envelope.to_json(),
            json!({ "is_pre_game": true, "is_restored": false })
        );
    }

    #[test]
    fn test_script_payload() {
        let envelope = EventEnvelope::new("QuestEvent", json!({ "phase": 3 }));
        assert_eq!(envelope.type_name(), &"QuestEvent");
        assert_eq!(envelope.to_json()["phase"], 3);
    }

    #[test]
    fn test_clones_share_payload() {
        let a = EventEnvelope::from_event(KeyInputEvent::new(32, KeyAction::Press));
        let mut b = a.clone();
        b.set_event_name("Input/Key");
        assert_eq!(a.event_name(), &"KeyInputEvent");
        assert_eq!(b.downcast_ref::<KeyInputEvent>().unwrap().key, 32);
    }
}
