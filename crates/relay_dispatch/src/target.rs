//! Handler targets
//!
//! A target narrows which envelopes reach a handler, e.g. only lifecycle
//! events of one entity or only one key. A handler with several targets is
//! invoked only when every target accepts the envelope. A target never
//! accepts a payload type it does not understand.

use std::fmt;

use relay_event::{AxisInputEvent, EntityLifecycleEvent, EventEnvelope, KeyAction, KeyInputEvent, ResourceEvent};

/// Filter applied to envelopes before invoking a handler
pub trait EventTarget: Send + Sync + fmt::Debug {
    /// Check whether the envelope should reach the handler
    fn matches(&self, envelope: &EventEnvelope) -> bool;
}

/// Matches entity lifecycle events by entity id and/or class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTarget {
    pub entity_id: Option<u64>,
    pub class_name: Option<String>,
}

impl EntityTarget {
    /// Match a single entity
    pub fn id(entity_id: u64) -> Self {
        Self {
            entity_id: Some(entity_id),
            class_name: None,
        }
    }

    /// Match every entity of a class
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            entity_id: None,
            class_name: Some(class_name.into()),
        }
    }

    /// Also require a class
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }
}

impl EventTarget for EntityTarget {
    fn matches(&self, envelope: &EventEnvelope) -> bool {
        let Some(event) = envelope.downcast_ref::<EntityLifecycleEvent>() else {
            return false;
        };
        self.entity_id.map_or(true, |id| event.entity.id == id)
            && self
                .class_name
                .as_deref()
                .map_or(true, |class| event.entity.class_name == class)
    }
}

/// Matches key events by key and/or action, axis events by axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputTarget {
    pub key: Option<u32>,
    pub action: Option<KeyAction>,
}

impl InputTarget {
    /// Match a key (or axis) code
    pub fn key(key: u32) -> Self {
        Self {
            key: Some(key),
            action: None,
        }
    }

    /// Match an action on any key
    pub fn action(action: KeyAction) -> Self {
        Self {
            key: None,
            action: Some(action),
        }
    }

    /// Also require an action
    pub fn with_action(mut self, action: KeyAction) -> Self {
        self.action = Some(action);
        self
    }
}

impl EventTarget for InputTarget {
    fn matches(&self, envelope: &EventEnvelope) -> bool {
        if let Some(event) = envelope.downcast_ref::<KeyInputEvent>() {
            return self.key.map_or(true, |key| event.key == key)
                && self.action.map_or(true, |action| event.action == action);
        }
        if let Some(event) = envelope.downcast_ref::<AxisInputEvent>() {
            // Axes have no action
            return self.action.is_none() && self.key.map_or(true, |key| event.axis == key);
        }
        false
    }
}

/// Matches resource events for one depot path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTarget {
    path: String,
}

impl ResourceTarget {
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_path(path),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl EventTarget for ResourceTarget {
    fn matches(&self, envelope: &EventEnvelope) -> bool {
        envelope
            .downcast_ref::<ResourceEvent>()
            .map_or(false, |event| normalize_path(&event.path) == self.path)
    }
}

/// Depot paths are case-insensitive and accept either separator
fn normalize_path(path: &str) -> String {
    path.trim()
        .chars()
        .map(|c| if c == '/' { '\\' } else { c.to_ascii_lowercase() })
        .collect()
}
