//! Scripting bridge
//!
//! The dispatch core decides whether and with what to call; the bridge is how
//! the call crosses into scripted code.

use relay_core::{Name, ObjectRef};
use relay_event::EventEnvelope;

use crate::error::Result;

/// Call mechanism into the scripting layer
pub trait ScriptBridge: Send + Sync {
    /// Call `function` on a live object
    fn invoke_virtual(&self, object: &ObjectRef, function: &Name, event: &EventEnvelope) -> Result<()>;

    /// Call a static `function` scoped to `type_name`
    fn invoke_static(&self, type_name: &Name, function: &Name, event: &EventEnvelope) -> Result<()>;
}
