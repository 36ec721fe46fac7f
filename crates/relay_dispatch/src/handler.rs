//! Callback handlers
//!
//! A handler is one registration: who to call, which function, and for how
//! long. The registry owns handlers; handlers only hold weak references to
//! the objects they call into.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use relay_core::{Name, ObjectRef, WeakObject};
use relay_event::EventEnvelope;

use crate::bridge::ScriptBridge;
use crate::error::Result;
use crate::target::EventTarget;

/// Shared reference to a registered handler
pub type HandlerRef = Arc<CallbackHandler>;

/// What a handler calls into
#[derive(Clone)]
pub enum CallbackTarget {
    /// Method on a scriptable object
    Object(WeakObject),
    /// Static function on a type
    Static(Name),
}

impl CallbackTarget {
    /// Target an object
    pub fn object(object: &ObjectRef) -> Self {
        CallbackTarget::Object(WeakObject::new(object))
    }

    /// Target a type
    pub fn static_type(type_name: impl Into<Name>) -> Self {
        CallbackTarget::Static(type_name.into())
    }

    /// Check if two targets denote the same object or type
    pub fn same_as(&self, other: &CallbackTarget) -> bool {
        match (self, other) {
            (CallbackTarget::Object(a), CallbackTarget::Object(b)) => a.same_object(b),
            (CallbackTarget::Static(a), CallbackTarget::Static(b)) => a == b,
            _ => false,
        }
    }

    /// Check if this is an object target
    pub fn is_object(&self) -> bool {
        matches!(self, CallbackTarget::Object(_))
    }

    /// Check if this is a static target
    pub fn is_static(&self) -> bool {
        matches!(self, CallbackTarget::Static(_))
    }
}

impl fmt::Debug for CallbackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackTarget::Object(object) => write!(f, "{:?}", object),
            CallbackTarget::Static(type_name) => write!(f, "Static({})", type_name),
        }
    }
}

impl fmt::Display for CallbackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackTarget::Object(object) => match object.upgrade() {
                Some(object) => write!(f, "object of class '{}'", object.class_name()),
                None => write!(f, "expired object"),
            },
            CallbackTarget::Static(type_name) => write!(f, "type '{}'", type_name),
        }
    }
}

/// How long a handler survives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Removed when the world/session ends
    Scoped,
    /// Survives world teardown
    Forever,
}

/// Why a handler was not called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Handler was removed after the snapshot was taken
    Unregistered,
    /// Target object no longer exists
    Expired,
    /// A handler target rejected the envelope
    Filtered,
}

/// Outcome of a single handler invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Invoked,
    Skipped(SkipReason),
}

/// A registered callback
pub struct CallbackHandler {
    /// Declared payload type of the event at registration time
    event_type: Option<Name>,
    target: CallbackTarget,
    function: Name,
    lifetime: Lifetime,
    registered: AtomicBool,
    targets: RwLock<Vec<Box<dyn EventTarget>>>,
}

impl CallbackHandler {
    /// Create a new registered handler
    pub(crate) fn new(
        event_type: Option<Name>,
        target: CallbackTarget,
        function: Name,
        lifetime: Lifetime,
    ) -> Self {
        Self {
            event_type,
            target,
            function,
            lifetime,
            registered: AtomicBool::new(true),
            targets: RwLock::new(Vec::new()),
        }
    }

    pub fn event_type(&self) -> Option<&Name> {
        self.event_type.as_ref()
    }

    pub fn target(&self) -> &CallbackTarget {
        &self.target
    }

    pub fn function(&self) -> &Name {
        &self.function
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Check if the handler survives world teardown
    pub fn is_sticky(&self) -> bool {
        self.lifetime == Lifetime::Forever
    }

    /// Check if the handler is still registered
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    /// Stop receiving events. The registry drops the handler at the next
    /// unregister or teardown sweep.
    pub fn unregister(&self) {
        self.registered.store(false, Ordering::Release);
    }

    /// Add a filter; applies to dispatches that start after this call
    pub fn add_target(&self, target: impl EventTarget + 'static) {
        self.targets.write().push(Box::new(target));
    }

    /// Remove every filter
    pub fn clear_targets(&self) {
        self.targets.write().clear();
    }

    pub fn target_count(&self) -> usize {
        self.targets.read().len()
    }

    /// Check if the handler is bound to `target`, whatever the function
    pub fn is_same_context(&self, target: &CallbackTarget) -> bool {
        self.target.same_as(target)
    }

    /// Check if the handler is bound to `target` and `function`
    pub fn is_same_callback(&self, target: &CallbackTarget, function: &Name) -> bool {
        self.target.same_as(target) && self.function == *function
    }

    /// Check every filter against the envelope
    pub fn accepts(&self, envelope: &EventEnvelope) -> bool {
        self.targets.read().iter().all(|target| target.matches(envelope))
    }

    /// Call the handler's function with the envelope
    pub(crate) fn invoke(&self, envelope: &EventEnvelope, bridge: &dyn ScriptBridge) -> Result<Invocation> {
        if !self.is_registered() {
            return Ok(Invocation::Skipped(SkipReason::Unregistered));
        }
        if !self.accepts(envelope) {
            return Ok(Invocation::Skipped(SkipReason::Filtered));
        }

        match &self.target {
            CallbackTarget::Object(weak) => match weak.upgrade() {
                Some(object) => bridge.invoke_virtual(&object, &self.function, envelope)?,
                None => return Ok(Invocation::Skipped(SkipReason::Expired)),
            },
            CallbackTarget::Static(type_name) => {
                bridge.invoke_static(type_name, &self.function, envelope)?
            }
        }

        Ok(Invocation::Invoked)
    }
}

impl fmt::Debug for CallbackHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandler")
            .field("target", &self.target)
            .field("function", &self.function)
            .field("lifetime", &self.lifetime)
            .field("registered", &self.is_registered())
            .finish()
    }
}
