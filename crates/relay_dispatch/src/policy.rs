//! Handler lifetime policy
//!
//! Registrations are `Scoped` unless the caller asks for a sticky handler or
//! the policy trusts the caller. Which callers are trusted is host-specific,
//! so the decision is injected.

use std::sync::Arc;

use relay_core::{Name, ObjectRef, TypeResolver};

use crate::handler::Lifetime;

/// Base type of long-lived script services
pub const SCRIPTABLE_SERVICE: &str = "ScriptableService";

/// The scripted frame a registration came from
#[derive(Clone, Default)]
pub struct CallerContext {
    object: Option<ObjectRef>,
}

impl CallerContext {
    /// Caller running in the context of `object`
    pub fn new(object: ObjectRef) -> Self {
        Self {
            object: Some(object),
        }
    }

    /// Caller with no context object (static function, native code)
    pub fn none() -> Self {
        Self::default()
    }

    pub fn object(&self) -> Option<&ObjectRef> {
        self.object.as_ref()
    }
}

/// Decides the lifetime of a new handler
pub trait LifetimePolicy: Send + Sync {
    fn lifetime_for(&self, sticky: bool, caller: Option<&CallerContext>) -> Lifetime;
}

/// Only an explicit sticky request yields `Forever`
#[derive(Debug, Clone, Copy, Default)]
pub struct StickyOnlyPolicy;

impl LifetimePolicy for StickyOnlyPolicy {
    fn lifetime_for(&self, sticky: bool, _caller: Option<&CallerContext>) -> Lifetime {
        if sticky {
            Lifetime::Forever
        } else {
            Lifetime::Scoped
        }
    }
}

/// Callers whose context object derives from a privileged type get `Forever`
pub struct ServiceCallerPolicy {
    types: Arc<dyn TypeResolver>,
    privileged: Vec<Name>,
}

impl ServiceCallerPolicy {
    pub fn new(types: Arc<dyn TypeResolver>, privileged: Vec<Name>) -> Self {
        Self { types, privileged }
    }

    /// Trust script services only
    pub fn services(types: Arc<dyn TypeResolver>) -> Self {
        Self::new(types, vec![Name::new(SCRIPTABLE_SERVICE)])
    }

    /// Check if a caller is trusted
    pub fn is_privileged(&self, caller: &CallerContext) -> bool {
        let Some(object) = caller.object() else {
            return false;
        };
        let class = object.class_name();
        self.privileged
            .iter()
            .any(|base| self.types.is_subtype_of(&class, base))
    }
}

impl LifetimePolicy for ServiceCallerPolicy {
    fn lifetime_for(&self, sticky: bool, caller: Option<&CallerContext>) -> Lifetime {
        if sticky || caller.map_or(false, |caller| self.is_privileged(caller)) {
            Lifetime::Forever
        } else {
            Lifetime::Scoped
        }
    }
}
