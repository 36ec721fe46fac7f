//! Scriptable object model
//!
//! Objects handlers call into are owned elsewhere (by the engine, or by the
//! native object table). Handlers only keep a [`WeakObject`], so a destroyed
//! target is observed as expired instead of dangling.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::name::Name;

/// An object that scripted callbacks can be invoked on
pub trait Scriptable: Send + Sync {
    /// Runtime class of the object
    fn class_name(&self) -> Name;
}

/// Strong reference to a scriptable object
pub type ObjectRef = Arc<dyn Scriptable>;

/// Non-owning reference to a scriptable object
#[derive(Clone)]
pub struct WeakObject(Weak<dyn Scriptable>);

impl WeakObject {
    /// Downgrade a strong reference
    pub fn new(object: &ObjectRef) -> Self {
        Self(Arc::downgrade(object))
    }

    /// Get a strong reference if the object is still alive
    #[inline]
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade()
    }

    /// Check if the object has been destroyed
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.0.strong_count() == 0
    }

    /// Check if two weak references point to the same object
    ///
    /// Works on expired references too: the weak count keeps the allocation
    /// address reserved.
    pub fn same_object(&self, other: &WeakObject) -> bool {
        std::ptr::addr_eq(self.0.as_ptr(), other.0.as_ptr())
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(object) => write!(f, "WeakObject({})", object.class_name()),
            None => write!(f, "WeakObject(expired)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lamp;

    impl Scriptable for Lamp {
        fn class_name(&self) -> Name {
            Name::new("Lamp")
        }
    }

    #[test]
    fn test_weak_expiry() {
        let object: ObjectRef = Arc::new(Lamp);
        let weak = WeakObject::new(&object);
        assert!(!weak.is_expired());
        assert_eq!(weak.upgrade().unwrap().class_name(), "Lamp");

        drop(object);
        assert!(weak.is_expired());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_identity() {
        let a: ObjectRef = Arc::new(Lamp);
        let b: ObjectRef = Arc::new(Lamp);
        let weak_a = WeakObject::new(&a);

        assert!(weak_a.same_object(&WeakObject::new(&a)));
        assert!(!weak_a.same_object(&WeakObject::new(&b)));
    }
}
