//! Engine object table
//!
//! Handlers hold weak references, so the table holds the only strong
//! reference to each engine object. Releasing an id expires every handler
//! bound to it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use relay_core::{Name, ObjectRef, Scriptable};

use crate::ffi::ObjectId;

/// Scriptable stand-in for a host object
#[derive(Debug)]
pub struct EngineObject {
    id: ObjectId,
    class: Name,
}

impl EngineObject {
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Scriptable for EngineObject {
    fn class_name(&self) -> Name {
        self.class.clone()
    }
}

#[derive(Default)]
struct Tables {
    by_id: HashMap<ObjectId, ObjectRef>,
    /// Allocation address to id
    by_addr: HashMap<usize, ObjectId>,
}

/// Live host objects known to Relay
#[derive(Default)]
pub struct ObjectTable {
    tables: RwLock<Tables>,
}

fn addr(object: &ObjectRef) -> usize {
    Arc::as_ptr(object) as *const () as usize
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the object for `id`, creating it on first sight
    pub fn track(&self, id: ObjectId, class: &str) -> ObjectRef {
        if let Some(object) = self.get(id) {
            return object;
        }

        let mut tables = self.tables.write();
        // Raced with another tracker
        if let Some(object) = tables.by_id.get(&id) {
            return object.clone();
        }

        let object: ObjectRef = Arc::new(EngineObject {
            id,
            class: Name::new(class),
        });
        tables.by_addr.insert(addr(&object), id);
        tables.by_id.insert(id, object.clone());
        object
    }

    pub fn get(&self, id: ObjectId) -> Option<ObjectRef> {
        self.tables.read().by_id.get(&id).cloned()
    }

    /// Host id of a tracked object
    pub fn id_of(&self, object: &ObjectRef) -> Option<ObjectId> {
        self.tables.read().by_addr.get(&addr(object)).copied()
    }

    /// Host destroyed the object. Returns false if it was not tracked.
    pub fn release(&self, id: ObjectId) -> bool {
        let mut tables = self.tables.write();
        match tables.by_id.remove(&id) {
            Some(object) => {
                tables.by_addr.remove(&addr(&object));
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut tables = self.tables.write();
        tables.by_id.clear();
        tables.by_addr.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::WeakObject;

    #[test]
    fn test_track_is_idempotent() {
        let table = ObjectTable::new();
        let a = table.track(7, "inkGameController");
        let b = table.track(7, "ignored");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.class_name(), "inkGameController");
        assert_eq!(table.id_of(&a), Some(7));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_release_expires_weak_refs() {
        let table = ObjectTable::new();
        let weak = WeakObject::new(&table.track(3, "PhotoModeService"));
        assert!(!weak.is_expired());

        assert!(table.release(3));
        assert!(weak.is_expired());
        assert!(!table.release(3));
        assert!(table.is_empty());
    }

    #[test]
    fn test_untracked_object_has_no_id() {
        let table = ObjectTable::new();
        let stray: ObjectRef = Arc::new(EngineObject {
            id: 1,
            class: Name::new("Stray"),
        });
        assert_eq!(table.id_of(&stray), None);
    }
}
