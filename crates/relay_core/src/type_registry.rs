//! Reflection contract
//!
//! The engine's type system is external. The dispatch core only needs to ask
//! whether a type name resolves and whether one type derives from another;
//! [`TypeResolver`] is that question. [`TypeRegistry`] is the in-process
//! implementation used by hosts that mirror engine types and by tests.

use std::collections::HashMap;
use std::fmt;

use crate::name::Name;

/// Upper bound on inheritance chains walked by [`TypeResolver::is_subtype_of`]
const MAX_TYPE_DEPTH: usize = 64;

/// Description of a resolvable type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type name
    pub name: Name,
    /// Direct parent type, if any
    pub parent: Option<Name>,
}

impl TypeDescriptor {
    /// Create a root type
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Set the parent type
    pub fn with_parent(mut self, parent: impl Into<Name>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Resolves type names against a type system
pub trait TypeResolver: Send + Sync {
    /// Look up a type by name
    fn resolve(&self, name: &Name) -> Option<TypeDescriptor>;

    /// Check whether `name` is `base` or derives from it
    fn is_subtype_of(&self, name: &Name, base: &Name) -> bool {
        let mut current = name.clone();
        for _ in 0..MAX_TYPE_DEPTH {
            if current == *base {
                return true;
            }
            match self.resolve(&current).and_then(|desc| desc.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}

/// In-process type table
#[derive(Default)]
pub struct TypeRegistry {
    by_name: HashMap<Name, TypeDescriptor>,
}

impl TypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any previous descriptor with the same name
    pub fn register(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.by_name.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Get a descriptor by name
    pub fn get(&self, name: &Name) -> Option<&TypeDescriptor> {
        self.by_name.get(name)
    }

    /// Check if a type is registered
    pub fn contains(&self, name: &Name) -> bool {
        self.by_name.contains_key(name)
    }

    /// Get the number of registered types
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve(&self, name: &Name) -> Option<TypeDescriptor> {
        self.by_name.get(name).cloned()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.by_name.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register(TypeDescriptor::new("IScriptable"))
            .register(TypeDescriptor::new("ScriptableService").with_parent("IScriptable"))
            .register(TypeDescriptor::new("QuestService").with_parent("ScriptableService"));
        registry
    }

    #[test]
    fn test_resolve() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        let desc = registry.resolve(&Name::new("QuestService")).unwrap();
        assert_eq!(desc.parent, Some(Name::new("ScriptableService")));
        assert!(registry.resolve(&Name::new("Missing")).is_none());
    }

    #[test]
    fn test_subtype_walk() {
        let registry = registry();
        let service = Name::new("ScriptableService");
        assert!(registry.is_subtype_of(&Name::new("QuestService"), &service));
        assert!(registry.is_subtype_of(&service, &service));
        assert!(!registry.is_subtype_of(&Name::new("IScriptable"), &service));
        assert!(!registry.is_subtype_of(&Name::new("Unknown"), &service));
    }

    #[test]
    fn test_cyclic_parents_terminate() {
        let mut registry = TypeRegistry::new();
        registry
            .register(TypeDescriptor::new("A").with_parent("B"))
            .register(TypeDescriptor::new("B").with_parent("A"));
        assert!(!registry.is_subtype_of(&Name::new("A"), &Name::new("C")));
    }
}
