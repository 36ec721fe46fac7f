//! # relay_core - Relay Core
//!
//! Zero-dependency primitives shared by every Relay crate:
//! - **Names**: hashed symbols that key every registry map
//! - **Types**: the reflection contract used to validate event payload types
//! - **Objects**: scriptable objects and the weak references handlers hold
//!
//! The engine owns the real type system and object lifetimes. This crate only
//! describes what the dispatch core needs to ask of them.

pub mod name;
pub mod object;
pub mod type_registry;

pub use name::*;
pub use object::*;
pub use type_registry::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::name::Name;
    pub use crate::object::{ObjectRef, Scriptable, WeakObject};
    pub use crate::type_registry::{TypeDescriptor, TypeRegistry, TypeResolver};
}
