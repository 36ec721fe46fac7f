//! # relay_native - Native Entry Layer
//!
//! The shared library the game process loads. It owns the single
//! [`Runtime`], adapts the host's function table to the dispatch contracts
//! and exports the `relay_*` C functions the host calls:
//!
//! - `relay_init` / `relay_shutdown`
//! - world and session lifecycle notifications
//! - hook trampolines for armed engine hooks
//! - the script surface: declare, register, unregister, dispatch
//!
//! ## Host side
//!
//! ```c
//! RelayHostApi api = {
//!     .api_version = 1,
//!     .install_hook = install_hook,
//!     .remove_hook = remove_hook,
//!     .invoke_virtual = invoke_virtual,
//!     .invoke_static = invoke_static,
//!     .type_exists = type_exists,
//!     .type_parent = type_parent,
//! };
//! relay_init(&api, (RelayStr){ NULL, 0 });
//! ```

mod entry;
mod error;
mod ffi;
mod host;
mod logger;
mod objects;
mod runtime;

pub use entry::*;
pub use error::{NativeError, Result};
pub use ffi::*;
pub use host::{HostBridge, HostHook, HostHooks, HostTypes};
pub use logger::init as init_logger;
pub use objects::{EngineObject, ObjectTable};
pub use runtime::{current, install, shutdown, Runtime};
