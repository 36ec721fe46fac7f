//! # relay_dispatch - Callback Dispatch
//!
//! Lets native and scripted code subscribe to named, typed events that the
//! engine produces from a fixed set of hook points.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │   Engine hook   │────▶│ EventController │ translates raw callbacks
//! │ (install/remove)│     │ (per hook point)│
//! └─────────────────┘     └────────┬────────┘
//!          ▲                       │ dispatch_native
//!          │ activate/deactivate   ▼
//!          │              ┌─────────────────┐     ┌─────────────────┐
//!          └──────────────│ CallbackSystem  │────▶│ CallbackHandler │
//!                         │ (RwLock'd maps) │     │ (weak target)   │
//!                         └────────┬────────┘     └────────┬────────┘
//!                                  ▲                       │
//!                                  │ Session/*             ▼
//!                         ┌─────────────────┐     ┌─────────────────┐
//!                         │  SessionDriver  │     │  ScriptBridge   │
//!                         │ (world/session) │     │ (virtual/static)│
//!                         └─────────────────┘     └─────────────────┘
//! ```
//!
//! Hooks are armed lazily: a controller installs its engine hook when one of
//! its events gets a first handler and removes it when the last one goes.
//!
//! ## Example
//!
//! ```ignore
//! use relay_dispatch::prelude::*;
//!
//! let system = Arc::new(
//!     CallbackSystem::builder(types, bridge)
//!         .config(&RelayConfig::load(None))
//!         .default_controllers(&hooks)
//!         .build(),
//! );
//!
//! system.register_static_callback("Session/Ready", "MyMod", "OnReady", None, None);
//!
//! let driver = SessionDriver::new(system.clone());
//! driver.on_world_attached(false);
//! ```

mod bridge;
mod config;
mod controller;
pub mod controllers;
mod error;
pub mod guard;
mod handler;
mod lifecycle;
mod policy;
mod registry;
mod target;

pub use bridge::ScriptBridge;
pub use config::{ControllerConfig, RelayConfig, CONFIG_ENV, CONFIG_FILE, LOG_ENV, PRIVILEGED_ENV};
pub use controller::{EngineHook, EventController, EventSpec, HookController, NoHook};
pub use error::{DispatchError, Result};
pub use handler::{CallbackHandler, CallbackTarget, HandlerRef, Invocation, Lifetime, SkipReason};
pub use lifecycle::{SessionDriver, SessionState};
pub use policy::{CallerContext, LifetimePolicy, ServiceCallerPolicy, StickyOnlyPolicy, SCRIPTABLE_SERVICE};
pub use registry::{CallbackSystem, CallbackSystemBuilder, DispatchReport};
pub use target::{EntityTarget, EventTarget, InputTarget, ResourceTarget};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bridge::ScriptBridge;
    pub use crate::config::RelayConfig;
    pub use crate::controller::{EngineHook, EventController, NoHook};
    pub use crate::controllers::{HookFactory, HookPoint};
    pub use crate::error::{DispatchError, Result};
    pub use crate::handler::{CallbackTarget, HandlerRef, Lifetime};
    pub use crate::lifecycle::SessionDriver;
    pub use crate::policy::CallerContext;
    pub use crate::registry::{CallbackSystem, DispatchReport};
    pub use crate::target::{EntityTarget, InputTarget, ResourceTarget};
    pub use relay_core::prelude::*;
    pub use relay_event::prelude::*;
}
