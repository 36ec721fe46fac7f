//! Process-wide runtime
//!
//! One [`Runtime`] exists between `relay_init` and `relay_shutdown`. Entry
//! points clone the `Arc` out of the global slot and release the slot lock
//! before doing any work, so handlers may call back into Relay.

use std::sync::Arc;

use parking_lot::RwLock;
use relay_core::{Name, TypeResolver};
use relay_dispatch::controllers::HookFactory;
use relay_dispatch::{CallbackSystem, CallerContext, DispatchReport, RelayConfig, ScriptBridge, SessionDriver};
use relay_event::EventEnvelope;

use crate::error::{NativeError, Result};
use crate::ffi::{FfiHostApi, ObjectId};
use crate::host::{HostBridge, HostHooks, HostTypes};
use crate::objects::ObjectTable;

static RUNTIME: RwLock<Option<Arc<Runtime>>> = RwLock::new(None);

/// Everything Relay owns while loaded
pub struct Runtime {
    config: RelayConfig,
    system: Arc<CallbackSystem>,
    driver: SessionDriver,
    objects: Arc<ObjectTable>,
}

impl Runtime {
    /// Build a runtime talking to the host through `api`
    pub fn from_host(api: FfiHostApi, config: RelayConfig) -> Result<Self> {
        api.check_version()?;
        let objects = Arc::new(ObjectTable::new());
        Ok(Self::with_parts(
            config,
            Arc::new(HostTypes::new(api)),
            Arc::new(HostBridge::new(api, objects.clone())),
            &HostHooks::new(api),
            objects,
        ))
    }

    /// Build a runtime from explicit collaborators
    pub fn with_parts(
        config: RelayConfig,
        types: Arc<dyn TypeResolver>,
        bridge: Arc<dyn ScriptBridge>,
        hooks: &dyn HookFactory,
        objects: Arc<ObjectTable>,
    ) -> Self {
        let system = Arc::new(
            CallbackSystem::builder(types, bridge)
                .config(&config)
                .default_controllers(hooks)
                .build(),
        );
        let driver = SessionDriver::new(system.clone());
        Self {
            config,
            system,
            driver,
            objects,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn system(&self) -> &Arc<CallbackSystem> {
        &self.system
    }

    pub fn driver(&self) -> &SessionDriver {
        &self.driver
    }

    pub fn objects(&self) -> &Arc<ObjectTable> {
        &self.objects
    }

    /// Script registers `function` of object `object`.
    /// `caller` is the object whose script frame made the call, if any.
    pub fn register_object_callback(
        &self,
        event: &str,
        object: (ObjectId, &str),
        function: &str,
        sticky: Option<bool>,
        caller: Option<(ObjectId, &str)>,
    ) {
        let target = self.objects.track(object.0, object.1);
        let caller = self.caller_context(caller);
        self.system
            .register_callback(event, &target, function, sticky, caller.as_ref());
    }

    /// Script registers a static function. `caller` as above.
    pub fn register_static_callback(
        &self,
        event: &str,
        type_name: &str,
        function: &str,
        sticky: Option<bool>,
        caller: Option<(ObjectId, &str)>,
    ) {
        let caller = self.caller_context(caller);
        self.system
            .register_static_callback(event, type_name, function, sticky, caller.as_ref());
    }

    fn caller_context(&self, caller: Option<(ObjectId, &str)>) -> Option<CallerContext> {
        caller.map(|(id, class)| CallerContext::new(self.objects.track(id, class)))
    }

    pub fn unregister_object_callback(&self, event: &str, object: ObjectId, function: Option<&str>) -> Result<usize> {
        let target = self.objects.get(object).ok_or(NativeError::UnknownObject(object))?;
        let function = function.map(Name::new);
        Ok(self.system.unregister_callback(event, &target, function.as_ref()))
    }

    pub fn unregister_static_callback(&self, event: &str, type_name: &str, function: Option<&str>) -> usize {
        let function = function.map(Name::new);
        self.system
            .unregister_static_callback(event, type_name, function.as_ref())
    }

    /// Script submits a payload of `type_name` as JSON. Delivered under
    /// `event`, or under the type name when `event` is `None`.
    pub fn dispatch_json(&self, event: Option<&str>, type_name: &str, payload_json: &str) -> Result<DispatchReport> {
        let payload: serde_json::Value = serde_json::from_str(payload_json)?;
        let mut envelope = EventEnvelope::new(type_name, payload);
        Ok(match event {
            Some(event) => self.system.dispatch_as(event, &mut envelope),
            None => self.system.dispatch(&mut envelope),
        })
    }
}

/// Publish `runtime` as the process-wide instance
pub fn install(runtime: Runtime) -> Result<Arc<Runtime>> {
    let mut slot = RUNTIME.write();
    if slot.is_some() {
        return Err(NativeError::AlreadyInitialized);
    }
    let runtime = Arc::new(runtime);
    *slot = Some(runtime.clone());
    Ok(runtime)
}

/// The process-wide instance
pub fn current() -> Result<Arc<Runtime>> {
    RUNTIME.read().clone().ok_or(NativeError::NotInitialized)
}

/// Drop the process-wide instance. Returns false if there was none.
pub fn shutdown() -> bool {
    let runtime = RUNTIME.write().take();
    match runtime {
        Some(runtime) => {
            runtime.objects.clear();
            log::info!("Relay shut down");
            true
        }
        None => false,
    }
}
