//! Host-backed implementations of the dispatch contracts

use std::sync::Arc;

use relay_core::{Name, ObjectRef, TypeDescriptor, TypeResolver};
use relay_dispatch::controllers::{HookFactory, HookPoint};
use relay_dispatch::{DispatchError, EngineHook, ScriptBridge};
use relay_event::EventEnvelope;

use crate::ffi::{FfiHostApi, FfiStr};
use crate::objects::ObjectTable;

/// Type system of the host
pub struct HostTypes {
    api: FfiHostApi,
}

impl HostTypes {
    pub fn new(api: FfiHostApi) -> Self {
        Self { api }
    }
}

impl TypeResolver for HostTypes {
    fn resolve(&self, name: &Name) -> Option<TypeDescriptor> {
        let raw = FfiStr::new(name.as_str());
        if !(self.api.type_exists)(raw) {
            return None;
        }

        let mut parent = FfiStr::null();
        let mut descriptor = TypeDescriptor::new(name);
        if (self.api.type_parent)(raw, &mut parent) {
            // SAFETY: the host guarantees parent names live for the process
            if let Some(parent) = unsafe { parent.as_str() } {
                descriptor = descriptor.with_parent(parent);
            }
        }
        Some(descriptor)
    }
}

/// Calls into scripts through the host
pub struct HostBridge {
    api: FfiHostApi,
    objects: Arc<ObjectTable>,
}

impl HostBridge {
    pub fn new(api: FfiHostApi, objects: Arc<ObjectTable>) -> Self {
        Self { api, objects }
    }
}

impl ScriptBridge for HostBridge {
    fn invoke_virtual(&self, object: &ObjectRef, function: &Name, event: &EventEnvelope) -> relay_dispatch::Result<()> {
        let target = object.class_name();
        let id = self
            .objects
            .id_of(object)
            .ok_or_else(|| DispatchError::invocation_failed(target.as_str(), function, "object is not tracked"))?;

        let payload = event.to_json().to_string();
        let ok = (self.api.invoke_virtual)(
            id,
            FfiStr::new(function.as_str()),
            FfiStr::new(event.event_name().as_str()),
            FfiStr::new(&payload),
        );
        if ok {
            Ok(())
        } else {
            Err(DispatchError::invocation_failed(target.as_str(), function, "host call failed"))
        }
    }

    fn invoke_static(&self, type_name: &Name, function: &Name, event: &EventEnvelope) -> relay_dispatch::Result<()> {
        let payload = event.to_json().to_string();
        let ok = (self.api.invoke_static)(
            FfiStr::new(type_name.as_str()),
            FfiStr::new(function.as_str()),
            FfiStr::new(event.event_name().as_str()),
            FfiStr::new(&payload),
        );
        if ok {
            Ok(())
        } else {
            Err(DispatchError::invocation_failed(type_name.as_str(), function, "host call failed"))
        }
    }
}

/// One engine hook point armed through the host
pub struct HostHook {
    api: FfiHostApi,
    point: HookPoint,
}

impl EngineHook for HostHook {
    fn install(&self) -> relay_dispatch::Result<()> {
        if (self.api.install_hook)(self.point as u32) {
            log::debug!("Host installed hook {:?}", self.point);
            Ok(())
        } else {
            Err(DispatchError::hook_install_failed(
                self.point.controller_name(),
                "host refused",
            ))
        }
    }

    fn remove(&self) {
        (self.api.remove_hook)(self.point as u32);
        log::debug!("Host removed hook {:?}", self.point);
    }
}

/// Creates [`HostHook`]s
pub struct HostHooks {
    api: FfiHostApi,
}

impl HostHooks {
    pub fn new(api: FfiHostApi) -> Self {
        Self { api }
    }
}

impl HookFactory for HostHooks {
    fn create_hook(&self, point: HookPoint) -> Box<dyn EngineHook> {
        Box::new(HostHook { api: self.api, point })
    }
}
