//! Resource loading hooks

use relay_core::Name;
use relay_event::{NativeEvent, ResourceEvent};

use super::HookPoint;
use crate::controller::{EngineHook, EventController, EventSpec, HookController};
use crate::guard;
use crate::registry::CallbackSystem;

pub const RESOURCE_LOAD: &str = "Resource/Load";
pub const RESOURCE_READY: &str = "Resource/Ready";
pub const RESOURCE_POST_LOAD: &str = "Resource/PostLoad";

/// Relays resource load requests as `Resource/Load`
pub struct ResourceLoadHook {
    event: Name,
    inner: HookController,
}

impl ResourceLoadHook {
    pub fn new(hook: Box<dyn EngineHook>) -> Self {
        let inner = HookController::new(
            HookPoint::ResourceLoad.controller_name(),
            vec![EventSpec::new(RESOURCE_LOAD, ResourceEvent::TYPE_NAME)],
            hook,
        );
        Self {
            event: Name::new(RESOURCE_LOAD),
            inner,
        }
    }

    pub fn on_load(&self, system: &CallbackSystem, path: &str) {
        guard::contain(self.inner.name(), || {
            system.dispatch_native(self.event.clone(), ResourceEvent::new(path));
        });
    }
}

/// Relays finished resources as `Resource/Ready` and `Resource/PostLoad`
pub struct ResourceReadyHook {
    ready_event: Name,
    post_load_event: Name,
    inner: HookController,
}

impl ResourceReadyHook {
    pub fn new(hook: Box<dyn EngineHook>) -> Self {
        let inner = HookController::new(
            HookPoint::ResourceReady.controller_name(),
            vec![
                EventSpec::new(RESOURCE_READY, ResourceEvent::TYPE_NAME),
                EventSpec::new(RESOURCE_POST_LOAD, ResourceEvent::TYPE_NAME),
            ],
            hook,
        );
        Self {
            ready_event: Name::new(RESOURCE_READY),
            post_load_event: Name::new(RESOURCE_POST_LOAD),
            inner,
        }
    }

    /// Resource finished loading
    pub fn on_resource_ready(&self, system: &CallbackSystem, path: &str) {
        guard::contain(self.inner.name(), || {
            system.dispatch_native(self.ready_event.clone(), ResourceEvent::new(path));
        });
    }

    /// Resource finished post-load initialization
    pub fn on_post_load(&self, system: &CallbackSystem, path: &str) {
        guard::contain(self.inner.name(), || {
            system.dispatch_native(self.post_load_event.clone(), ResourceEvent::new(path));
        });
    }
}

delegate_controller!(ResourceLoadHook);
delegate_controller!(ResourceReadyHook);
