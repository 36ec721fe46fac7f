//! Callback system
//!
//! Central registry of dispatchable events and their handlers. The declared
//! events and the handler lists share one reader/writer lock; dispatch takes a
//! snapshot under the read lock and invokes handlers with no lock held, so a
//! handler may register or unregister handlers while it runs.
//!
//! List transitions are serialized by a separate reentrant lock. Controllers
//! hear about a transition after the state lock is released, so an engine hook
//! may dispatch from `install`.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};
use relay_core::{Name, ObjectRef, TypeResolver};
use relay_event::{EventEnvelope, NativeEvent};

use crate::bridge::ScriptBridge;
use crate::config::RelayConfig;
use crate::controller::EventController;
use crate::controllers::{
    EntityLifecycleHook, EntityStage, GameSessionController, HookFactory, HookPoint,
    PlayerSpawnedHook, RawInputHook, ResourceLoadHook, ResourceReadyHook, VehicleLightControlHook,
};
use crate::error::{DispatchError, Result};
use crate::guard;
use crate::handler::{CallbackHandler, CallbackTarget, HandlerRef, Invocation};
use crate::policy::{CallerContext, LifetimePolicy, ServiceCallerPolicy};

/// Counts from a single dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub invoked: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DispatchReport {
    /// Number of handlers in the snapshot
    pub fn total(&self) -> usize {
        self.invoked + self.skipped + self.failed
    }
}

#[derive(Default)]
struct CallbackState {
    /// Event name to payload type name. Entries are never removed.
    supported_events: HashMap<Name, Name>,
    /// Handlers in registration order. Lists are never left empty.
    callbacks_by_event: HashMap<Name, Vec<HandlerRef>>,
}

type AnyController = Arc<dyn Any + Send + Sync>;

/// Registry of events, handlers and the controllers feeding them
pub struct CallbackSystem {
    state: RwLock<CallbackState>,
    /// Held across a list transition and the controller call it causes
    transitions: ReentrantMutex<()>,
    /// Event name to the controller producing it
    controllers: HashMap<Name, Arc<dyn EventController>>,
    /// Controller name to the concrete controller
    typed_controllers: HashMap<String, AnyController>,
    types: Arc<dyn TypeResolver>,
    bridge: Arc<dyn ScriptBridge>,
    policy: Box<dyn LifetimePolicy>,
    restored: AtomicBool,
    pre_game: AtomicBool,
}

impl CallbackSystem {
    /// Start building a callback system
    pub fn builder(types: Arc<dyn TypeResolver>, bridge: Arc<dyn ScriptBridge>) -> CallbackSystemBuilder {
        CallbackSystemBuilder::new(types, bridge)
    }

    // ========== Event Declaration ==========

    /// Declare a dispatchable event. The payload type defaults to the event
    /// name. Returns false if the name is taken or the type is unknown.
    pub fn register_event(&self, event: impl Into<Name>, type_hint: Option<Name>) -> bool {
        match self.try_register_event(event, type_hint) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{}", e);
                false
            }
        }
    }

    /// Declare a dispatchable event, reporting why it failed
    pub fn try_register_event(&self, event: impl Into<Name>, type_hint: Option<Name>) -> Result<()> {
        let event = event.into();
        let type_name = type_hint
            .filter(|hint| !hint.is_none())
            .unwrap_or_else(|| event.clone());

        if self.types.resolve(&type_name).is_none() {
            return Err(DispatchError::UnresolvedType { event, type_name });
        }

        let mut state = self.state.write();
        if state.supported_events.contains_key(&event) {
            return Err(DispatchError::EventAlreadyDeclared(event));
        }

        log::debug!("Declared event '{}' of type '{}'", event, type_name);
        state.supported_events.insert(event, type_name);
        Ok(())
    }

    /// Payload type an event was declared with
    pub fn event_type(&self, event: &Name) -> Option<Name> {
        self.state.read().supported_events.get(event).cloned()
    }

    /// Check if an event has been declared
    pub fn is_event_supported(&self, event: &Name) -> bool {
        self.state.read().supported_events.contains_key(event)
    }

    // ========== Registration ==========

    /// Register a handler.
    ///
    /// The handler lives `Forever` if `sticky` is set or the lifetime policy
    /// trusts `caller`. Registering on an undeclared event is allowed.
    pub fn register(
        &self,
        event: impl Into<Name>,
        target: CallbackTarget,
        function: impl Into<Name>,
        sticky: Option<bool>,
        caller: Option<&CallerContext>,
    ) -> HandlerRef {
        let event = event.into();
        let function = function.into();
        let lifetime = self.policy.lifetime_for(sticky.unwrap_or(false), caller);

        let _transition = self.transitions.lock();
        let (handler, first) = {
            let mut state = self.state.write();
            let event_type = state.supported_events.get(&event).cloned();
            let handler = Arc::new(CallbackHandler::new(event_type, target, function, lifetime));

            let first = match state.callbacks_by_event.get_mut(&event) {
                Some(handlers) => {
                    handlers.push(handler.clone());
                    false
                }
                None => {
                    state.callbacks_by_event.insert(event.clone(), vec![handler.clone()]);
                    true
                }
            };
            (handler, first)
        };

        log::debug!(
            "Registered {}::{} for '{}' ({:?})",
            handler.target(),
            handler.function(),
            event,
            lifetime
        );

        if first {
            self.activate_event(&event);
        }
        handler
    }

    /// Register a method of `object`. `caller` is the script frame the
    /// registration came from, not the target.
    pub fn register_callback(
        &self,
        event: impl Into<Name>,
        object: &ObjectRef,
        function: impl Into<Name>,
        sticky: Option<bool>,
        caller: Option<&CallerContext>,
    ) -> HandlerRef {
        self.register(event, CallbackTarget::object(object), function, sticky, caller)
    }

    /// Register a static function of `type_name`
    pub fn register_static_callback(
        &self,
        event: impl Into<Name>,
        type_name: impl Into<Name>,
        function: impl Into<Name>,
        sticky: Option<bool>,
        caller: Option<&CallerContext>,
    ) -> HandlerRef {
        self.register(event, CallbackTarget::static_type(type_name), function, sticky, caller)
    }

    /// Remove handlers bound to `target`, or only to `target` and `function`.
    /// Returns the number removed.
    pub fn unregister(&self, event: impl Into<Name>, target: &CallbackTarget, function: Option<&Name>) -> usize {
        let event = event.into();
        let _transition = self.transitions.lock();

        let (removed, emptied) = {
            let mut state = self.state.write();
            let Some(handlers) = state.callbacks_by_event.get_mut(&event) else {
                return 0;
            };

            let before = handlers.len();
            handlers.retain(|handler| {
                let matched = match function {
                    Some(function) => handler.is_same_callback(target, function),
                    None => handler.is_same_context(target),
                };
                if matched {
                    handler.unregister();
                }
                !matched
            });
            let removed = before - handlers.len();

            let emptied = handlers.is_empty();
            if emptied {
                state.callbacks_by_event.remove(&event);
            }
            (removed, emptied)
        };

        if emptied {
            self.deactivate_event(&event);
        }

        if removed > 0 {
            log::debug!("Unregistered {} handler(s) of {} from '{}'", removed, target, event);
        }
        removed
    }

    /// Remove handlers of `object` for `event`
    pub fn unregister_callback(&self, event: impl Into<Name>, object: &ObjectRef, function: Option<&Name>) -> usize {
        self.unregister(event, &CallbackTarget::object(object), function)
    }

    /// Remove static handlers of `type_name` for `event`
    pub fn unregister_static_callback(
        &self,
        event: impl Into<Name>,
        type_name: impl Into<Name>,
        function: Option<&Name>,
    ) -> usize {
        self.unregister(event, &CallbackTarget::static_type(type_name), function)
    }

    // ========== Dispatch ==========

    /// Dispatch under the payload's own type name
    pub fn dispatch(&self, envelope: &mut EventEnvelope) -> DispatchReport {
        let type_name = envelope.type_name().clone();
        envelope.set_event_name(type_name);
        self.fire(envelope)
    }

    /// Dispatch under `event`
    pub fn dispatch_as(&self, event: impl Into<Name>, envelope: &mut EventEnvelope) -> DispatchReport {
        envelope.set_event_name(event);
        self.fire(envelope)
    }

    /// Wrap a native payload and dispatch it under `event`
    pub fn dispatch_native<E: NativeEvent>(&self, event: impl Into<Name>, payload: E) -> DispatchReport {
        let envelope = EventEnvelope::named(event, payload);
        self.fire(&envelope)
    }

    fn fire(&self, envelope: &EventEnvelope) -> DispatchReport {
        let snapshot: Vec<HandlerRef> = {
            let state = self.state.read();
            match state.callbacks_by_event.get(envelope.event_name()) {
                Some(handlers) => handlers.clone(),
                None => return DispatchReport::default(),
            }
        };

        let mut report = DispatchReport::default();
        for handler in &snapshot {
            match guard::catch_panic(|| handler.invoke(envelope, self.bridge.as_ref())) {
                Ok(Ok(Invocation::Invoked)) => report.invoked += 1,
                Ok(Ok(Invocation::Skipped(_))) => report.skipped += 1,
                Ok(Err(e)) => {
                    log::warn!("'{}': {}", envelope.event_name(), e);
                    report.failed += 1;
                }
                Err(message) => {
                    log::error!(
                        "Handler {}::{} panicked on '{}': {}",
                        handler.target(),
                        handler.function(),
                        envelope.event_name(),
                        message
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }

    // ========== Teardown ==========

    /// Drop every handler that is not both `Forever` and still registered.
    /// Returns the number removed.
    pub fn sweep(&self) -> usize {
        let _transition = self.transitions.lock();
        let mut removed = 0;
        let mut emptied = Vec::new();

        {
            let mut state = self.state.write();
            for (event, handlers) in state.callbacks_by_event.iter_mut() {
                let before = handlers.len();
                handlers.retain(|handler| {
                    let keep = handler.is_sticky() && handler.is_registered();
                    if !keep {
                        handler.unregister();
                    }
                    keep
                });
                removed += before - handlers.len();

                if handlers.is_empty() {
                    emptied.push(event.clone());
                }
            }

            for event in &emptied {
                state.callbacks_by_event.remove(event);
            }
        }

        for event in &emptied {
            self.deactivate_event(event);
        }

        log::info!("Swept {} handler(s), {} event(s) now idle", removed, emptied.len());
        removed
    }

    // ========== Activation ==========

    /// Forward to the controller producing `event`, if any
    pub fn activate_event(&self, event: &Name) {
        if let Some(controller) = self.controllers.get(event) {
            debug_assert!(controller.events().iter().any(|decl| decl.event == *event));
            controller.activate_event(event);
        }
    }

    /// Forward to the controller producing `event`, if any
    pub fn deactivate_event(&self, event: &Name) {
        if let Some(controller) = self.controllers.get(event) {
            controller.deactivate_event(event);
        }
    }

    /// Controller producing `event`
    pub fn controller_for(&self, event: &Name) -> Option<Arc<dyn EventController>> {
        self.controllers.get(event).cloned()
    }

    /// Concrete controller by controller name
    pub fn controller<C: EventController + 'static>(&self, name: &str) -> Option<Arc<C>> {
        self.typed_controllers
            .get(name)
            .and_then(|controller| controller.clone().downcast::<C>().ok())
    }

    // ========== Accessors ==========

    /// Snapshot of the handlers for `event`
    pub fn handlers(&self, event: &Name) -> Vec<HandlerRef> {
        self.state
            .read()
            .callbacks_by_event
            .get(event)
            .cloned()
            .unwrap_or_default()
    }

    pub fn handler_count(&self, event: &Name) -> usize {
        self.state
            .read()
            .callbacks_by_event
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Check if anything listens to `event`
    pub fn has_handlers(&self, event: &Name) -> bool {
        self.state.read().callbacks_by_event.contains_key(event)
    }

    pub fn types(&self) -> &Arc<dyn TypeResolver> {
        &self.types
    }

    /// Check if the current session was loaded from a save
    pub fn is_restored(&self) -> bool {
        self.restored.load(Ordering::Acquire)
    }

    /// Check if the current world is the pre-game (main menu) world
    pub fn is_pre_game(&self) -> bool {
        self.pre_game.load(Ordering::Acquire)
    }

    pub(crate) fn set_restored(&self, restored: bool) {
        self.restored.store(restored, Ordering::Release);
    }

    pub(crate) fn set_pre_game(&self, pre_game: bool) {
        self.pre_game.store(pre_game, Ordering::Release);
    }
}

/// Builder for [`CallbackSystem`]
pub struct CallbackSystemBuilder {
    types: Arc<dyn TypeResolver>,
    bridge: Arc<dyn ScriptBridge>,
    policy: Option<Box<dyn LifetimePolicy>>,
    controllers: Vec<(Arc<dyn EventController>, AnyController)>,
    disabled: HashSet<String>,
}

impl CallbackSystemBuilder {
    fn new(types: Arc<dyn TypeResolver>, bridge: Arc<dyn ScriptBridge>) -> Self {
        Self {
            types,
            bridge,
            policy: None,
            controllers: Vec::new(),
            disabled: HashSet::new(),
        }
    }

    /// Replace the lifetime policy (default: script services are trusted)
    pub fn policy(mut self, policy: impl LifetimePolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Add a controller
    pub fn controller<C: EventController + 'static>(mut self, controller: C) -> Self {
        let controller = Arc::new(controller);
        let typed: AnyController = controller.clone();
        let dynamic: Arc<dyn EventController> = controller;
        self.controllers.push((dynamic, typed));
        self
    }

    /// Add the built-in controllers, hooking through `hooks`
    pub fn default_controllers(self, hooks: &dyn HookFactory) -> Self {
        let mut builder = self.controller(GameSessionController::new());
        for stage in EntityStage::ALL {
            builder = builder.controller(EntityLifecycleHook::new(stage, hooks.create_hook(stage.hook_point())));
        }
        builder
            .controller(PlayerSpawnedHook::new(hooks.create_hook(HookPoint::PlayerSpawned)))
            .controller(RawInputHook::new(hooks.create_hook(HookPoint::RawInput)))
            .controller(ResourceLoadHook::new(hooks.create_hook(HookPoint::ResourceLoad)))
            .controller(ResourceReadyHook::new(hooks.create_hook(HookPoint::ResourceReady)))
            .controller(VehicleLightControlHook::new(hooks.create_hook(HookPoint::VehicleLightControl)))
    }

    /// Apply privileged types and disabled controllers
    pub fn config(mut self, config: &RelayConfig) -> Self {
        self.policy = Some(Box::new(ServiceCallerPolicy::new(
            self.types.clone(),
            config.privileged_names(),
        )));
        self.disabled.extend(config.controllers.disabled.iter().cloned());
        self
    }

    /// Leave a controller's events unhooked
    pub fn disable(mut self, name: impl Into<String>) -> Self {
        self.disabled.insert(name.into());
        self
    }

    pub fn build(self) -> CallbackSystem {
        let mut state = CallbackState::default();
        let mut controllers: HashMap<Name, Arc<dyn EventController>> = HashMap::new();
        let mut typed_controllers = HashMap::new();

        for (controller, typed) in self.controllers {
            let enabled = !self.disabled.contains(controller.name());
            if !enabled {
                log::info!("Controller '{}' is disabled", controller.name());
            }

            for decl in controller.events() {
                // Native payload types are fixed, so no type resolution here
                if state.supported_events.contains_key(&decl.event) {
                    log::warn!("Event '{}' is already declared", decl.event);
                } else {
                    state.supported_events.insert(decl.event.clone(), decl.type_name.clone());
                }

                if enabled && !controllers.contains_key(&decl.event) {
                    controllers.insert(decl.event.clone(), controller.clone());
                }
            }

            if enabled {
                typed_controllers.insert(controller.name().to_string(), typed);
            }
        }

        let policy = self
            .policy
            .unwrap_or_else(|| Box::new(ServiceCallerPolicy::services(self.types.clone())));

        log::debug!(
            "Callback system ready: {} event(s), {} controller(s)",
            state.supported_events.len(),
            typed_controllers.len()
        );

        CallbackSystem {
            state: RwLock::new(state),
            transitions: ReentrantMutex::new(()),
            controllers,
            typed_controllers,
            types: self.types,
            bridge: self.bridge,
            policy,
            restored: AtomicBool::new(false),
            pre_game: AtomicBool::new(false),
        }
    }
}
