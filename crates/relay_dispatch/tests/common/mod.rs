//! Shared fixtures for relay_dispatch integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use relay_core::{Name, ObjectRef, Scriptable, TypeDescriptor, TypeRegistry, TypeResolver};
use relay_dispatch::controllers::{HookFactory, HookPoint};
use relay_dispatch::{DispatchError, EngineHook, Result, ScriptBridge, SCRIPTABLE_SERVICE};
use relay_event::EventEnvelope;

/// A call the bridge received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub target: String,
    pub function: String,
    pub event: String,
}

impl Call {
    pub fn label(&self) -> String {
        format!("{}::{}", self.target, self.function)
    }
}

type Action = Arc<dyn Fn(&EventEnvelope) + Send + Sync>;

/// Bridge that records every call and can run an action per function
#[derive(Default)]
pub struct RecordingBridge {
    calls: Mutex<Vec<Call>>,
    actions: Mutex<HashMap<String, Action>>,
}

impl RecordingBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Run `action` whenever `function` is invoked
    pub fn on<F>(&self, function: &str, action: F)
    where
        F: Fn(&EventEnvelope) + Send + Sync + 'static,
    {
        self.actions.lock().insert(function.to_string(), Arc::new(action));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// `Target::Function` for every call, in order
    pub fn labels(&self) -> Vec<String> {
        self.calls.lock().iter().map(Call::label).collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, target: String, function: &Name, event: &EventEnvelope) -> Result<()> {
        self.calls.lock().push(Call {
            target: target.clone(),
            function: function.to_string(),
            event: event.event_name().to_string(),
        });

        // Clone out so the action can call back into the bridge
        let action = self.actions.lock().get(function.as_str()).cloned();
        if let Some(action) = action {
            action(event);
        }

        if function == "Fail" {
            return Err(DispatchError::invocation_failed(target, function, "script error"));
        }
        Ok(())
    }
}

impl ScriptBridge for RecordingBridge {
    fn invoke_virtual(&self, object: &ObjectRef, function: &Name, event: &EventEnvelope) -> Result<()> {
        self.record(object.class_name().to_string(), function, event)
    }

    fn invoke_static(&self, type_name: &Name, function: &Name, event: &EventEnvelope) -> Result<()> {
        self.record(type_name.to_string(), function, event)
    }
}

/// Scriptable object with a fixed class
pub struct TestObject {
    class: Name,
}

impl TestObject {
    pub fn new(class: &str) -> ObjectRef {
        Arc::new(Self { class: Name::new(class) })
    }
}

impl Scriptable for TestObject {
    fn class_name(&self) -> Name {
        self.class.clone()
    }
}

/// Install/remove counters for one hook
#[derive(Default)]
pub struct HookCounts {
    pub installs: AtomicUsize,
    pub removes: AtomicUsize,
    pub armed: AtomicBool,
}

impl HookCounts {
    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

pub struct CountingHook(pub Arc<HookCounts>);

impl EngineHook for CountingHook {
    fn install(&self) -> Result<()> {
        assert!(!self.0.armed.swap(true, Ordering::SeqCst), "hook installed twice");
        self.0.installs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self) {
        assert!(self.0.armed.swap(false, Ordering::SeqCst), "hook removed while not installed");
        self.0.removes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hook factory handing out one counted hook per hook point
#[derive(Default)]
pub struct CountingHooks {
    counts: HashMap<HookPoint, Arc<HookCounts>>,
}

impl CountingHooks {
    pub fn new() -> Self {
        Self {
            counts: HookPoint::ALL
                .iter()
                .map(|point| (*point, Arc::new(HookCounts::default())))
                .collect(),
        }
    }

    pub fn counts(&self, point: HookPoint) -> &Arc<HookCounts> {
        &self.counts[&point]
    }
}

impl HookFactory for CountingHooks {
    fn create_hook(&self, point: HookPoint) -> Box<dyn EngineHook> {
        Box::new(CountingHook(self.counts[&point].clone()))
    }
}

/// Type tree with a script service hierarchy and a plain payload type
pub fn test_types() -> Arc<dyn TypeResolver> {
    let mut types = TypeRegistry::new();
    types
        .register(TypeDescriptor::new("IScriptable"))
        .register(TypeDescriptor::new(SCRIPTABLE_SERVICE).with_parent("IScriptable"))
        .register(TypeDescriptor::new("PhotoModeService").with_parent(SCRIPTABLE_SERVICE))
        .register(TypeDescriptor::new("inkGameController").with_parent("IScriptable"))
        .register(TypeDescriptor::new("CustomEvent"));
    Arc::new(types)
}
