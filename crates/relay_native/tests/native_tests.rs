//! Integration tests for the native entry layer

use std::sync::Arc;

use parking_lot::Mutex;
use relay_core::{Name, ObjectRef, TypeDescriptor, TypeRegistry, TypeResolver};
use relay_dispatch::controllers::{HookPoint, INPUT_KEY, VEHICLE_LIGHT_CONTROL};
use relay_dispatch::{EngineHook, Lifetime, NoHook, RelayConfig, ScriptBridge};
use relay_event::EventEnvelope;
use relay_native::*;

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl ScriptBridge for Recorder {
    fn invoke_virtual(&self, object: &ObjectRef, function: &Name, _: &EventEnvelope) -> relay_dispatch::Result<()> {
        self.0.lock().push(format!("{}::{}", object.class_name(), function));
        Ok(())
    }

    fn invoke_static(&self, type_name: &Name, function: &Name, event: &EventEnvelope) -> relay_dispatch::Result<()> {
        self.0
            .lock()
            .push(format!("{}::{} {}", type_name, function, event.to_json()));
        Ok(())
    }
}

fn runtime() -> (Runtime, Arc<Recorder>) {
    let mut types = TypeRegistry::new();
    types
        .register(TypeDescriptor::new("ScriptableService"))
        .register(TypeDescriptor::new("PhotoModeService").with_parent("ScriptableService"))
        .register(TypeDescriptor::new("ModEvent"));
    let recorder = Arc::new(Recorder::default());
    let no_hooks = |_: HookPoint| -> Box<dyn EngineHook> { Box::new(NoHook) };
    let runtime = Runtime::with_parts(
        RelayConfig::default(),
        Arc::new(types),
        recorder.clone(),
        &no_hooks,
        Arc::new(ObjectTable::new()),
    );
    (runtime, recorder)
}

#[test]
fn test_destroyed_object_handlers_expire() {
    let (runtime, recorder) = runtime();
    runtime.register_object_callback("ModEvent", (11, "inkGameController"), "OnEvent", None, None);

    runtime.dispatch_json(None, "ModEvent", "{}").unwrap();
    assert!(runtime.objects().release(11));
    let report = runtime.dispatch_json(None, "ModEvent", "{}").unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(*recorder.0.lock(), vec!["inkGameController::OnEvent"]);
}

#[test]
fn test_service_caller_registers_forever() {
    let (runtime, _) = runtime();
    runtime.register_object_callback(
        "ModEvent",
        (21, "inkGameController"),
        "OnEvent",
        None,
        Some((22, "PhotoModeService")),
    );

    let handlers = runtime.system().handlers(&Name::new("ModEvent"));
    assert_eq!(handlers[0].lifetime(), Lifetime::Forever);
}

#[test]
fn test_service_static_callback_survives_detach() {
    let (runtime, recorder) = runtime();
    let service = Some((31, "PhotoModeService"));
    runtime.register_static_callback("ModEvent", "Mod", "OnKept", None, service);
    runtime.register_static_callback("ModEvent", "Mod", "OnDropped", None, None);

    runtime.driver().on_world_attached(false);
    runtime.driver().on_before_world_detach();
    runtime.driver().on_world_detached();
    assert_eq!(runtime.driver().on_after_world_detach(), 1);

    runtime.dispatch_json(None, "ModEvent", "{}").unwrap();
    assert_eq!(*recorder.0.lock(), vec!["Mod::OnKept {}"]);
}

#[test]
fn test_dispatch_json() {
    let (runtime, recorder) = runtime();
    runtime.register_static_callback("Renamed", "Mod", "OnRenamed", None, None);

    let report = runtime.dispatch_json(Some("Renamed"), "ModEvent", r#"{"value":3}"#).unwrap();
    assert_eq!(report.invoked, 1);
    assert_eq!(*recorder.0.lock(), vec![r#"Mod::OnRenamed {"value":3}"#]);

    assert!(matches!(
        runtime.dispatch_json(None, "ModEvent", "{not json"),
        Err(NativeError::Payload(_))
    ));
}

#[test]
fn test_unregister_unknown_object() {
    let (runtime, _) = runtime();
    assert!(matches!(
        runtime.unregister_object_callback("ModEvent", 99, None),
        Err(NativeError::UnknownObject(99))
    ));
    assert_eq!(runtime.unregister_static_callback("ModEvent", "Mod", Some("OnEvent")), 0);
}

// ========== Fake host ==========

static HOST_LOG: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn host_log() -> Vec<String> {
    HOST_LOG.lock().clone()
}

fn text(s: FfiStr) -> String {
    unsafe { s.as_str() }.unwrap_or("<null>").to_string()
}

extern "C" fn install_hook(point: u32) -> bool {
    HOST_LOG.lock().push(format!("install {}", point));
    true
}

extern "C" fn remove_hook(point: u32) {
    HOST_LOG.lock().push(format!("remove {}", point));
}

extern "C" fn invoke_virtual(object: ObjectId, function: FfiStr, event: FfiStr, _payload: FfiStr) -> bool {
    HOST_LOG
        .lock()
        .push(format!("virtual {}::{} @{}", object, text(function), text(event)));
    true
}

extern "C" fn invoke_static(type_name: FfiStr, function: FfiStr, event: FfiStr, payload: FfiStr) -> bool {
    HOST_LOG.lock().push(format!(
        "static {}::{} @{} {}",
        text(type_name),
        text(function),
        text(event),
        text(payload)
    ));
    true
}

extern "C" fn type_exists(name: FfiStr) -> bool {
    text(name) != "Missing"
}

static SERVICE_BASE: &str = "ScriptableService";

extern "C" fn type_parent(name: FfiStr, out: *mut FfiStr<'static>) -> bool {
    if text(name) != "PhotoModeService" {
        return false;
    }
    unsafe { *out = FfiStr::new(SERVICE_BASE) };
    true
}

fn host_api() -> FfiHostApi {
    FfiHostApi {
        api_version: RELAY_API_VERSION,
        install_hook,
        remove_hook,
        invoke_virtual,
        invoke_static,
        type_exists,
        type_parent,
    }
}

#[test]
fn test_host_types() {
    let types = HostTypes::new(host_api());
    let service = types.resolve(&Name::new("PhotoModeService")).unwrap();
    assert_eq!(service.parent, Some(Name::new(SERVICE_BASE)));
    assert!(types.resolve(&Name::new("Missing")).is_none());
    assert!(types.is_subtype_of(&Name::new("PhotoModeService"), &Name::new(SERVICE_BASE)));
}

#[test]
fn test_version_mismatch() {
    let mut api = host_api();
    api.api_version = RELAY_API_VERSION + 1;
    assert!(matches!(
        Runtime::from_host(api, RelayConfig::default()),
        Err(NativeError::VersionMismatch { .. })
    ));
}

/// The only test touching the process-wide runtime
#[test]
fn test_c_abi_session() {
    let api = host_api();
    unsafe {
        assert!(relay_init(&api, FfiStr::null()));
        assert!(!relay_init(&api, FfiStr::null()));

        assert!(relay_register_event(FfiStr::new("ModEvent"), FfiStr::null()));
        assert!(!relay_register_event(FfiStr::new("Missing"), FfiStr::null()));

        assert!(relay_register_static_callback(
            FfiStr::new(INPUT_KEY),
            FfiStr::new("Mod"),
            FfiStr::new("OnKey"),
            -1,
            0,
            FfiStr::null(),
        ));
        assert!(relay_register_static_callback(
            FfiStr::new(VEHICLE_LIGHT_CONTROL),
            FfiStr::new("Mod"),
            FfiStr::new("OnLights"),
            -1,
            0,
            FfiStr::null(),
        ));
        assert!(relay_register_callback(
            FfiStr::new("ModEvent"),
            5,
            FfiStr::new("inkGameController"),
            FfiStr::new("OnModEvent"),
            -1,
            0,
            FfiStr::null(),
        ));
    }

    relay_on_world_attached(false);
    relay_hook_key(32, 0);
    relay_hook_vehicle_lights(42, 2, true);
    unsafe {
        assert_eq!(relay_dispatch_event(FfiStr::null(), FfiStr::new("ModEvent"), FfiStr::new("{}")), 1);
        assert_eq!(relay_dispatch_event(FfiStr::null(), FfiStr::null(), FfiStr::new("{}")), 0);
    }

    assert!(relay_object_destroyed(5));
    unsafe {
        assert_eq!(relay_dispatch_event(FfiStr::null(), FfiStr::new("ModEvent"), FfiStr::new("{}")), 0);
    }

    relay_on_before_world_detach();
    relay_on_world_detached();
    relay_on_after_world_detach();

    assert!(relay_shutdown());
    assert!(!relay_shutdown());
    assert!(!relay_is_pre_game());

    let raw_input = HookPoint::RawInput as u32;
    let lights = HookPoint::VehicleLightControl as u32;
    let mut log = host_log();
    // Teardown order follows map iteration
    let mut removes = log.split_off(5);
    assert_eq!(
        log,
        vec![
            format!("install {}", raw_input),
            format!("install {}", lights),
            r#"static Mod::OnKey @Input/Key {"action":"Press","key":32}"#.to_string(),
            r#"static Mod::OnLights @Vehicle/LightControl {"enabled":true,"light_type":2,"vehicle":42}"#.to_string(),
            "virtual 5::OnModEvent @ModEvent".to_string(),
        ]
    );
    let mut expected = vec![format!("remove {}", raw_input), format!("remove {}", lights)];
    removes.sort();
    expected.sort();
    assert_eq!(removes, expected);
}
