//! Exported C entry points
//!
//! Nothing here may unwind into the host: every function runs inside
//! [`guard::contain`] and reports failure through its return value.

use std::path::Path;

use relay_dispatch::controllers::{
    EntityLifecycleHook, EntityStage, HookPoint, PlayerSpawnedHook, RawInputHook, ResourceLoadHook,
    ResourceReadyHook, VehicleLightControlHook,
};
use relay_dispatch::guard;
use relay_dispatch::RelayConfig;

use crate::error::{NativeError, Result};
use crate::ffi::{FfiEntity, FfiHostApi, FfiStr, ObjectId};
use crate::logger;
use crate::runtime::{self, Runtime};

/// Run `f` against the live runtime, containing errors and panics
fn with_runtime<R>(entry: &str, fallback: R, f: impl FnOnce(&Runtime) -> Result<R>) -> R {
    let outcome = guard::contain(entry, || runtime::current().and_then(|runtime| f(&runtime)));
    match outcome {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            log::warn!("{}: {}", entry, e);
            fallback
        }
        None => fallback,
    }
}

/// Negative means "not specified"
fn sticky_arg(raw: i32) -> Option<bool> {
    (raw >= 0).then_some(raw > 0)
}

// ========== Init / Shutdown ==========

/// Start Relay. `config_path` may be null to use the default lookup.
///
/// # Safety
/// `api` must be null or point to a valid host table; `config_path` must be
/// null or valid UTF-8 for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn relay_init(api: *const FfiHostApi, config_path: FfiStr) -> bool {
    guard::contain("relay_init", || {
        let config = RelayConfig::load(config_path.as_str().map(Path::new));
        logger::init(&config.log_filter);

        let Some(api) = api.as_ref() else {
            log::error!("relay_init: host table is null");
            return false;
        };

        match Runtime::from_host(*api, config).and_then(runtime::install) {
            Ok(_) => {
                log::info!("Relay initialized");
                true
            }
            Err(e) => {
                log::error!("relay_init: {}", e);
                false
            }
        }
    })
    .unwrap_or(false)
}

/// Stop Relay and drop every handler
#[no_mangle]
pub extern "C" fn relay_shutdown() -> bool {
    guard::contain("relay_shutdown", runtime::shutdown).unwrap_or(false)
}

// ========== World / Session Lifecycle ==========

#[no_mangle]
pub extern "C" fn relay_on_world_attached(pre_game: bool) {
    with_runtime("relay_on_world_attached", (), |rt| {
        rt.driver().on_world_attached(pre_game);
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_on_game_load() {
    with_runtime("relay_on_game_load", (), |rt| {
        rt.driver().on_game_load();
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_on_game_prepared() {
    with_runtime("relay_on_game_prepared", (), |rt| {
        rt.driver().on_game_prepared();
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_on_game_restored() {
    with_runtime("relay_on_game_restored", (), |rt| {
        rt.driver().on_game_restored();
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_on_before_game_save() {
    with_runtime("relay_on_before_game_save", (), |rt| {
        rt.driver().on_before_game_save();
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_on_after_game_save() {
    with_runtime("relay_on_after_game_save", (), |rt| {
        rt.driver().on_after_game_save();
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_on_game_paused() {
    with_runtime("relay_on_game_paused", (), |rt| {
        rt.driver().on_game_paused();
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_on_game_resumed() {
    with_runtime("relay_on_game_resumed", (), |rt| {
        rt.driver().on_game_resumed();
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_on_before_world_detach() {
    with_runtime("relay_on_before_world_detach", (), |rt| {
        rt.driver().on_before_world_detach();
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_on_world_detached() {
    with_runtime("relay_on_world_detached", (), |rt| {
        rt.driver().on_world_detached();
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_on_after_world_detach() {
    with_runtime("relay_on_after_world_detach", (), |rt| {
        rt.driver().on_after_world_detach();
        Ok(())
    })
}

// ========== Hook Trampolines ==========

/// Entity hook fired. `point` is one of the entity hook points or
/// `PlayerSpawned`.
///
/// # Safety
/// `entity.class_name` must be valid UTF-8 for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn relay_hook_entity(point: u32, entity: FfiEntity) {
    with_runtime("relay_hook_entity", (), |rt| {
        let point = HookPoint::from_raw(point).ok_or(NativeError::UnknownHookPoint(point))?;
        let info = entity.to_info()?;
        let system = rt.system();

        if point == HookPoint::PlayerSpawned {
            if let Some(hook) = system.controller::<PlayerSpawnedHook>(point.controller_name()) {
                hook.on_player_attached(system, info);
            }
            return Ok(());
        }

        EntityStage::from_hook_point(point).ok_or(NativeError::UnknownHookPoint(point as u32))?;
        if let Some(hook) = system.controller::<EntityLifecycleHook>(point.controller_name()) {
            hook.on_entity(system, info);
        }
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_hook_key(key: u32, action: u8) {
    with_runtime("relay_hook_key", (), |rt| {
        if let Some(hook) = rt.system().controller::<RawInputHook>(HookPoint::RawInput.controller_name()) {
            hook.on_key(rt.system(), key, action);
        }
        Ok(())
    })
}

#[no_mangle]
pub extern "C" fn relay_hook_axis(axis: u32, value: f32) {
    with_runtime("relay_hook_axis", (), |rt| {
        if let Some(hook) = rt.system().controller::<RawInputHook>(HookPoint::RawInput.controller_name()) {
            hook.on_axis(rt.system(), axis, value);
        }
        Ok(())
    })
}

/// # Safety
/// `path` must be valid UTF-8 for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn relay_hook_resource_load(path: FfiStr) {
    with_runtime("relay_hook_resource_load", (), |rt| {
        let path = path.arg("path")?;
        let name = HookPoint::ResourceLoad.controller_name();
        if let Some(hook) = rt.system().controller::<ResourceLoadHook>(name) {
            hook.on_load(rt.system(), path);
        }
        Ok(())
    })
}

/// `post_load` selects `Resource/PostLoad` over `Resource/Ready`.
///
/// # Safety
/// `path` must be valid UTF-8 for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn relay_hook_resource_ready(path: FfiStr, post_load: bool) {
    with_runtime("relay_hook_resource_ready", (), |rt| {
        let path = path.arg("path")?;
        let name = HookPoint::ResourceReady.controller_name();
        if let Some(hook) = rt.system().controller::<ResourceReadyHook>(name) {
            if post_load {
                hook.on_post_load(rt.system(), path);
            } else {
                hook.on_resource_ready(rt.system(), path);
            }
        }
        Ok(())
    })
}

/// Vehicle lights switched. `light_type` is the engine's light type mask.
#[no_mangle]
pub extern "C" fn relay_hook_vehicle_lights(vehicle: u64, light_type: u32, enabled: bool) {
    with_runtime("relay_hook_vehicle_lights", (), |rt| {
        let name = HookPoint::VehicleLightControl.controller_name();
        if let Some(hook) = rt.system().controller::<VehicleLightControlHook>(name) {
            hook.on_light_control(rt.system(), vehicle, light_type, enabled);
        }
        Ok(())
    })
}

// ========== Script Surface ==========

/// Declare an event. `type_hint` may be null.
///
/// # Safety
/// String arguments must be null or valid UTF-8 for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn relay_register_event(event: FfiStr, type_hint: FfiStr) -> bool {
    with_runtime("relay_register_event", false, |rt| {
        let event = event.arg("event")?;
        let type_hint = type_hint.as_str().map(relay_core::Name::new);
        Ok(rt.system().register_event(event, type_hint))
    })
}

/// Frame object a registration came from; 0 means none
unsafe fn caller_arg<'a>(caller: ObjectId, caller_class: FfiStr<'a>) -> Result<Option<(ObjectId, &'a str)>> {
    match caller {
        0 => Ok(None),
        id => Ok(Some((id, caller_class.arg("caller_class")?))),
    }
}

/// Register a method of a host object. `caller` is 0 when the call did not
/// come from an object's script frame. `sticky` < 0 means unspecified.
///
/// # Safety
/// String arguments must be valid UTF-8 for the duration of the call;
/// `caller_class` may be null when `caller` is 0.
#[no_mangle]
pub unsafe extern "C" fn relay_register_callback(
    event: FfiStr,
    object: ObjectId,
    class: FfiStr,
    function: FfiStr,
    sticky: i32,
    caller: ObjectId,
    caller_class: FfiStr,
) -> bool {
    with_runtime("relay_register_callback", false, |rt| {
        rt.register_object_callback(
            event.arg("event")?,
            (object, class.arg("class")?),
            function.arg("function")?,
            sticky_arg(sticky),
            caller_arg(caller, caller_class)?,
        );
        Ok(true)
    })
}

/// Register a static function. `caller` and `sticky` as for
/// [`relay_register_callback`].
///
/// # Safety
/// String arguments must be valid UTF-8 for the duration of the call;
/// `caller_class` may be null when `caller` is 0.
#[no_mangle]
pub unsafe extern "C" fn relay_register_static_callback(
    event: FfiStr,
    type_name: FfiStr,
    function: FfiStr,
    sticky: i32,
    caller: ObjectId,
    caller_class: FfiStr,
) -> bool {
    with_runtime("relay_register_static_callback", false, |rt| {
        rt.register_static_callback(
            event.arg("event")?,
            type_name.arg("type_name")?,
            function.arg("function")?,
            sticky_arg(sticky),
            caller_arg(caller, caller_class)?,
        );
        Ok(true)
    })
}

/// Remove handlers of an object; null `function` removes all of them.
/// Returns the number removed.
///
/// # Safety
/// String arguments must be null or valid UTF-8 for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn relay_unregister_callback(event: FfiStr, object: ObjectId, function: FfiStr) -> u32 {
    with_runtime("relay_unregister_callback", 0, |rt| {
        let removed = rt.unregister_object_callback(event.arg("event")?, object, function.as_str())?;
        Ok(removed as u32)
    })
}

/// # Safety
/// String arguments must be null or valid UTF-8 for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn relay_unregister_static_callback(
    event: FfiStr,
    type_name: FfiStr,
    function: FfiStr,
) -> u32 {
    with_runtime("relay_unregister_static_callback", 0, |rt| {
        let removed =
            rt.unregister_static_callback(event.arg("event")?, type_name.arg("type_name")?, function.as_str());
        Ok(removed as u32)
    })
}

/// Dispatch a script payload. A null `event` delivers under the type name.
/// Returns the number of handlers invoked.
///
/// # Safety
/// String arguments must be null or valid UTF-8 for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn relay_dispatch_event(event: FfiStr, type_name: FfiStr, payload_json: FfiStr) -> u32 {
    with_runtime("relay_dispatch_event", 0, |rt| {
        let report = rt.dispatch_json(event.as_str(), type_name.arg("type_name")?, payload_json.arg("payload_json")?)?;
        Ok(report.invoked as u32)
    })
}

/// Host destroyed an object; its handlers expire
#[no_mangle]
pub extern "C" fn relay_object_destroyed(object: ObjectId) -> bool {
    with_runtime("relay_object_destroyed", false, |rt| Ok(rt.objects().release(object)))
}

#[no_mangle]
pub extern "C" fn relay_is_pre_game() -> bool {
    with_runtime("relay_is_pre_game", false, |rt| Ok(rt.system().is_pre_game()))
}

#[no_mangle]
pub extern "C" fn relay_is_restored() -> bool {
    with_runtime("relay_is_restored", false, |rt| Ok(rt.system().is_restored()))
}
