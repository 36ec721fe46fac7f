//! FFI types shared with the host
//!
//! The host hands Relay a table of function pointers at init time and calls
//! back into the exported `relay_*` functions. All types are `#[repr(C)]`.

use std::marker::PhantomData;

use relay_event::EntityInfo;

use crate::error::{NativeError, Result};

/// API version for compatibility checking
pub const RELAY_API_VERSION: u32 = 1;

/// Host object id; 0 means no object
pub type ObjectId = u64;

/// Borrowed UTF-8 string, not NUL terminated
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiStr<'a> {
    pub ptr: *const u8,
    pub len: usize,
    _marker: PhantomData<&'a str>,
}

impl<'a> FfiStr<'a> {
    pub const fn null() -> Self {
        Self {
            ptr: std::ptr::null(),
            len: 0,
            _marker: PhantomData,
        }
    }

    pub fn new(s: &'a str) -> Self {
        Self {
            ptr: s.as_ptr(),
            len: s.len(),
            _marker: PhantomData,
        }
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Borrow as `&str`; `None` for null or invalid UTF-8
    ///
    /// # Safety
    /// A non-null `ptr` must point to `len` readable bytes that outlive `'a`.
    pub unsafe fn as_str(&self) -> Option<&'a str> {
        if self.ptr.is_null() {
            return None;
        }
        let bytes = std::slice::from_raw_parts(self.ptr, self.len);
        std::str::from_utf8(bytes).ok()
    }

    /// Borrow as `&str`, naming the argument on failure
    ///
    /// # Safety
    /// Same as [`FfiStr::as_str`].
    pub unsafe fn arg(&self, name: &'static str) -> Result<&'a str> {
        self.as_str().ok_or(NativeError::InvalidString(name))
    }
}

/// Entity passed to entity hooks
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FfiEntity<'a> {
    pub id: u64,
    pub class_name: FfiStr<'a>,
    pub is_local_player: bool,
}

impl FfiEntity<'_> {
    /// Copy into an owned [`EntityInfo`]
    ///
    /// # Safety
    /// `class_name` must satisfy [`FfiStr::as_str`].
    pub unsafe fn to_info(&self) -> Result<EntityInfo> {
        let mut info = EntityInfo::new(self.id, self.class_name.arg("class_name")?);
        if self.is_local_player {
            info = info.local_player();
        }
        Ok(info)
    }
}

/// Arm an engine hook point; returns false if the host refused
pub type InstallHookFn = extern "C" fn(point: u32) -> bool;
/// Disarm an engine hook point
pub type RemoveHookFn = extern "C" fn(point: u32);
/// Call `function` on a live object with the payload as JSON
pub type InvokeVirtualFn =
    extern "C" fn(object: ObjectId, function: FfiStr, event: FfiStr, payload_json: FfiStr) -> bool;
/// Call a static `function` on a type with the payload as JSON
pub type InvokeStaticFn =
    extern "C" fn(type_name: FfiStr, function: FfiStr, event: FfiStr, payload_json: FfiStr) -> bool;
/// Check if the type system knows a type
pub type TypeExistsFn = extern "C" fn(name: FfiStr) -> bool;
/// Write the parent of a type into `out`; false if it has none.
/// The written string must stay valid for the life of the process.
pub type TypeParentFn = extern "C" fn(name: FfiStr, out: *mut FfiStr<'static>) -> bool;

/// Function table supplied by the host to `relay_init`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiHostApi {
    pub api_version: u32,
    pub install_hook: InstallHookFn,
    pub remove_hook: RemoveHookFn,
    pub invoke_virtual: InvokeVirtualFn,
    pub invoke_static: InvokeStaticFn,
    pub type_exists: TypeExistsFn,
    pub type_parent: TypeParentFn,
}

impl FfiHostApi {
    /// Reject tables built for a different ABI
    pub fn check_version(&self) -> Result<()> {
        if self.api_version != RELAY_API_VERSION {
            return Err(NativeError::VersionMismatch {
                expected: RELAY_API_VERSION,
                found: self.api_version,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for FfiHostApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfiHostApi")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_str() {
        let text = "Session/Ready";
        let s = FfiStr::new(text);
        assert_eq!(unsafe { s.as_str() }, Some(text));
        assert_eq!(unsafe { FfiStr::null().as_str() }, None);

        let bad = [0xffu8, 0xfe];
        let s = FfiStr {
            ptr: bad.as_ptr(),
            len: bad.len(),
            _marker: PhantomData,
        };
        assert!(matches!(unsafe { s.arg("event") }, Err(NativeError::InvalidString("event"))));
    }

    #[test]
    fn test_entity_conversion() {
        let entity = FfiEntity {
            id: 9,
            class_name: FfiStr::new("PlayerPuppet"),
            is_local_player: true,
        };
        let info = unsafe { entity.to_info() }.unwrap();
        assert_eq!(info.id, 9);
        assert_eq!(info.class_name, "PlayerPuppet");
        assert!(info.is_local_player);
    }
}
