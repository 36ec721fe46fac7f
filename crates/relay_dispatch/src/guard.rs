//! Panic containment at the engine boundary
//!
//! Engine call sites cannot tolerate unwinding. Everything the engine calls
//! into, and every handler invocation, runs inside these wrappers.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run a closure, turning a panic into its message
pub fn catch_panic<F, R>(f: F) -> std::result::Result<R, String>
where
    F: FnOnce() -> R,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
}

/// Run an engine-facing operation, logging and swallowing any panic
pub fn contain<F, R>(operation: &str, f: F) -> Option<R>
where
    F: FnOnce() -> R,
{
    match catch_panic(f) {
        Ok(result) => Some(result),
        Err(message) => {
            log::error!("Panic in '{}': {}", operation, message);
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_panic() {
        assert_eq!(catch_panic(|| 42), Ok(42));

        let result: std::result::Result<i32, String> = catch_panic(|| panic!("Test panic"));
        assert!(result.unwrap_err().contains("Test panic"));

        let result: std::result::Result<(), String> = catch_panic(|| panic!("{} {}", "formatted", 1));
        assert_eq!(result.unwrap_err(), "formatted 1");
    }

    #[test]
    fn test_contain() {
        assert_eq!(contain("ok", || 7), Some(7));
        assert_eq!(contain::<_, ()>("boom", || panic!("boom")), None);
    }
}
