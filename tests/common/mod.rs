//! Common test utilities and fixtures for the pwquality-bridge test suite.
//!
//! Tests that need the native library call [`native_api`] and return early
//! when libpwquality cannot be loaded on the host.

#![allow(dead_code)]

pub mod fixtures;

use pwquality_bridge::{NativeApi, Settings};

/// Dynamically loaded table, from `PWQUALITY_LIBRARY` or the default sonames.
///
/// Returns `None` (and says so on stderr) when the library is unavailable.
pub fn native_api() -> Option<NativeApi> {
    let loaded = match std::env::var("PWQUALITY_LIBRARY") {
        Ok(path) if !path.is_empty() => NativeApi::load(path),
        _ => NativeApi::load_default(),
    };
    match loaded {
        Ok(api) => Some(api),
        Err(e) => {
            eprintln!("skipping: libpwquality unavailable ({})", e);
            None
        }
    }
}

/// Fresh handle with library defaults
pub fn default_settings(api: &NativeApi) -> Settings {
    Settings::new(api).expect("default settings should allocate")
}
