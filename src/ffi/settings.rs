//! C ABI over [`Settings`].
//!
//! Provides C-compatible functions with:
//! - Panic safety via catch_unwind
//! - Null pointer and handle validity checks
//! - Caller-owned output buffers (nothing allocated here is freed by C)
//! - Error reporting via `PwqbStatus`, with the raw libpwquality code where one exists

use crate::BindingConfig;
use crate::ffi::error::PwqbStatus;
use crate::ffi::handles::PwqbSettings;
use libc::{c_char, c_int};
use std::ffi::CStr;
use std::panic::{AssertUnwindSafe, catch_unwind};
use zeroize::Zeroize;

/// Create a settings handle configured from the environment
/// (`PWQUALITY_BINDING`, `PWQUALITY_LIBRARY`, `PWQUALITY_CONFIG`).
///
/// # Returns
/// Opaque handle, or null on failure. Must be freed with `pwqb_settings_free`.
///
/// # Parameters
/// - `status_out`: Optional pointer to receive the status (may be null)
///
/// # Safety
/// - `status_out` must be null or point to writable memory
/// - Function is panic-safe and will never unwind across FFI boundary
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pwqb_settings_new(status_out: *mut PwqbStatus) -> *mut PwqbSettings {
    let result = catch_unwind(|| match BindingConfig::from_env().and_then(|c| c.build()) {
        Ok(settings) => (PwqbStatus::Ok, PwqbSettings::into_opaque_ptr(settings)),
        Err(e) => (PwqbStatus::from(&e), std::ptr::null_mut()),
    });
    let (status, handle) = result.unwrap_or((PwqbStatus::Panic, std::ptr::null_mut()));
    if !status_out.is_null() {
        // SAFETY: checked non-null; caller guarantees it is writable
        unsafe { *status_out = status };
    }
    handle
}

/// Free a settings handle.
///
/// # Returns
/// - `PwqbStatus::Ok` when the handle was live and is now freed
/// - `PwqbStatus::NullPointer` for null
/// - `PwqbStatus::InvalidHandle` for an already-freed or unknown handle
///   (nothing is freed)
///
/// # Safety
/// - Function is panic-safe and will never unwind across FFI boundary
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pwqb_settings_free(handle: *mut PwqbSettings) -> PwqbStatus {
    if handle.is_null() {
        return PwqbStatus::NullPointer;
    }
    let result = catch_unwind(|| {
        // SAFETY: from_opaque_ptr rejects freed and unknown handles
        match unsafe { PwqbSettings::from_opaque_ptr(handle) } {
            Some(settings) => {
                settings.release();
                PwqbStatus::Ok
            }
            None => PwqbStatus::InvalidHandle,
        }
    });
    result.unwrap_or(PwqbStatus::Panic)
}

/// Apply a `name=value` setting.
///
/// # Safety
/// - `setting` must be null or a NUL-terminated string
/// - `handle` must not be used concurrently from another thread
/// - Function is panic-safe and will never unwind across FFI boundary
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pwqb_settings_set_option(
    handle: *mut PwqbSettings,
    setting: *const c_char,
) -> PwqbStatus {
    let result = catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || setting.is_null() {
            return PwqbStatus::NullPointer;
        }
        // SAFETY: registry-checked handle; caller guarantees exclusive use
        let Some(settings) = (unsafe { PwqbSettings::as_mut(handle) }) else {
            return PwqbStatus::InvalidHandle;
        };
        // SAFETY: checked non-null; caller guarantees NUL termination
        let Ok(text) = unsafe { CStr::from_ptr(setting) }.to_str() else {
            return PwqbStatus::Marshal;
        };
        match settings.apply_setting(text) {
            Ok(()) => PwqbStatus::Ok,
            Err(e) => PwqbStatus::from(&e),
        }
    }));
    result.unwrap_or(PwqbStatus::Panic)
}

/// Check a password.
///
/// # Parameters
/// - `password`: NUL-terminated password (must not be null)
/// - `old_password`: NUL-terminated previous password, or null
/// - `score_out`: Receives the score (0-100) on success (must not be null)
/// - `native_code_out`: Receives the libpwquality return code (may be null);
///   negative when the check failed in native code, 0 otherwise
///
/// # Safety
/// - String pointers must be null or NUL-terminated
/// - Output pointers must be null or writable
/// - Function is panic-safe and will never unwind across FFI boundary
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pwqb_check(
    handle: *const PwqbSettings,
    password: *const c_char,
    old_password: *const c_char,
    score_out: *mut c_int,
    native_code_out: *mut c_int,
) -> PwqbStatus {
    let result = catch_unwind(AssertUnwindSafe(|| {
        if !native_code_out.is_null() {
            // SAFETY: checked non-null
            unsafe { *native_code_out = 0 };
        }
        if handle.is_null() || password.is_null() || score_out.is_null() {
            return PwqbStatus::NullPointer;
        }
        // SAFETY: registry-checked handle
        let Some(settings) = (unsafe { PwqbSettings::as_ref(handle) }) else {
            return PwqbStatus::InvalidHandle;
        };
        // SAFETY: checked non-null; caller guarantees NUL termination
        let Ok(password) = unsafe { CStr::from_ptr(password) }.to_str() else {
            return PwqbStatus::Marshal;
        };
        let old_password = if old_password.is_null() {
            None
        } else {
            // SAFETY: as above
            match unsafe { CStr::from_ptr(old_password) }.to_str() {
                Ok(old) => Some(old),
                Err(_) => return PwqbStatus::Marshal,
            }
        };

        match settings.check(password, old_password) {
            Ok(score) => {
                // SAFETY: checked non-null; score is at most 100
                unsafe { *score_out = score as c_int };
                PwqbStatus::Ok
            }
            Err(e) => {
                if let (Some(code), false) = (e.code(), native_code_out.is_null()) {
                    // SAFETY: checked non-null
                    unsafe { *native_code_out = code };
                }
                PwqbStatus::from(&e)
            }
        }
    }));
    result.unwrap_or(PwqbStatus::Panic)
}

/// Generate a password into a caller buffer.
///
/// # Parameters
/// - `entropy_bits`: Entropy to request, or 0 for the handle's default
/// - `output`: Buffer receiving the NUL-terminated password (must not be null)
/// - `output_len`: On input, size of `output`; on output, bytes written
///   including the NUL, or the required size if `BufferTooSmall`
///
/// # Safety
/// - `output` must be writable for `*output_len` bytes
/// - Function is panic-safe and will never unwind across FFI boundary
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pwqb_generate(
    handle: *const PwqbSettings,
    entropy_bits: u32,
    output: *mut c_char,
    output_len: *mut usize,
) -> PwqbStatus {
    let result = catch_unwind(AssertUnwindSafe(|| {
        if handle.is_null() || output.is_null() || output_len.is_null() {
            return PwqbStatus::NullPointer;
        }
        // SAFETY: registry-checked handle
        let Some(settings) = (unsafe { PwqbSettings::as_ref(handle) }) else {
            return PwqbStatus::InvalidHandle;
        };
        let generated = if entropy_bits == 0 {
            settings.generate()
        } else {
            settings.generate_with_entropy(entropy_bits)
        };
        let mut password = match generated {
            Ok(password) => password,
            Err(e) => return PwqbStatus::from(&e),
        };

        let required = password.len() + 1;
        // SAFETY: checked non-null
        let available = unsafe { *output_len };
        let status = if required > available {
            PwqbStatus::BufferTooSmall
        } else {
            // SAFETY: output is writable for available >= required bytes
            unsafe {
                std::ptr::copy_nonoverlapping(
                    password.as_ptr().cast::<c_char>(),
                    output,
                    password.len(),
                );
                *output.add(password.len()) = 0;
            }
            PwqbStatus::Ok
        };
        // SAFETY: checked non-null
        unsafe { *output_len = required };
        password.zeroize();
        status
    }));
    result.unwrap_or(PwqbStatus::Panic)
}
