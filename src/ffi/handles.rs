//! Opaque handle for settings objects exported to C
//!
//! # Handle validity
//!
//! Every pointer handed to C is recorded in a process-wide registry and
//! removed again when it is freed. A freed, foreign or null pointer is never
//! dereferenced: lookups return `None` and callers report
//! `PwqbStatus::InvalidHandle`. This turns double free and use-after-free into
//! errors instead of undefined behavior.

use crate::Settings;
use std::collections::HashSet;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

static LIVE_SETTINGS: LazyLock<Mutex<HashSet<usize>>> =
    LazyLock::new(|| Mutex::new(HashSet::new()));

// A panic while the lock was held cannot leave the set half-updated
fn live() -> MutexGuard<'static, HashSet<usize>> {
    LIVE_SETTINGS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Opaque handle for an exported settings object
///
/// # Safety
/// - Create with `pwqb_settings_new`
/// - Free with `pwqb_settings_free`
/// - Never dereference from C code
/// - Do not use one handle from two threads at the same time
#[repr(C)]
pub struct PwqbSettings {
    _private: [u8; 0],
}

impl PwqbSettings {
    /// Box `settings` and register the pointer.
    ///
    /// The pointer must eventually reach [`PwqbSettings::from_opaque_ptr`] or
    /// the native object leaks.
    pub(crate) fn into_opaque_ptr(settings: Settings) -> *mut Self {
        let ptr = Box::into_raw(Box::new(settings)).cast::<Self>();
        live().insert(ptr as usize);
        ptr
    }

    /// Unregister `ptr` and take the settings back.
    ///
    /// # Safety
    /// On `Some`, the pointer is consumed and must not be used again.
    pub(crate) unsafe fn from_opaque_ptr(ptr: *mut Self) -> Option<Settings> {
        if ptr.is_null() || !live().remove(&(ptr as usize)) {
            return None;
        }
        // SAFETY: only into_opaque_ptr registers pointers, and each is
        // unregistered exactly once
        Some(*unsafe { Box::from_raw(ptr.cast::<Settings>()) })
    }

    pub(crate) fn is_valid(ptr: *const Self) -> bool {
        !ptr.is_null() && live().contains(&(ptr as usize))
    }

    /// Borrow the settings behind a live handle.
    ///
    /// # Safety
    /// The handle must not be freed while the borrow is alive.
    pub(crate) unsafe fn as_ref<'a>(ptr: *const Self) -> Option<&'a Settings> {
        if !Self::is_valid(ptr) {
            return None;
        }
        // SAFETY: registered, so it points at a live boxed Settings
        Some(unsafe { &*ptr.cast::<Settings>() })
    }

    /// Mutably borrow the settings behind a live handle.
    ///
    /// # Safety
    /// As [`PwqbSettings::as_ref`], and no other borrow may exist.
    pub(crate) unsafe fn as_mut<'a>(ptr: *mut Self) -> Option<&'a mut Settings> {
        if !Self::is_valid(ptr) {
            return None;
        }
        // SAFETY: registered and exclusively borrowed per the contract above
        Some(unsafe { &mut *ptr.cast::<Settings>() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake;

    fn settings() -> Settings {
        fake::reset();
        Settings::new(&fake::api()).unwrap()
    }

    #[test]
    fn test_registered_until_taken_back() {
        let settings = settings();
        let ptr = PwqbSettings::into_opaque_ptr(settings);
        assert!(PwqbSettings::is_valid(ptr));

        unsafe {
            assert!(PwqbSettings::as_ref(ptr).is_some());
            let restored = PwqbSettings::from_opaque_ptr(ptr).expect("live handle");
            restored.release();
        }
        assert!(!PwqbSettings::is_valid(ptr));
        assert_eq!(fake::counters().frees, 1);
    }

    #[test]
    fn test_second_take_is_rejected() {
        let settings = settings();
        let ptr = PwqbSettings::into_opaque_ptr(settings);

        unsafe {
            assert!(PwqbSettings::from_opaque_ptr(ptr).is_some());
            assert!(PwqbSettings::from_opaque_ptr(ptr).is_none());
            assert!(PwqbSettings::as_mut(ptr).is_none());
        }
        assert_eq!(fake::counters().frees, 1);
    }

    #[test]
    fn test_null_and_foreign_pointers() {
        let null: *mut PwqbSettings = std::ptr::null_mut();
        let mut stack_byte = 0u8;
        let foreign = (&raw mut stack_byte).cast::<PwqbSettings>();

        for ptr in [null, foreign] {
            assert!(!PwqbSettings::is_valid(ptr));
            unsafe {
                assert!(PwqbSettings::from_opaque_ptr(ptr).is_none());
                assert!(PwqbSettings::as_ref(ptr).is_none());
                assert!(PwqbSettings::as_mut(ptr).is_none());
            }
        }
    }
}
