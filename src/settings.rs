//! Safe owner of one native `pwquality_settings_t`.
//!
//! # Lifecycle
//!
//! A [`Settings`] value owns exactly one native settings object from the moment
//! `pwquality_default_settings` returns it. The object is freed exactly once:
//! by [`Settings::release`], which consumes the value, or by `Drop` on every
//! other exit path, including a failure half-way through
//! [`Settings::with_options`]. There is no way to name a released handle, so a
//! second release does not compile.
//!
//! # Threads
//!
//! `Settings` is `Send` but not `Sync`. Independent handles share no native
//! state and may be used from different threads at the same time. A single
//! handle must not be used concurrently; wrap it in a `Mutex` if it has to be
//! shared.

use crate::api::NativeApi;
use crate::error::{PwqError, Result, translate};
use crate::options::{OptionName, OptionValue, ValueType, parse_setting};
use crate::sys;
use libc::{c_char, c_int, c_void};
use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::path::Path;
use std::ptr::{self, NonNull};
use zeroize::Zeroize;

/// Entropy requested from `pwquality_generate` unless configured otherwise
pub const DEFAULT_ENTROPY_BITS: u32 = 64;

/// Snapshot of every option value, keyed by configuration-file name
pub type OptionSnapshot = BTreeMap<String, OptionValue>;

/// Password-quality settings owned by libpwquality
pub struct Settings {
    raw: NonNull<sys::pwquality_settings_t>,
    api: NativeApi,
    entropy_bits: u32,
    // Opts out of Sync; Send is restored below
    _not_sync: PhantomData<std::cell::Cell<()>>,
}

// SAFETY: the native object is reachable only through this value and
// libpwquality keeps no thread-local or global state per settings object
unsafe impl Send for Settings {}

impl Settings {
    /// Allocate a settings object with the library defaults.
    pub fn new(api: &NativeApi) -> Result<Self> {
        // SAFETY: no preconditions
        let raw = unsafe { (api.default_settings)() };
        let raw = NonNull::new(raw).ok_or_else(|| {
            PwqError::Allocation("pwquality_default_settings returned NULL".to_string())
        })?;
        tracing::debug!(binding = %api.binding(), "allocated pwquality settings");
        Ok(Settings {
            raw,
            api: api.clone(),
            entropy_bits: DEFAULT_ENTROPY_BITS,
            _not_sync: PhantomData,
        })
    }

    /// Allocate and apply `options` in order.
    ///
    /// If any option is rejected the new object is released before the error
    /// is returned.
    pub fn with_options<I, N, V>(api: &NativeApi, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<OptionValue>,
    {
        let mut settings = Settings::new(api)?;
        for (name, value) in options {
            settings.set_option(name.as_ref(), value)?;
        }
        Ok(settings)
    }

    /// Binding technique this handle calls through
    pub fn api(&self) -> &NativeApi {
        &self.api
    }

    pub fn entropy_bits(&self) -> u32 {
        self.entropy_bits
    }

    /// Entropy used by [`Settings::generate`]. The library clamps it to
    /// 56..=256 bits.
    pub fn set_entropy_bits(&mut self, bits: u32) {
        self.entropy_bits = bits;
    }

    /// Set an option by its configuration-file name.
    pub fn set_option(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        let option: OptionName = name.parse()?;
        self.set(option, value.into())
    }

    /// Read an option by its configuration-file name.
    pub fn get_option(&self, name: &str) -> Result<OptionValue> {
        let option: OptionName = name.parse()?;
        self.get(option)
    }

    /// Set a typed option after validating its type and range.
    pub fn set(&mut self, option: OptionName, value: OptionValue) -> Result<()> {
        option.validate(&value)?;
        self.store(option, &value)
    }

    fn store(&mut self, option: OptionName, value: &OptionValue) -> Result<()> {
        let rc = match value {
            OptionValue::Int(v) => {
                // SAFETY: raw is live for the lifetime of self
                unsafe { (self.api.set_int_value)(self.raw.as_ptr(), option.setting(), *v) }
            }
            OptionValue::Str(s) => {
                let text = to_cstring(s)?;
                let text_ptr = if s.is_empty() {
                    ptr::null()
                } else {
                    text.as_ptr()
                };
                // SAFETY: the library copies the string before returning
                unsafe { (self.api.set_str_value)(self.raw.as_ptr(), option.setting(), text_ptr) }
            }
        };
        tracing::trace!(option = option.name(), %value, rc, "pwquality_set_*_value");
        translate(&self.api, rc, ptr::null_mut())?;
        Ok(())
    }

    /// Read a typed option.
    pub fn get(&self, option: OptionName) -> Result<OptionValue> {
        match option.value_type() {
            ValueType::Int => {
                let mut value: c_int = 0;
                // SAFETY: raw is live; value is a valid out-pointer
                let rc = unsafe {
                    (self.api.get_int_value)(self.raw.as_ptr(), option.setting(), &mut value)
                };
                translate(&self.api, rc, ptr::null_mut())?;
                Ok(OptionValue::Int(value))
            }
            ValueType::Str => {
                let mut value: *const c_char = ptr::null();
                // SAFETY: raw is live; value is a valid out-pointer
                let rc = unsafe {
                    (self.api.get_str_value)(self.raw.as_ptr(), option.setting(), &mut value)
                };
                translate(&self.api, rc, ptr::null_mut())?;
                if value.is_null() {
                    return Ok(OptionValue::Str(String::new()));
                }
                // SAFETY: the string stays owned by the settings object, which
                // is not mutated while this borrow is alive
                let text = unsafe { CStr::from_ptr(value) };
                text.to_str()
                    .map(|s| OptionValue::Str(s.to_string()))
                    .map_err(|e| PwqError::Marshal(format!("{} is not UTF-8: {}", option, e)))
            }
        }
    }

    /// Apply a `name=value` line through the library's own parser.
    ///
    /// The name and value are validated against the option table first, so an
    /// unknown name never reaches native code. Set-only flags
    /// (`enforce_for_root`, `local_users_only`) go through the typed setter:
    /// the native parser ignores their value and always stores 1.
    pub fn apply_setting(&mut self, text: &str) -> Result<()> {
        let (option, value) = parse_setting(text)?;
        if option.is_set_only() {
            return self.store(option, &value);
        }
        let line = to_cstring(&format!("{}={}", option.name(), value))?;
        // SAFETY: raw is live; line is NUL-terminated
        let rc = unsafe { (self.api.set_option)(self.raw.as_ptr(), line.as_ptr()) };
        tracing::trace!(option = option.name(), rc, "pwquality_set_option");
        translate(&self.api, rc, ptr::null_mut())?;
        Ok(())
    }

    /// Load settings from a `pwquality.conf` file, or from the system default
    /// file (and its `.d` directory) when `path` is `None`.
    pub fn read_config(&mut self, path: Option<&Path>) -> Result<()> {
        let path = path
            .map(|p| {
                p.to_str()
                    .ok_or_else(|| PwqError::Marshal(format!("{} is not UTF-8", p.display())))
                    .and_then(to_cstring)
            })
            .transpose()?;
        let path_ptr = path.as_ref().map_or(ptr::null(), |p| p.as_ptr());
        let mut auxerror: *mut c_void = ptr::null_mut();
        // SAFETY: raw is live; path_ptr is null or NUL-terminated; auxerror is
        // consumed by translate
        let rc = unsafe { (self.api.read_config)(self.raw.as_ptr(), path_ptr, &mut auxerror) };
        tracing::debug!(rc, "pwquality_read_config");
        translate(&self.api, rc, auxerror)?;
        Ok(())
    }

    /// Generate a password with the handle's entropy budget.
    pub fn generate(&self) -> Result<String> {
        self.generate_with_entropy(self.entropy_bits)
    }

    /// Generate a password with `bits` of entropy.
    pub fn generate_with_entropy(&self, bits: u32) -> Result<String> {
        let bits = c_int::try_from(bits).unwrap_or(sys::PWQ_MAX_ENTROPY_BITS);
        let mut password: *mut c_char = ptr::null_mut();
        // SAFETY: raw is live; password is a valid out-pointer
        let rc = unsafe { (self.api.generate)(self.raw.as_ptr(), bits, &mut password) };
        tracing::trace!(bits, rc, "pwquality_generate");
        // Take ownership before translating so the buffer is freed on every path
        let buffer = NonNull::new(password).map(|ptr| NativeBuffer::new(ptr, self.api.free_buffer));
        translate(&self.api, rc, ptr::null_mut())?;
        let buffer = buffer.ok_or_else(|| {
            PwqError::Marshal("pwquality_generate succeeded without a password".to_string())
        })?;
        buffer.to_text()
    }

    /// Check `password` and return its quality score (0..=100).
    pub fn check(&self, password: &str, old_password: Option<&str>) -> Result<u32> {
        self.check_with_user(password, old_password, None)
    }

    /// Check `password`, also comparing it with `user`'s name and GECOS field.
    ///
    /// An empty `old_password` or `user` is passed to the library as NULL,
    /// the same as `None`.
    pub fn check_with_user(
        &self,
        password: &str,
        old_password: Option<&str>,
        user: Option<&str>,
    ) -> Result<u32> {
        let password = to_cstring(password)?;
        let old_password = non_empty(old_password).map(to_cstring).transpose()?;
        let user = non_empty(user).map(to_cstring).transpose()?;
        let mut auxerror: *mut c_void = ptr::null_mut();

        // SAFETY: raw is live; strings are NUL-terminated and outlive the call;
        // auxerror is consumed by translate
        let rc = unsafe {
            (self.api.check)(
                self.raw.as_ptr(),
                password.as_ptr(),
                old_password.as_ref().map_or(ptr::null(), |s| s.as_ptr()),
                user.as_ref().map_or(ptr::null(), |s| s.as_ptr()),
                &mut auxerror,
            )
        };
        tracing::trace!(rc, "pwquality_check");
        let score = translate(&self.api, rc, auxerror)?;
        Ok(score.unsigned_abs())
    }

    /// Current value of every option.
    pub fn options(&self) -> Result<OptionSnapshot> {
        OptionName::all()
            .map(|option| Ok((option.name().to_string(), self.get(option)?)))
            .collect()
    }

    /// Independent copy made through the native constructor and accessors.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Settings::new(&self.api)?;
        for option in OptionName::all() {
            // Values loaded from a config file may lie outside the accepted ranges
            let value = self.get(option)?;
            copy.store(option, &value)?;
        }
        copy.entropy_bits = self.entropy_bits;
        Ok(copy)
    }

    /// Free the native object now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Settings {
    fn drop(&mut self) {
        // SAFETY: raw came from pwquality_default_settings and Drop runs once
        unsafe { (self.api.free_settings)(self.raw.as_ptr()) };
        tracing::debug!(binding = %self.api.binding(), "released pwquality settings");
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("binding", &self.api.binding())
            .field("entropy_bits", &self.entropy_bits)
            .finish_non_exhaustive()
    }
}

/// String handed over by `pwquality_generate`, released with `free`
struct NativeBuffer {
    ptr: NonNull<c_char>,
    free: sys::FreeBufferFn,
}

impl NativeBuffer {
    fn new(ptr: NonNull<c_char>, free: sys::FreeBufferFn) -> Self {
        NativeBuffer { ptr, free }
    }

    fn to_text(&self) -> Result<String> {
        // SAFETY: the library returns a NUL-terminated string
        let text = unsafe { CStr::from_ptr(self.ptr.as_ptr()) };
        text.to_str()
            .map(str::to_string)
            .map_err(|e| PwqError::Marshal(format!("generated password is not UTF-8: {}", e)))
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        // SAFETY: the buffer is NUL-terminated, exclusively ours, and `free`
        // matches the allocator the library used
        unsafe {
            let len = libc::strlen(self.ptr.as_ptr());
            std::slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<u8>(), len).zeroize();
            (self.free)(self.ptr.as_ptr().cast::<c_void>());
        }
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

fn to_cstring(text: &str) -> Result<CString> {
    CString::new(text)
        .map_err(|e| PwqError::Marshal(format!("interior NUL at byte {}", e.nul_position())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn test_settings_is_send() {
        assert_send::<Settings>();
    }

    #[test]
    fn test_interior_nul_is_marshal_error() {
        let err = to_cstring("pass\0word").unwrap_err();
        assert_eq!(err, PwqError::Marshal("interior NUL at byte 4".to_string()));
        assert!(to_cstring("password").is_ok());
    }

    #[test]
    fn test_native_buffer_reads_and_frees() {
        // SAFETY: strdup returns a malloc'ed copy, released by NativeBuffer
        let raw = unsafe { libc::strdup(c"Zephyr-plume-42".as_ptr()) };
        let buffer = NativeBuffer::new(NonNull::new(raw).unwrap(), libc::free);
        assert_eq!(buffer.to_text().unwrap(), "Zephyr-plume-42");
    }

    #[test]
    fn test_native_buffer_rejects_invalid_utf8() {
        // SAFETY: as above
        let raw = unsafe { libc::strdup(c"\xff\xfe".as_ptr()) };
        let buffer = NativeBuffer::new(NonNull::new(raw).unwrap(), libc::free);
        assert!(matches!(buffer.to_text(), Err(PwqError::Marshal(_))));
    }

    mod without_library {
        use super::*;
        use crate::api::fake;
        use crate::error::ErrorKind;

        fn settings() -> Settings {
            fake::reset();
            Settings::new(&fake::api()).unwrap()
        }

        #[test]
        fn test_release_frees_once() {
            let settings = settings();
            settings.release();
            let counters = fake::counters();
            assert_eq!((counters.allocations, counters.frees), (1, 1));
        }

        #[test]
        fn test_drop_frees_once() {
            {
                let _settings = settings();
            }
            assert_eq!(fake::counters().frees, 1);
        }

        #[test]
        fn test_null_from_constructor_is_allocation_error() {
            fake::reset();
            fake::fail_allocation(true);
            let err = Settings::new(&fake::api()).unwrap_err();
            assert!(matches!(err, PwqError::Allocation(_)));
            assert_eq!(fake::counters().frees, 0);
        }

        #[test]
        fn test_partial_with_options_releases_handle() {
            fake::reset();
            let result = Settings::with_options(&fake::api(), [("minlen", 10), ("nosuchoption", 1)]);
            assert!(matches!(result, Err(PwqError::InvalidOption { .. })));
            let counters = fake::counters();
            assert_eq!((counters.allocations, counters.frees), (1, 1));
        }

        #[test]
        fn test_generated_buffer_freed_on_success() {
            let settings = settings();
            assert_eq!(settings.generate().unwrap(), "Fake-generated-9!");
            assert_eq!(fake::counters().buffer_frees, 1);
        }

        #[test]
        fn test_generated_buffer_freed_on_error() {
            let settings = settings();
            fake::generate_returns(sys::PWQ_ERROR_GENERATION_FAILED);
            let err = settings.generate().unwrap_err();
            assert_eq!(err.kind(), Some(ErrorKind::GenerationFailed));
            assert_eq!(fake::counters().buffer_frees, 1);
        }

        #[test]
        fn test_check_codes_become_distinct_kinds() {
            let settings = settings();
            let kind = |password: &str, old: Option<&str>| settings.check(password, old).unwrap_err().kind();
            assert_eq!(kind("short", None), Some(ErrorKind::MinLength));
            assert_eq!(kind("", None), Some(ErrorKind::EmptyPassword));
            assert_eq!(kind("Az9!kWWk!9zA", None), Some(ErrorKind::Palindrome));
            assert_eq!(kind("Tr0ub4dor&3Xk!9q", Some("Tr0ub4dor&3Xk!9q")), Some(ErrorKind::SamePassword));
            assert_eq!(settings.check("Tr0ub4dor&3Xk!9q", None).unwrap(), 64);
        }

        #[test]
        fn test_out_of_memory_is_allocation_error() {
            let settings = settings();
            let err = settings.check(fake::OUT_OF_MEMORY, None).unwrap_err();
            assert!(matches!(err, PwqError::Allocation(_)));
            assert_eq!(err.kind(), None);
        }

        #[test]
        fn test_static_auxerror_becomes_message() {
            let settings = settings();
            let err = settings.check(fake::DICTIONARY_WORD, None).unwrap_err();
            assert_eq!(err.kind(), Some(ErrorKind::CracklibCheck));
            assert!(matches!(err, PwqError::Native { ref message, .. }
                if message.ends_with("it is based on a dictionary word")));
            assert_eq!(fake::counters().aux_frees, 0);
        }

        #[test]
        fn test_owned_auxerror_consumed_once() {
            let mut settings = settings();
            let err = settings
                .read_config(Some(Path::new(fake::UNKNOWN_SETTING_FILE)))
                .unwrap_err();
            assert_eq!(err.kind(), Some(ErrorKind::UnknownSetting));
            assert!(err.to_string().contains("nosuchoption"));
            let counters = fake::counters();
            assert_eq!((counters.messages, counters.aux_frees), (1, 1));
        }

        #[test]
        fn test_set_only_flags_can_be_cleared_by_line() {
            let mut settings = settings();
            for option in [OptionName::EnforceForRoot, OptionName::LocalUsersOnly] {
                settings.apply_setting(&format!("{}=1", option.name())).unwrap();
                assert_eq!(settings.get(option).unwrap(), OptionValue::Int(1));
                settings.apply_setting(&format!("{} = 0", option.name())).unwrap();
                assert_eq!(settings.get(option).unwrap(), OptionValue::Int(0));
                settings.apply_setting(option.name()).unwrap();
                assert_eq!(settings.get(option).unwrap(), OptionValue::Int(1));
            }
        }

        #[test]
        fn test_apply_setting_matches_set_option() {
            let mut by_line = settings();
            let mut typed = Settings::new(&fake::api()).unwrap();
            for (line, name, value) in [
                ("minlen = 12", "minlen", OptionValue::Int(12)),
                ("enforce_for_root=0", "enforce_for_root", OptionValue::Int(0)),
                ("badwords=acme widget", "badwords", OptionValue::from("acme widget")),
            ] {
                by_line.apply_setting(line).unwrap();
                typed.set_option(name, value).unwrap();
            }
            assert_eq!(by_line.options().unwrap(), typed.options().unwrap());
        }

        #[test]
        fn test_empty_old_password_and_user_are_null() {
            let settings = settings();
            settings.check_with_user("Tr0ub4dor&3Xk!9q", Some(""), Some("")).unwrap();
            assert_eq!(fake::last_check_nulls(), (true, true));
            settings
                .check_with_user("Tr0ub4dor&3Xk!9q", Some("old-password"), Some("alice"))
                .unwrap();
            assert_eq!(fake::last_check_nulls(), (false, false));
        }

        #[test]
        fn test_try_clone_copies_every_option() {
            let mut original = settings();
            original.set_option("minlen", 14).unwrap();
            original.set_option("dictpath", "/usr/share/cracklib/pw_dict").unwrap();
            let copy = original.try_clone().unwrap();
            assert_eq!(copy.options().unwrap(), original.options().unwrap());
            drop((original, copy));
            assert_eq!(fake::counters().frees, 2);
        }
    }
}
