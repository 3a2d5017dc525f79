//! Resolved libpwquality function tables.
//!
//! A [`NativeApi`] is the set of native entry points a [`Settings`] handle calls
//! through. It comes from one of two binding techniques:
//!
//! - **Linked** (`link` feature): the `extern` declarations in [`crate::sys`],
//!   resolved by the linker at build time.
//! - **Dynamic**: `libloading` opens the shared library at runtime and resolves
//!   the same symbols. Loaded tables are cached per library path, so a library
//!   is opened and resolved once per process.
//!
//! Either way the handle code is identical; only the table differs.
//!
//! [`Settings`]: crate::Settings

use crate::error::{PwqError, Result};
use crate::sys;
use libc::{c_char, c_int, c_void};
use libloading::Library;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::{CStr, OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

/// Sonames tried, in order, when no explicit library path is given
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["libpwquality.so.1", "libpwquality.so"];

/// Cache of dynamically loaded tables, keyed by the path they were opened from
static LOADED_LIBRARIES: LazyLock<Mutex<HashMap<PathBuf, NativeApi>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// How a [`NativeApi`] was bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    /// Declarations linked at build time
    Linked,
    /// Symbols resolved from a library opened at runtime
    #[default]
    Dynamic,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Linked => f.write_str("linked"),
            Binding::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// Native entry points used by the safe wrapper
#[derive(Clone)]
pub struct NativeApi {
    pub(crate) default_settings: sys::DefaultSettingsFn,
    pub(crate) free_settings: sys::FreeSettingsFn,
    pub(crate) read_config: sys::ReadConfigFn,
    pub(crate) set_option: sys::SetOptionFn,
    pub(crate) set_int_value: sys::SetIntValueFn,
    pub(crate) set_str_value: sys::SetStrValueFn,
    pub(crate) get_int_value: sys::GetIntValueFn,
    pub(crate) get_str_value: sys::GetStrValueFn,
    pub(crate) generate: sys::GenerateFn,
    pub(crate) check: sys::CheckFn,
    pub(crate) free_buffer: sys::FreeBufferFn,
    strerror: sys::StrerrorFn,
    binding: Binding,
    // Keeps the library mapped while any table copy (and so any handle) lives
    library: Option<Arc<Library>>,
}

impl NativeApi {
    /// Table backed by the build-time linked declarations.
    #[cfg(feature = "link")]
    pub fn linked() -> Self {
        NativeApi {
            default_settings: sys::pwquality_default_settings,
            free_settings: sys::pwquality_free_settings,
            read_config: sys::pwquality_read_config,
            set_option: sys::pwquality_set_option,
            set_int_value: sys::pwquality_set_int_value,
            set_str_value: sys::pwquality_set_str_value,
            get_int_value: sys::pwquality_get_int_value,
            get_str_value: sys::pwquality_get_str_value,
            generate: sys::pwquality_generate,
            check: sys::pwquality_check,
            free_buffer: libc::free,
            strerror: sys::pwquality_strerror,
            binding: Binding::Linked,
            library: None,
        }
    }

    /// Open the shared library at `path` and resolve every entry point.
    ///
    /// Repeated calls with the same path return the cached table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut cache = LOADED_LIBRARIES
            .lock()
            .map_err(|_| PwqError::Allocation("library cache poisoned".to_string()))?;
        if let Some(api) = cache.get(path) {
            return Ok(api.clone());
        }

        let api = Self::open(path.as_os_str())?;
        cache.insert(path.to_path_buf(), api.clone());
        Ok(api)
    }

    /// Load libpwquality by its default sonames.
    pub fn load_default() -> Result<Self> {
        Self::load_first(DEFAULT_LIBRARY_NAMES)
    }

    /// First of `names` that loads; otherwise every load failure, in order.
    fn load_first(names: &[&str]) -> Result<Self> {
        let mut failures = Vec::new();
        for name in names {
            match Self::load(name) {
                Ok(api) => return Ok(api),
                Err(PwqError::Allocation(reason)) => failures.push(reason),
                Err(e) => return Err(e),
            }
        }
        Err(PwqError::Allocation(failures.join("; ")))
    }

    /// Table for `binding`: the linked declarations, or a runtime load of
    /// `library_path` (default sonames when `None`).
    pub fn for_binding(binding: Binding, library_path: Option<&Path>) -> Result<Self> {
        match (binding, library_path) {
            #[cfg(feature = "link")]
            (Binding::Linked, _) => Ok(Self::linked()),
            #[cfg(not(feature = "link"))]
            (Binding::Linked, _) => Err(PwqError::Allocation(
                "linked binding requested but the `link` feature is disabled".to_string(),
            )),
            (Binding::Dynamic, Some(path)) => Self::load(path),
            (Binding::Dynamic, None) => Self::load_default(),
        }
    }

    fn open(name: &OsStr) -> Result<Self> {
        // SAFETY: libpwquality has no load-time initialisers with preconditions
        let library = unsafe { Library::new(name) }.map_err(|e| {
            PwqError::Allocation(format!("cannot load {}: {}", name.to_string_lossy(), e))
        })?;
        tracing::debug!(library = %name.to_string_lossy(), "loaded libpwquality");

        // SAFETY: every symbol is resolved with the signature declared in
        // `sys`, which follows pwquality.h for the 1.4 series
        unsafe {
            Ok(NativeApi {
                default_settings: symbol(&library, b"pwquality_default_settings\0")?,
                free_settings: symbol(&library, b"pwquality_free_settings\0")?,
                read_config: symbol(&library, b"pwquality_read_config\0")?,
                set_option: symbol(&library, b"pwquality_set_option\0")?,
                set_int_value: symbol(&library, b"pwquality_set_int_value\0")?,
                set_str_value: symbol(&library, b"pwquality_set_str_value\0")?,
                get_int_value: symbol(&library, b"pwquality_get_int_value\0")?,
                get_str_value: symbol(&library, b"pwquality_get_str_value\0")?,
                generate: symbol(&library, b"pwquality_generate\0")?,
                check: symbol(&library, b"pwquality_check\0")?,
                // The library allocates generated passwords with the process malloc
                free_buffer: libc::free,
                strerror: symbol(&library, b"pwquality_strerror\0")?,
                binding: Binding::Dynamic,
                library: Some(Arc::new(library)),
            })
        }
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// Message for `code` from the library's own `pwquality_strerror`.
    ///
    /// Consumes `auxerror`: the library frees it where it owns it.
    pub(crate) fn strerror(&self, code: c_int, auxerror: *mut c_void) -> String {
        let mut buf = [0 as c_char; sys::PWQ_MAX_ERROR_MESSAGE_LEN];
        // SAFETY: buf is writable for its full length; auxerror is the value
        // returned alongside `code`, or null
        let message = unsafe { (self.strerror)(buf.as_mut_ptr(), buf.len(), code, auxerror) };
        if message.is_null() {
            return format!("libpwquality error {}", code);
        }
        // SAFETY: strerror returns either buf or a static NUL-terminated string
        unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned()
    }
}

/// Copy a function pointer out of `library`.
///
/// # Safety
/// `T` must be the function pointer type matching the symbol's C signature,
/// and the pointer must not outlive `library`.
unsafe fn symbol<T: Copy>(library: &Library, name: &[u8]) -> Result<T> {
    // SAFETY: forwarded to the caller
    unsafe { library.get::<T>(name) }
        .map(|sym| *sym)
        .map_err(|e| {
            let printable = String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name));
            PwqError::Allocation(format!("missing symbol {}: {}", printable, e))
        })
}

impl fmt::Debug for NativeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeApi")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// Paths currently held in the dynamic library cache
pub fn cached_libraries() -> Vec<OsString> {
    LOADED_LIBRARIES
        .lock()
        .map(|cache| cache.keys().map(|p| p.as_os_str().to_owned()).collect())
        .unwrap_or_default()
}
