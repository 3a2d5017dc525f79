//! # pwquality-bridge
//!
//! Safe bindings to libpwquality: check a password's quality, generate a
//! password, read and write the quality settings.
//!
//! The scoring itself lives in the C library. This crate owns the boundary:
//! one native settings object per [`Settings`] value, released exactly once,
//! with every negative return code translated into a typed [`PwqError`].
//!
//! ## Features
//!
//! | Feature | Description | Default |
//! |:--------|:------------|:-------:|
//! | `link` | Link libpwquality at build time instead of loading it at runtime | No |
//! | `ffi` | Export a C ABI over [`Settings`] and generate its header | No |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pwquality_bridge::{ErrorKind, NativeApi, Settings};
//!
//! let api = NativeApi::load_default().unwrap();
//! let mut settings = Settings::new(&api).unwrap();
//! settings.set_option("minlen", 12).unwrap();
//!
//! match settings.check("Tr0ub4dor&3Xk!9q", None) {
//!     Ok(score) => println!("score {}", score),
//!     Err(e) if e.kind() == Some(ErrorKind::MinLength) => println!("too short"),
//!     Err(e) => println!("rejected: {}", e),
//! }
//!
//! let password = settings.generate().unwrap();
//! settings.release();
//! # let _ = password;
//! ```
//!
//! ## Binding techniques
//!
//! - **Dynamic** (default): [`NativeApi::load`] opens `libpwquality.so.1` with
//!   `libloading`. Tables are cached per path.
//! - **Linked**: `NativeApi::linked` uses `extern` declarations resolved at
//!   build time (`link` feature; set `PWQUALITY_LIB_DIR` for a non-standard
//!   location).
//! - **Exported C ABI**: the `ffi` module hands [`Settings`] to C callers
//!   through registry-tracked opaque handles.
//!
//! All three produce identical scores and error kinds for identical settings.

pub mod sys;

pub mod error;
pub use error::{ErrorCategory, ErrorKind, PwqError, Result};

pub mod options;
pub use options::{OptionName, OptionValue, ValueType, parse_setting};

pub mod api;
pub use api::{Binding, NativeApi};

pub mod settings;
pub use settings::{DEFAULT_ENTROPY_BITS, OptionSnapshot, Settings};

pub mod config;
pub use config::BindingConfig;

// C FFI layer (feature-gated)
#[cfg(feature = "ffi")]
pub mod ffi;
#[cfg(feature = "ffi")]
pub use ffi::PwqbStatus;
