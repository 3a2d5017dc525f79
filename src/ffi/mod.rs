//! C ABI layer for pwquality-bridge
//!
//! Re-exports the safe wrapper to C callers through opaque, registry-tracked
//! handles. All functions use #[repr(C)] types and panic-safe wrappers.

pub mod error;
pub mod handles;
pub mod settings;

pub use error::PwqbStatus;
pub use handles::*;

pub use settings::{
    pwqb_check, pwqb_generate, pwqb_settings_free, pwqb_settings_new, pwqb_settings_set_option,
};
