//! Binding configuration.
//!
//! Selects the binding technique and describes the settings a new handle
//! should start from. Deserialises from any serde format; unset fields take
//! their defaults.
//!
//! ```rust,no_run
//! use pwquality_bridge::BindingConfig;
//!
//! let config: BindingConfig = serde_json::from_str(r#"{
//!     "binding": "dynamic",
//!     "options": { "minlen": 12, "dcredit": -1, "badwords": "acme" }
//! }"#).unwrap();
//! let settings = config.build().unwrap();
//! let score = settings.check("correct horse battery staple", None);
//! ```

use crate::api::{Binding, NativeApi};
use crate::error::{PwqError, Result};
use crate::options::OptionValue;
use crate::settings::{DEFAULT_ENTROPY_BITS, Settings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Path of the shared library to load at runtime
pub const ENV_LIBRARY: &str = "PWQUALITY_LIBRARY";
/// `pwquality.conf` to apply to new handles
pub const ENV_CONFIG: &str = "PWQUALITY_CONFIG";
/// `linked` or `dynamic`
pub const ENV_BINDING: &str = "PWQUALITY_BINDING";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingConfig {
    pub binding: Binding,
    /// Library to open for the dynamic binding; default sonames when unset
    pub library_path: Option<PathBuf>,
    /// Configuration file applied before `options`
    pub config_file: Option<PathBuf>,
    /// Apply the system `pwquality.conf` before `config_file` and `options`
    pub read_system_config: bool,
    pub entropy_bits: u32,
    /// Option name to value, applied in name order
    pub options: BTreeMap<String, OptionValue>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        BindingConfig {
            binding: if cfg!(feature = "link") {
                Binding::Linked
            } else {
                Binding::Dynamic
            },
            library_path: None,
            config_file: None,
            read_system_config: false,
            entropy_bits: DEFAULT_ENTROPY_BITS,
            options: BTreeMap::new(),
        }
    }
}

impl BindingConfig {
    /// Defaults overridden by `PWQUALITY_BINDING`, `PWQUALITY_LIBRARY` and
    /// `PWQUALITY_CONFIG`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = BindingConfig::default();
        if let Some(binding) = lookup(ENV_BINDING) {
            config.binding = match binding.trim().to_ascii_lowercase().as_str() {
                "linked" => Binding::Linked,
                "dynamic" => Binding::Dynamic,
                other => {
                    return Err(PwqError::invalid_option(
                        ENV_BINDING,
                        format!("expected `linked` or `dynamic`, got {:?}", other),
                    ));
                }
            };
        }
        if let Some(path) = lookup(ENV_LIBRARY).filter(|p| !p.is_empty()) {
            config.library_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(ENV_CONFIG).filter(|p| !p.is_empty()) {
            config.config_file = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Resolve the native function table this configuration selects.
    pub fn api(&self) -> Result<NativeApi> {
        NativeApi::for_binding(self.binding, self.library_path.as_deref())
    }

    /// Build a configured handle.
    ///
    /// Configuration files are applied first, then `options`. The handle is
    /// released if any step fails.
    pub fn build(&self) -> Result<Settings> {
        let api = self.api()?;
        self.build_with(&api)
    }

    /// Build a configured handle through an already resolved table.
    pub fn build_with(&self, api: &NativeApi) -> Result<Settings> {
        let mut settings = Settings::new(api)?;
        if self.read_system_config {
            settings.read_config(None)?;
        }
        if let Some(path) = &self.config_file {
            settings.read_config(Some(path.as_path()))?;
        }
        for (name, value) in &self.options {
            settings.set_option(name, value.clone())?;
        }
        settings.set_entropy_bits(self.entropy_bits);
        tracing::debug!(
            binding = %api.binding(),
            options = self.options.len(),
            "built pwquality settings"
        );
        Ok(settings)
    }
}
