//! Run configuration, stored as TOML.
//!
//! ```toml
//! validators = ["illegal", "dup"]
//! strict = false
//! data_dir = "/usr/share/gwv"
//! category_cache_size = 4096
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Validators to run, in order. Empty runs every registered validator.
    pub validators: Vec<String>,
    /// Abort on the first rule failure.
    pub strict: bool,
    /// Directory holding the reference tables
    pub data_dir: Option<PathBuf>,
    /// Capacity of the name → category cache
    pub category_cache_size: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            validators: Vec::new(),
            strict: false,
            data_dir: None,
            category_cache_size: 4096,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
