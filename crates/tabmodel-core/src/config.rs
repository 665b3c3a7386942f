//! Engine configuration
//!
//! Loaded from TOML; every section is optional and falls back to defaults.
//!
//! ```toml
//! [governance]
//! forbid_delete = ["Perspective"]
//!
//! [history]
//! max_depth = 100
//!
//! [logging]
//! profile = "production"
//! ```

use serde::Deserialize;

use crate::errors::{ModelError, Result};
use crate::logging_facility::Profile;
use crate::model::ObjectKind;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub governance: GovernanceConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Object kinds whose deletion is vetoed
    pub forbid_delete: Vec<ObjectKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undoable batches kept (0 = unlimited)
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub profile: Profile,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            profile: Profile::Development,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the document is not valid TOML or does not
    /// match the expected shape.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ModelError::Configuration {
            message: e.to_string(),
        })
    }
}
