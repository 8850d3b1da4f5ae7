//! Store configuration.
//!
//! A `Config` is fixed when a column store is built and shared by every
//! element attached to that store.
use serde::de::Error;

use crate::error::{AttrError, Result};

/// Column store configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Enables the timestamp API (dynamic attributes and element timestamps).
    #[serde(default = "Config::default_timestamps")]
    pub timestamps: bool,

    /// Whether the store accepts columns declared as indexed.
    #[serde(default = "Config::default_indexing")]
    pub indexing: bool,

    /// Value at which a column version counter wraps and starts a new epoch.
    #[serde(default = "Config::default_version_limit")]
    pub version_limit: u32,
}

impl Config {
    const fn default_timestamps() -> bool {
        true
    }

    const fn default_indexing() -> bool {
        true
    }

    const fn default_version_limit() -> u32 {
        i32::MAX as u32
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    pub fn with_indexing(mut self, enabled: bool) -> Self {
        self.indexing = enabled;
        self
    }

    pub fn with_version_limit(mut self, limit: u32) -> Self {
        assert!(limit > 0, "Version limit must be greater than zero");
        self.version_limit = limit;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.version_limit == 0 {
            return Err("Version limit must be greater than zero".to_string());
        }

        if self.version_limit < 1024 {
            log::warn!(
                "Version limit of {} is very small; column watchers will see frequent epoch resets",
                self.version_limit
            );
        }

        Ok(())
    }

    pub(crate) fn checked(self) -> Result<Self> {
        self.validate().map_err(AttrError::InvalidConfig)?;
        Ok(self)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timestamps: Self::default_timestamps(),
            indexing: Self::default_indexing(),
            version_limit: Self::default_version_limit(),
        }
    }
}
