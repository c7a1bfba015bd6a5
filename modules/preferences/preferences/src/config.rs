//! Configuration for the preferences module.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Section name under which the module reads its configuration.
pub const CONFIG_SECTION: &str = "preferences";

/// Prefix for environment overrides, e.g. `APP__PREFERENCES__DEFAULT_THEME`.
const ENV_PREFIX: &str = "APP__";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid config for module 'preferences': {0}")]
    Invalid(#[source] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Invalid(Box::new(e))
    }
}

/// Configuration for the preferences module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PreferencesConfig {
    /// Theme used when no scope sets one.
    pub default_theme: String,
    /// Timezone used when no scope sets one.
    pub default_timezone: String,
    /// Week start used when no scope sets one. Empty means locale default.
    pub default_week_start: String,
    /// Total read-modify-write attempts per write before a version conflict
    /// is reported to the caller.
    pub max_write_attempts: u32,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            default_theme: "dark".to_owned(),
            default_timezone: "browser".to_owned(),
            default_week_start: String::new(),
            max_write_attempts: 3,
        }
    }
}

impl PreferencesConfig {
    /// Attempts actually used by the writer; never below one.
    #[must_use]
    pub fn write_attempts(&self) -> u32 {
        self.max_write_attempts.max(1)
    }

    /// Extracts the `preferences` section, falling back to defaults when the
    /// section is absent.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if any provider failed to load or the
    /// section exists but does not deserialize.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        // Provider failures also surface here, so only a missing key counts
        // as absent.
        match figment.find_value(CONFIG_SECTION) {
            Ok(_) => Ok(figment.extract_inner(CONFIG_SECTION)?),
            Err(e) if e.missing() => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Layered load: defaults, then the YAML file (if given), then
    /// `APP__PREFERENCES__*` environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if any layer cannot be read or the merged
    /// section does not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::default(CONFIG_SECTION, Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file_exact(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(&figment)
    }
}
