//! Default Provider: configured fallback values.

use std::sync::Arc;

use arc_swap::ArcSwap;
use preferences_sdk::{EffectivePreferences, PreferenceJsonData};

use crate::config::PreferencesConfig;

/// Supplies the process-wide fallback values.
///
/// Reads the configuration through an `ArcSwap`, so a reload is visible to the
/// next call. Every call returns a freshly built value owned by the caller.
pub struct DefaultsProvider {
    config: ArcSwap<PreferencesConfig>,
}

impl DefaultsProvider {
    #[must_use]
    pub fn new(config: PreferencesConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    #[must_use]
    pub fn defaults(&self) -> EffectivePreferences {
        defaults_from(&self.config.load())
    }

    pub fn reload(&self, config: PreferencesConfig) {
        self.config.store(Arc::new(config));
    }

    /// Current configuration snapshot.
    #[must_use]
    pub fn config(&self) -> Arc<PreferencesConfig> {
        self.config.load_full()
    }
}

/// Pure mapping from configuration to the default result.
#[must_use]
pub fn defaults_from(config: &PreferencesConfig) -> EffectivePreferences {
    EffectivePreferences {
        theme: config.default_theme.clone(),
        timezone: config.default_timezone.clone(),
        week_start: config.default_week_start.clone(),
        home_dashboard_id: 0,
        json_data: PreferenceJsonData::default(),
    }
}
