//! Preferences Module Implementation
//!
//! Resolves one effective preference set from tenant, group and user scoped
//! records, and owns the versioned write path for those records.
//!
//! The public API is defined in `preferences-sdk` and re-exported here.

pub use preferences_sdk::{
    CallContext, EffectivePreferences, Preference, PreferencePatch, PreferenceSave,
    PreferencesApi, PreferencesError, ScopeChain, ScopeKey,
};

pub mod local_client;
pub use local_client::LocalClient;

#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
