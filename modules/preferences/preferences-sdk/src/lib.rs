//! Preferences SDK
//!
//! This crate provides the public API for the preferences module:
//! - `PreferencesApi` trait for inter-module communication
//! - Scope types (`ScopeKey`, `ScopeChain`) and record types (`Preference`,
//!   `EffectivePreferences`, `PreferenceSave`, `PreferencePatch`)
//! - `CallContext` for cancellation and deadlines
//! - Error type (`PreferencesError`)
//!
//! Consumers obtain the client from the hosting runtime:
//! ```ignore
//! let client: Arc<dyn PreferencesApi> = hub.get()?;
//! let chain = ScopeChain::tenant(1).with_groups([2, 3]).with_user(7);
//! let effective = client.resolve(&CallContext::background(), &chain).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod context;
pub mod errors;
pub mod models;

pub use api::PreferencesApi;
pub use context::CallContext;
pub use errors::PreferencesError;
pub use models::{
    EffectivePreferences, NavLink, NavbarPreference, Preference, PreferenceJsonData,
    PreferencePatch, PreferenceSave, QueryHistoryPreference, ScopeChain, ScopeKey, ScopeLevel,
};
