//! `PreferencesApi` trait definition.
//!
//! This trait defines the public API for the preferences module.
//! All methods that touch the record store take a `CallContext` so callers
//! can cancel them or bound them with a deadline.

use async_trait::async_trait;

use crate::context::CallContext;
use crate::errors::PreferencesError;
use crate::models::{
    EffectivePreferences, Preference, PreferencePatch, PreferenceSave, ScopeChain, ScopeKey,
};

/// Public API trait for the preferences module.
///
/// ```ignore
/// let client: Arc<dyn PreferencesApi> = hub.get()?;
/// let chain = ScopeChain::tenant(org_id).with_groups(team_ids).with_user(user_id);
/// let prefs = client.resolve(&ctx, &chain).await?;
/// ```
#[async_trait]
pub trait PreferencesApi: Send + Sync {
    /// Merge tenant, group and user records into one effective result,
    /// seeded with the configured defaults. Missing layers are skipped.
    async fn resolve(
        &self,
        ctx: &CallContext,
        chain: &ScopeChain,
    ) -> Result<EffectivePreferences, PreferencesError>;

    /// Process-wide defaults as currently configured.
    fn get_defaults(&self) -> EffectivePreferences;

    /// The record stored at exactly `scope`, without defaults or merging.
    async fn get_exact(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
    ) -> Result<Preference, PreferencesError>;

    /// Create or fully replace the record at `scope` (POST semantics).
    async fn save(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
        fields: PreferenceSave,
    ) -> Result<Preference, PreferencesError>;

    /// Create or partially update the record at `scope` (PATCH semantics).
    async fn patch(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
        patch: PreferencePatch,
    ) -> Result<Preference, PreferencesError>;
}
