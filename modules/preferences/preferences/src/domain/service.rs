//! Domain service for the preferences module.

use std::sync::Arc;

use preferences_sdk::{
    CallContext, EffectivePreferences, Preference, PreferencePatch, PreferenceSave, ScopeChain,
    ScopeKey,
};
use tracing::{error, instrument};

use crate::config::PreferencesConfig;

use super::defaults::DefaultsProvider;
use super::error::DomainError;
use super::repo::PreferenceRepository;
use super::resolver::OverlayResolver;
use super::writer::ScopeWriter;

/// Preferences service: defaults, overlay resolution and scoped writes over
/// one record store.
pub struct Service {
    defaults: Arc<DefaultsProvider>,
    resolver: OverlayResolver,
    writer: ScopeWriter,
}

impl Service {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferenceRepository>, config: PreferencesConfig) -> Self {
        let writer = ScopeWriter::new(Arc::clone(&repo), config.write_attempts());
        let defaults = Arc::new(DefaultsProvider::new(config));
        let resolver = OverlayResolver::new(repo, Arc::clone(&defaults));
        Self {
            defaults,
            resolver,
            writer,
        }
    }

    /// Swaps in a new configuration; later calls observe it.
    pub fn reload_config(&self, config: PreferencesConfig) {
        self.writer.set_max_attempts(config.write_attempts());
        self.defaults.reload(config);
    }

    #[must_use]
    pub fn config(&self) -> Arc<PreferencesConfig> {
        self.defaults.config()
    }

    #[must_use]
    pub fn get_defaults(&self) -> EffectivePreferences {
        self.defaults.defaults()
    }

    /// # Errors
    /// `NotFound`, `Storage` or `Cancelled`.
    #[instrument(skip(self, ctx), fields(scope = %scope, level = ?scope.level()))]
    pub async fn get_exact(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
    ) -> Result<Preference, DomainError> {
        self.resolver.get(ctx, scope).await.inspect_err(log_failure)
    }

    /// # Errors
    /// `Storage` or `Cancelled`.
    #[instrument(
        skip(self, ctx, chain),
        fields(tenant_id = chain.tenant_id, groups = ?chain.groups, user_id = chain.user_id)
    )]
    pub async fn resolve(
        &self,
        ctx: &CallContext,
        chain: &ScopeChain,
    ) -> Result<EffectivePreferences, DomainError> {
        self.resolver.resolve(ctx, chain).await.inspect_err(log_failure)
    }

    /// # Errors
    /// `Storage`, `ConcurrentModification` or `Cancelled`.
    #[instrument(skip(self, ctx, values), fields(scope = %scope, level = ?scope.level()))]
    pub async fn save(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
        values: &PreferenceSave,
    ) -> Result<Preference, DomainError> {
        self.writer
            .save(ctx, scope, values)
            .await
            .inspect_err(log_failure)
    }

    /// # Errors
    /// `Storage`, `ConcurrentModification` or `Cancelled`.
    #[instrument(skip(self, ctx, patch), fields(scope = %scope, level = ?scope.level()))]
    pub async fn patch(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
        patch: &PreferencePatch,
    ) -> Result<Preference, DomainError> {
        self.writer
            .patch(ctx, scope, patch)
            .await
            .inspect_err(log_failure)
    }
}

fn log_failure(e: &DomainError) {
    if let DomainError::Storage(cause) = e {
        error!(error = ?cause, "Preference store failure");
    }
}
