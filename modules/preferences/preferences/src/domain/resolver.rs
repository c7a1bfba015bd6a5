//! Overlay Resolver: exact lookups and layered resolution.

use std::sync::Arc;

use futures::future::try_join_all;
use preferences_sdk::{CallContext, EffectivePreferences, Preference, ScopeChain, ScopeKey};
use tracing::debug;

use super::cancel::guarded;
use super::defaults::DefaultsProvider;
use super::error::DomainError;
use super::repo::PreferenceRepository;

/// Layered read path: exact lookups and the defaults-seeded overlay merge.
pub struct OverlayResolver {
    repo: Arc<dyn PreferenceRepository>,
    defaults: Arc<DefaultsProvider>,
}

impl OverlayResolver {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferenceRepository>, defaults: Arc<DefaultsProvider>) -> Self {
        Self { repo, defaults }
    }

    /// The record stored at exactly `scope`, verbatim.
    ///
    /// # Errors
    /// `NotFound` when no record exists, `Storage` when the store fails,
    /// `Cancelled` when the context is no longer active.
    pub async fn get(&self, ctx: &CallContext, scope: &ScopeKey) -> Result<Preference, DomainError> {
        let found = guarded(ctx, async {
            self.repo
                .find_by_scope(ctx, scope)
                .await
                .map_err(DomainError::from)
        })
        .await?;
        found.ok_or_else(|| DomainError::not_found(*scope))
    }

    /// Folds every existing layer of `chain` over the defaults.
    ///
    /// All layers are fetched concurrently; the fold runs strictly in
    /// ascending precedence order (tenant, groups as supplied, user).
    /// Absent layers contribute nothing. Nothing is folded once the context
    /// went inactive during the fetch.
    ///
    /// # Errors
    /// `Storage` if any layer read fails, `Cancelled` when the context is no
    /// longer active.
    pub async fn resolve(
        &self,
        ctx: &CallContext,
        chain: &ScopeChain,
    ) -> Result<EffectivePreferences, DomainError> {
        let layers: Vec<ScopeKey> = chain.layers().collect();

        let fetched = guarded(ctx, async {
            let reads = layers.iter().map(|scope| self.repo.find_by_scope(ctx, scope));
            try_join_all(reads).await.map_err(DomainError::from)
        })
        .await?;
        ctx.ensure_active()?;

        let mut effective = self.defaults.defaults();
        for record in fetched.iter().flatten() {
            debug!(scope = %record.scope, version = record.version, "Applying preference layer");
            overlay(&mut effective, record);
        }

        Ok(effective)
    }
}

/// Applies one layer field by field. Unset values (empty strings, zero id,
/// all-zero `json_data`) leave the accumulated value in place. A set
/// `json_data` replaces the whole accumulated document.
pub fn overlay(effective: &mut EffectivePreferences, layer: &Preference) {
    if !layer.theme.is_empty() {
        effective.theme.clone_from(&layer.theme);
    }
    if !layer.timezone.is_empty() {
        effective.timezone.clone_from(&layer.timezone);
    }
    if !layer.week_start.is_empty() {
        effective.week_start.clone_from(&layer.week_start);
    }
    if layer.home_dashboard_id != 0 {
        effective.home_dashboard_id = layer.home_dashboard_id;
    }
    if !layer.json_data.is_empty() {
        effective.json_data.clone_from(&layer.json_data);
    }
}
