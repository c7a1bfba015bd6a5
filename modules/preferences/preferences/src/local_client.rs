use async_trait::async_trait;
use preferences_sdk::{
    CallContext, EffectivePreferences, Preference, PreferencePatch, PreferenceSave,
    PreferencesApi, PreferencesError, ScopeChain, ScopeKey,
};
use std::sync::Arc;

use crate::domain::service::Service;

/// In-process `PreferencesApi` backed directly by the domain service.
pub struct LocalClient {
    service: Arc<Service>,
}

impl LocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl PreferencesApi for LocalClient {
    async fn resolve(
        &self,
        ctx: &CallContext,
        chain: &ScopeChain,
    ) -> Result<EffectivePreferences, PreferencesError> {
        self.service.resolve(ctx, chain).await.map_err(Into::into)
    }

    fn get_defaults(&self) -> EffectivePreferences {
        self.service.get_defaults()
    }

    async fn get_exact(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
    ) -> Result<Preference, PreferencesError> {
        self.service.get_exact(ctx, scope).await.map_err(Into::into)
    }

    async fn save(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
        fields: PreferenceSave,
    ) -> Result<Preference, PreferencesError> {
        self.service
            .save(ctx, scope, &fields)
            .await
            .map_err(Into::into)
    }

    async fn patch(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
        patch: PreferencePatch,
    ) -> Result<Preference, PreferencesError> {
        self.service
            .patch(ctx, scope, &patch)
            .await
            .map_err(Into::into)
    }
}
