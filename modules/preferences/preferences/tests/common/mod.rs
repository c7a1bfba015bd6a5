#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for preferences integration tests

use std::sync::Arc;

use preferences::{
    LocalClient, PreferencesApi, config::PreferencesConfig, domain::service::Service,
    infra::InMemoryPreferenceRepository,
};

pub fn create_service_with_config(config: PreferencesConfig) -> Arc<Service> {
    let repo = Arc::new(InMemoryPreferenceRepository::new());
    Arc::new(Service::new(repo, config))
}

pub fn create_service() -> Arc<Service> {
    create_service_with_config(PreferencesConfig::default())
}

pub fn create_client() -> Arc<dyn PreferencesApi> {
    Arc::new(LocalClient::new(create_service()))
}

pub fn create_client_with_config(config: PreferencesConfig) -> Arc<dyn PreferencesApi> {
    Arc::new(LocalClient::new(create_service_with_config(config)))
}
