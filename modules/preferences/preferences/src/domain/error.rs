//! Domain error types for the preferences module.

use preferences_sdk::{PreferencesError, ScopeKey};
use thiserror::Error;

/// Domain-level errors for the preferences module.
#[derive(Error, Debug)]
pub enum DomainError {
    /// No record at the requested scope key.
    #[error("Preference not found: {0}")]
    NotFound(ScopeKey),

    /// Version conflicts persisted across every write attempt.
    #[error("Concurrent modification at {scope} after {attempts} attempts")]
    ConcurrentModification { scope: ScopeKey, attempts: u32 },

    /// The call context was cancelled or its deadline passed.
    #[error("Operation cancelled")]
    Cancelled,

    /// The record store failed a read or write.
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    #[must_use]
    pub fn not_found(scope: ScopeKey) -> Self {
        Self::NotFound(scope)
    }

    #[must_use]
    pub fn concurrent_modification(scope: ScopeKey, attempts: u32) -> Self {
        Self::ConcurrentModification { scope, attempts }
    }
}

impl From<PreferencesError> for DomainError {
    fn from(e: PreferencesError) -> Self {
        match e {
            PreferencesError::NotFound { scope } => Self::NotFound(scope),
            PreferencesError::ConcurrentModification { scope } => {
                Self::concurrent_modification(scope, 1)
            }
            PreferencesError::Cancelled => Self::Cancelled,
            PreferencesError::StorageFailure { message } => Self::Storage(anyhow::anyhow!(message)),
        }
    }
}

impl From<DomainError> for PreferencesError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(scope) => PreferencesError::not_found(scope),
            DomainError::ConcurrentModification { scope, .. } => {
                PreferencesError::concurrent_modification(scope)
            }
            DomainError::Cancelled => PreferencesError::Cancelled,
            DomainError::Storage(e) => PreferencesError::storage_failure(format!("{e:#}")),
        }
    }
}
