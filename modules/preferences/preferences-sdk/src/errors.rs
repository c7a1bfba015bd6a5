//! Error types for the preferences module.
//!
//! Transport-agnostic error definitions returned by `PreferencesApi`.

use thiserror::Error;

use crate::models::ScopeKey;

/// Error type for preferences operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreferencesError {
    /// No record exists at the requested scope key.
    #[error("preference not found: {scope}")]
    NotFound { scope: ScopeKey },

    /// The record store could not complete a read or write.
    #[error("storage failure: {message}")]
    StorageFailure { message: String },

    /// Another writer updated the same scope key first.
    #[error("concurrent modification: {scope}")]
    ConcurrentModification { scope: ScopeKey },

    /// The call was cancelled or its deadline passed.
    #[error("operation cancelled")]
    Cancelled,
}

impl PreferencesError {
    #[must_use]
    pub fn not_found(scope: ScopeKey) -> Self {
        Self::NotFound { scope }
    }

    #[must_use]
    pub fn storage_failure(message: impl Into<String>) -> Self {
        Self::StorageFailure {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn concurrent_modification(scope: ScopeKey) -> Self {
        Self::ConcurrentModification { scope }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageFailure { .. })
    }

    /// `true` when the caller may retry the write.
    #[must_use]
    pub fn is_concurrent_modification(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}
