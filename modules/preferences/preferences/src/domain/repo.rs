//! Record store port for preference records.

use async_trait::async_trait;
use preferences_sdk::{CallContext, Preference, ScopeKey};

/// Failure of a versioned write.
#[derive(thiserror::Error, Debug)]
pub enum RepositoryError {
    /// The stored version did not match the expected one.
    #[error("version conflict at {scope}: expected {expected:?}, found {found:?}")]
    VersionConflict {
        scope: ScopeKey,
        expected: Option<u64>,
        found: Option<u64>,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Keyed store of preference records, one per scope key.
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    async fn find_by_scope(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
    ) -> anyhow::Result<Option<Preference>>;

    /// Writes `record` at `record.scope` if the stored version still equals
    /// `expected` (`None`: no record may exist yet).
    ///
    /// Callers await this to completion. A store that honours `ctx` must do
    /// so before it commits; once committed it returns the stored record.
    async fn compare_and_swap(
        &self,
        ctx: &CallContext,
        expected: Option<u64>,
        record: Preference,
    ) -> Result<Preference, RepositoryError>;
}
