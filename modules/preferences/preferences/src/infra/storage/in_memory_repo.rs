//! In-memory record store keyed by scope.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use preferences_sdk::{CallContext, Preference, ScopeKey};

use crate::domain::repo::{PreferenceRepository, RepositoryError};

/// In-memory repository holding at most one record per scope key.
///
/// The version check and the write happen under the shard lock of the key's
/// entry, so two writers that read the same version cannot both succeed.
#[derive(Default)]
pub struct InMemoryPreferenceRepository {
    records: DashMap<ScopeKey, Preference>,
}

impl InMemoryPreferenceRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryPreferenceRepository {
    async fn find_by_scope(
        &self,
        _ctx: &CallContext,
        scope: &ScopeKey,
    ) -> anyhow::Result<Option<Preference>> {
        Ok(self.records.get(scope).map(|r| r.value().clone()))
    }

    async fn compare_and_swap(
        &self,
        _ctx: &CallContext,
        expected: Option<u64>,
        record: Preference,
    ) -> Result<Preference, RepositoryError> {
        let scope = record.scope;
        match self.records.entry(scope) {
            Entry::Occupied(mut entry) => {
                let found = entry.get().version;
                if expected != Some(found) {
                    return Err(RepositoryError::VersionConflict {
                        scope,
                        expected,
                        found: Some(found),
                    });
                }
                entry.insert(record.clone());
            }
            Entry::Vacant(entry) => {
                if expected.is_some() {
                    return Err(RepositoryError::VersionConflict {
                        scope,
                        expected,
                        found: None,
                    });
                }
                entry.insert(record.clone());
            }
        }
        Ok(record)
    }
}
