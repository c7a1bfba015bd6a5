//! Scope Writer: versioned Save and Patch for one scope key.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use preferences_sdk::{
    CallContext, Preference, PreferenceJsonData, PreferencePatch, PreferenceSave, ScopeKey,
};
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::cancel::guarded;
use super::error::DomainError;
use super::repo::{PreferenceRepository, RepositoryError};

/// Versioned write path for a single scope key.
///
/// Each write is a read-modify-write closed by a compare-and-swap on the
/// version that was read. Conflicts are retried up to `max_attempts` times in
/// total; storage failures are returned immediately.
pub struct ScopeWriter {
    repo: Arc<dyn PreferenceRepository>,
    max_attempts: AtomicU32,
}

impl ScopeWriter {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferenceRepository>, max_attempts: u32) -> Self {
        Self {
            repo,
            max_attempts: AtomicU32::new(max_attempts.max(1)),
        }
    }

    pub fn set_max_attempts(&self, max_attempts: u32) {
        self.max_attempts.store(max_attempts.max(1), Ordering::Relaxed);
    }

    /// Creates the record with version 0, or replaces every field of the
    /// existing one and bumps its version.
    ///
    /// # Errors
    /// `Storage` on store failure, `ConcurrentModification` when every
    /// attempt lost a version race, `Cancelled` when the context is no longer
    /// active.
    pub async fn save(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
        fields: &PreferenceSave,
    ) -> Result<Preference, DomainError> {
        self.write(ctx, scope, |record| {
            record.theme.clone_from(&fields.theme);
            record.timezone.clone_from(&fields.timezone);
            record.week_start.clone_from(&fields.week_start);
            record.home_dashboard_id = fields.home_dashboard_id;
            record.json_data.clone_from(&fields.json_data);
        })
        .await
    }

    /// Creates the record holding only the present fields, or overwrites
    /// just those fields of the existing one. The version advances even when
    /// no field is present.
    ///
    /// # Errors
    /// Same as [`ScopeWriter::save`].
    pub async fn patch(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
        patch: &PreferencePatch,
    ) -> Result<Preference, DomainError> {
        if patch.is_empty() {
            debug!(%scope, "Empty patch, only the version advances");
        }
        self.write(ctx, scope, |record| apply_patch(record, patch))
            .await
    }

    async fn write<F>(
        &self,
        ctx: &CallContext,
        scope: &ScopeKey,
        apply: F,
    ) -> Result<Preference, DomainError>
    where
        F: Fn(&mut Preference) + Send + Sync,
    {
        let attempts = self.max_attempts.load(Ordering::Relaxed);

        for attempt in 1..=attempts {
            let current = guarded(ctx, async {
                self.repo
                    .find_by_scope(ctx, scope)
                    .await
                    .map_err(DomainError::from)
            })
            .await?;

            let expected = current.as_ref().map(|p| p.version);
            let mut next = next_revision(scope, current, OffsetDateTime::now_utc());
            apply(&mut next);

            // The compare-and-swap is awaited to completion, never raced
            // against ctx: once the store commits, the write has happened.
            ctx.ensure_active()?;
            match self.repo.compare_and_swap(ctx, expected, next).await {
                Ok(stored) => {
                    debug!(%scope, version = stored.version, attempt, "Preference written");
                    return Ok(stored);
                }
                Err(RepositoryError::VersionConflict { found, .. }) => {
                    warn!(%scope, attempt, ?expected, ?found, "Preference version conflict");
                }
                Err(RepositoryError::Storage(e)) => return Err(DomainError::Storage(e)),
            }
        }

        Err(DomainError::concurrent_modification(*scope, attempts))
    }
}

/// The record to write next: a copy of `current` one version up, or a blank
/// version-0 record when nothing is stored yet.
fn next_revision(scope: &ScopeKey, current: Option<Preference>, now: OffsetDateTime) -> Preference {
    match current {
        Some(mut record) => {
            record.version += 1;
            record.updated = now;
            record
        }
        None => Preference {
            scope: *scope,
            theme: String::new(),
            timezone: String::new(),
            week_start: String::new(),
            home_dashboard_id: 0,
            json_data: PreferenceJsonData::default(),
            version: 0,
            created: now,
            updated: now,
        },
    }
}

/// Overwrites exactly the fields present in `patch`. `navbar` and
/// `query_history` replace their own sub-field of `json_data` only.
pub fn apply_patch(record: &mut Preference, patch: &PreferencePatch) {
    if let Some(theme) = &patch.theme {
        record.theme.clone_from(theme);
    }
    if let Some(timezone) = &patch.timezone {
        record.timezone.clone_from(timezone);
    }
    if let Some(week_start) = &patch.week_start {
        record.week_start.clone_from(week_start);
    }
    if let Some(home_dashboard_id) = patch.home_dashboard_id {
        record.home_dashboard_id = home_dashboard_id;
    }
    if let Some(navbar) = &patch.navbar {
        record.json_data.navbar.clone_from(navbar);
    }
    if let Some(query_history) = &patch.query_history {
        record.json_data.query_history.clone_from(query_history);
    }
}
