#[cfg(test)]
mod tests {
    use super::super::*;
    use async_trait::async_trait;
    use preferences_sdk::{
        CallContext, Preference, PreferencePatch, PreferenceSave, ScopeChain, ScopeKey,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    use crate::config::PreferencesConfig;
    use crate::domain::repo::PreferenceRepository as _;
    use crate::infra::InMemoryPreferenceRepository;

    // Wraps the in-memory store with injectable failures and call counters.
    #[derive(Default)]
    struct FlakyRepository {
        inner: InMemoryPreferenceRepository,
        injected_conflicts: AtomicU32,
        fail_reads: bool,
        fail_writes: bool,
        reads: AtomicU32,
        writes: AtomicU32,
        // Fired from inside a read, after it produced its result.
        cancel_on_read: Option<CancellationToken>,
        // Delay between committing a write and acknowledging it.
        ack_delay: Option<Duration>,
    }

    impl FlakyRepository {
        fn with_conflicts(n: u32) -> Self {
            Self {
                injected_conflicts: AtomicU32::new(n),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl repo::PreferenceRepository for FlakyRepository {
        async fn find_by_scope(
            &self,
            ctx: &CallContext,
            scope: &ScopeKey,
        ) -> anyhow::Result<Option<Preference>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads {
                anyhow::bail!("read timed out");
            }
            let found = self.inner.find_by_scope(ctx, scope).await;
            if let Some(token) = &self.cancel_on_read {
                token.cancel();
            }
            found
        }

        async fn compare_and_swap(
            &self,
            ctx: &CallContext,
            expected: Option<u64>,
            record: Preference,
        ) -> Result<Preference, repo::RepositoryError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(anyhow::anyhow!("write rejected").into());
            }
            let injected = self
                .injected_conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if injected {
                return Err(repo::RepositoryError::VersionConflict {
                    scope: record.scope,
                    expected,
                    found: expected.map_or(Some(0), |v| Some(v + 1)),
                });
            }
            let stored = self.inner.compare_and_swap(ctx, expected, record).await?;
            if let Some(delay) = self.ack_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(stored)
        }
    }

    fn create_test_config() -> PreferencesConfig {
        PreferencesConfig {
            default_theme: "light".to_owned(),
            default_timezone: "UTC".to_owned(),
            ..Default::default()
        }
    }

    fn create_service(repo: Arc<FlakyRepository>) -> service::Service {
        service::Service::new(repo, create_test_config())
    }

    #[tokio::test]
    async fn test_resolve_without_records_returns_defaults() {
        let service = create_service(Arc::new(FlakyRepository::default()));
        let ctx = CallContext::background();

        let chain = ScopeChain::tenant(1).with_groups([2, 3]).with_user(4);
        let result = service.resolve(&ctx, &chain).await.unwrap();

        assert_eq!(result, service.get_defaults());
    }

    #[tokio::test]
    async fn test_resolve_reads_each_layer_once() {
        let repo = Arc::new(FlakyRepository::default());
        let service = create_service(Arc::clone(&repo));
        let ctx = CallContext::background();

        let chain = ScopeChain::tenant(1).with_groups([2, 3]).with_user(4);
        service.resolve(&ctx, &chain).await.unwrap();

        assert_eq!(repo.reads.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_resolve_propagates_storage_failure() {
        let repo = Arc::new(FlakyRepository {
            fail_reads: true,
            ..Default::default()
        });
        let service = create_service(repo);
        let ctx = CallContext::background();

        let result = service.resolve(&ctx, &ScopeChain::tenant(1)).await;
        assert!(matches!(result, Err(error::DomainError::Storage(_))));
    }

    #[tokio::test]
    async fn test_cancelled_resolve_does_not_touch_store() {
        let repo = Arc::new(FlakyRepository::default());
        let service = create_service(Arc::clone(&repo));
        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::with_cancellation(token);

        let result = service.resolve(&ctx, &ScopeChain::tenant(1).with_user(2)).await;

        assert!(matches!(result, Err(error::DomainError::Cancelled)));
        assert_eq!(repo.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_save_does_not_write() {
        let repo = Arc::new(FlakyRepository::default());
        let service = create_service(Arc::clone(&repo));
        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::with_cancellation(token);

        let result = service
            .save(&ctx, &ScopeKey::tenant(1), &PreferenceSave::default())
            .await;

        assert!(matches!(result, Err(error::DomainError::Cancelled)));
        assert_eq!(repo.writes.load(Ordering::SeqCst), 0);
        assert!(repo.inner.is_empty());
    }

    #[tokio::test]
    async fn test_get_exact_missing_is_not_found() {
        let service = create_service(Arc::new(FlakyRepository::default()));
        let ctx = CallContext::background();

        let result = service.get_exact(&ctx, &ScopeKey::user(1, 1)).await;
        assert!(matches!(result, Err(error::DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_storage_failure_is_not_retried() {
        let repo = Arc::new(FlakyRepository {
            fail_writes: true,
            ..Default::default()
        });
        let service = create_service(Arc::clone(&repo));
        let ctx = CallContext::background();

        let result = service
            .save(&ctx, &ScopeKey::tenant(1), &PreferenceSave::default())
            .await;

        assert!(matches!(result, Err(error::DomainError::Storage(_))));
        assert_eq!(repo.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_patch_read_failure_leaves_store_untouched() {
        let repo = Arc::new(FlakyRepository {
            fail_reads: true,
            ..Default::default()
        });
        let service = create_service(Arc::clone(&repo));
        let ctx = CallContext::background();

        let patch = PreferencePatch {
            theme: Some("dark".to_owned()),
            ..Default::default()
        };
        let result = service.patch(&ctx, &ScopeKey::tenant(1), &patch).await;

        assert!(matches!(result, Err(error::DomainError::Storage(_))));
        assert_eq!(repo.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_version_conflict_is_retried() {
        let repo = Arc::new(FlakyRepository::with_conflicts(2));
        let service = create_service(Arc::clone(&repo));
        let ctx = CallContext::background();

        let patch = PreferencePatch {
            theme: Some("dark".to_owned()),
            ..Default::default()
        };
        let stored = service
            .patch(&ctx, &ScopeKey::tenant(1), &patch)
            .await
            .unwrap();

        assert_eq!(stored.theme, "dark");
        assert_eq!(stored.version, 0);
        assert_eq!(repo.writes.load(Ordering::SeqCst), 3);
        assert!(logs_contain("Preference version conflict"));
    }

    #[tokio::test]
    async fn test_persistent_conflict_surfaces_concurrent_modification() {
        let repo = Arc::new(FlakyRepository::with_conflicts(10));
        let service = create_service(Arc::clone(&repo));
        let ctx = CallContext::background();

        let result = service
            .save(&ctx, &ScopeKey::tenant(1), &PreferenceSave::default())
            .await;

        assert!(matches!(
            result,
            Err(error::DomainError::ConcurrentModification { attempts: 3, .. })
        ));
        assert_eq!(repo.writes.load(Ordering::SeqCst), 3);
        assert!(repo.inner.is_empty());
    }

    #[tokio::test]
    async fn test_reload_config_changes_attempts_and_defaults() {
        let repo = Arc::new(FlakyRepository::with_conflicts(4));
        let service = create_service(Arc::clone(&repo));
        let ctx = CallContext::background();

        service.reload_config(PreferencesConfig {
            default_theme: "dark".to_owned(),
            max_write_attempts: 5,
            ..Default::default()
        });

        assert_eq!(service.get_defaults().theme, "dark");
        assert_eq!(service.config().max_write_attempts, 5);

        let stored = service
            .save(&ctx, &ScopeKey::tenant(1), &PreferenceSave::default())
            .await
            .unwrap();
        assert_eq!(stored.version, 0);
        assert_eq!(repo.writes.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_cancellation_during_fetch_skips_fold() {
        let token = CancellationToken::new();
        let repo = Arc::new(FlakyRepository {
            cancel_on_read: Some(token.clone()),
            ..Default::default()
        });
        let service = create_service(Arc::clone(&repo));
        let ctx = CallContext::with_cancellation(token);

        let chain = ScopeChain::tenant(1).with_groups([2]).with_user(3);
        let result = service.resolve(&ctx, &chain).await;

        assert!(matches!(result, Err(error::DomainError::Cancelled)));
        assert_eq!(repo.reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_committed_write_is_reported_despite_later_cancel() {
        let repo = Arc::new(FlakyRepository {
            ack_delay: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        let service = create_service(Arc::clone(&repo));
        let scope = ScopeKey::user(1, 1);
        let token = CancellationToken::new();
        let ctx = CallContext::with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let patch = PreferencePatch {
            theme: Some("light".to_owned()),
            ..Default::default()
        };
        let result = service.patch(&ctx, &scope, &patch).await;
        canceller.await.unwrap();

        let stored = result.unwrap();
        assert!(ctx.is_cancelled());
        assert_eq!(stored.theme, "light");
        assert_eq!(stored.version, 0);

        let persisted = repo
            .inner
            .find_by_scope(&CallContext::background(), &scope)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(persisted, stored);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_write_span_records_scope_level() {
        let service = create_service(Arc::new(FlakyRepository::default()));
        let ctx = CallContext::background();

        service
            .save(&ctx, &ScopeKey::group(1, 2), &PreferenceSave::default())
            .await
            .unwrap();

        assert!(logs_contain("level=Group"));
        assert!(logs_contain("Preference written"));
    }
}
