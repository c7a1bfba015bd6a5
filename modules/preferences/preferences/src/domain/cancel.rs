//! Cancellation and deadline handling for store reads.

use std::future::Future;

use preferences_sdk::CallContext;
use tokio::time::Instant;

use super::error::DomainError;

/// Runs `fut` unless the context is already inactive, and abandons it as soon
/// as the token fires or the deadline passes.
///
/// # Errors
/// Returns `DomainError::Cancelled` on cancellation, otherwise whatever `fut`
/// returns.
pub async fn guarded<T, F>(ctx: &CallContext, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    ctx.ensure_active()?;
    tokio::select! {
        biased;
        () = ctx.cancellation_token().cancelled() => Err(DomainError::Cancelled),
        () = sleep_until(ctx.deadline()) => Err(DomainError::Cancelled),
        res = fut => res,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
