// Side calls whose failure must never affect the primary operation
use std::future::Future;

/// Await `action`, logging and discarding any error. Returns whether it succeeded.
pub async fn notify_best_effort<T, F>(what: &str, action: F) -> bool
where
    F: Future<Output = anyhow::Result<T>>,
{
    match action.await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Best-effort {} failed (ignored): {:#}", what, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_is_swallowed() {
        let ok = notify_best_effort("reload", async { Err::<(), _>(anyhow::anyhow!("host gone")) }).await;
        assert!(!ok);
        assert!(notify_best_effort("reload", async { Ok::<_, anyhow::Error>(42) }).await);
    }
}
