//! Scoped background tasks.
//!
//! A screen owns a [`TaskScope`]; every task spawned through it stops when
//! the scope is cancelled or dropped, so nothing keeps writing into a view
//! that is gone.

use std::future::Future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct TaskScope {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl TaskScope {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            handles: Vec::new(),
        }
    }

    /// Run `fut` until it finishes or the scope is cancelled
    pub fn spawn<F>(&mut self, name: &'static str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.token.clone();
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(task = name, "Task cancelled");
                }
                _ = fut => {}
            }
        }));
    }

    /// Tasks still running
    pub fn active(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Cancel every task and wait for them to stop
    pub async fn shutdown(mut self) {
        self.token.cancel();
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    tracing::warn!("Background task panicked: {}", e);
                }
            }
        }
    }
}

impl Default for TaskScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_drop_cancels_tasks() {
        let finished = Arc::new(AtomicBool::new(false));
        let (guard, stopped) = tokio::sync::oneshot::channel::<()>();
        {
            let mut scope = TaskScope::new();
            let flag = finished.clone();
            scope.spawn("slow", async move {
                // Dropped with the future when the task is cancelled
                let _guard = guard;
                tokio::time::sleep(Duration::from_secs(30)).await;
                flag.store(true, Ordering::SeqCst);
            });
            assert_eq!(scope.active(), 1);
        }

        let closed = tokio::time::timeout(Duration::from_secs(1), stopped).await;
        assert!(matches!(closed, Ok(Err(_))));
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_completed_tasks_run_to_end() {
        let finished = Arc::new(AtomicBool::new(false));
        let mut scope = TaskScope::new();
        let flag = finished.clone();
        scope.spawn("quick", async move {
            flag.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(finished.load(Ordering::SeqCst));
        scope.shutdown().await;
    }
}
