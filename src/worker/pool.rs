// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::traits::TaskSource;
use crate::worker::agent::Worker;
use crate::worker::backoff::BackoffPolicy;

/// A fixed set of workers polling one task source.
///
/// All workers share a single cancellation token; [`WorkerPool::shutdown`]
/// fires it and waits for every worker to finish its current step.
pub struct WorkerPool {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<usize>>,
}

impl WorkerPool {
    /// Spawns `size` workers on the current tokio runtime.
    pub fn spawn(source: Arc<dyn TaskSource>, size: usize, backoff: BackoffPolicy) -> Self {
        let cancel = CancellationToken::new();
        let handles = (0..size)
            .map(|id| {
                let worker = Worker::new(id, source.clone(), backoff, cancel.child_token());
                tokio::spawn(worker.run())
            })
            .collect();
        Self { cancel, handles }
    }

    /// Spawns `workers.computing_power` workers with the configured backoff.
    pub fn from_config(source: Arc<dyn TaskSource>, config: &Config) -> Self {
        Self::spawn(
            source,
            config.workers.get_computing_power(),
            BackoffPolicy::from_config(&config.backoff),
        )
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Token that stops every worker of this pool when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stops all workers and returns how many tasks they reported in total.
    pub async fn shutdown(self) -> usize {
        self.cancel.cancel();

        let mut processed = 0;
        for handle in self.handles {
            match handle.await {
                Ok(count) => processed += count,
                Err(error) => tracing::error!(error = %error, "Worker task terminated abnormally"),
            }
        }
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OperationTimes;
    use crate::engine::{InMemoryStore, Orchestrator};
    use crate::model::{ExpressionStatus, OwnerId};
    use std::time::Duration;

    #[tokio::test]
    async fn pool_sized_from_config() {
        let mut config = Config::default();
        config.workers.computing_power = Some(3);
        let source = Arc::new(Orchestrator::new(Arc::new(InMemoryStore::new()), OperationTimes::default()));

        let pool = WorkerPool::from_config(source, &config);
        assert_eq!(pool.size(), 3);
        assert_eq!(pool.shutdown().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn pool_evaluates_submitted_expression() {
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::new(InMemoryStore::new()),
            OperationTimes::default(),
        ));
        let owner = OwnerId::from("alice");
        let id = orchestrator.submit("(1+2)*(3+4)", &owner).await.unwrap();

        let backoff = BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(10), 2.0);
        let pool = WorkerPool::spawn(orchestrator.clone(), 2, backoff);

        let view = loop {
            let view = orchestrator.get_expression(&id).await.unwrap();
            if view.status.is_terminal() {
                break view;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        };

        assert_eq!(view.status, ExpressionStatus::Completed);
        assert_eq!(view.result, Some(21.0));
        assert_eq!(pool.shutdown().await, 3);
    }
}
