use std::sync::Arc;
use std::time::Duration;

use crate::compiler::{decompose, evaluate, to_postfix};
use crate::config::OperationTimes;
use crate::engine::{InMemoryStore, Orchestrator};
use crate::errors::{CompileError, SubmitError};
use crate::model::{ExpressionId, ExpressionStatus, ExpressionView, OwnerId};
use crate::traits::{StateStore, TaskSource};
use crate::worker::{BackoffPolicy, WorkerPool};

/// End-to-end scenarios: compile, register, distribute to workers, aggregate
#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Barrier;

    fn fast_backoff() -> BackoffPolicy {
        BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(10), 2.0)
    }

    fn orchestrator() -> Arc<Orchestrator> {
        Arc::new(Orchestrator::new(
            Arc::new(InMemoryStore::new()),
            OperationTimes::default(),
        ))
    }

    async fn wait_terminal(orchestrator: &Orchestrator, id: &ExpressionId) -> ExpressionView {
        let wait = async {
            loop {
                let view = orchestrator.get_expression(id).await.unwrap();
                if view.status.is_terminal() {
                    return view;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(10), wait)
            .await
            .expect("expression did not reach a terminal status")
    }

    async fn evaluate_distributed(texts: &[&str], workers: usize) -> Vec<ExpressionView> {
        let orchestrator = orchestrator();
        let owner = OwnerId::from("alice");

        let mut ids = Vec::new();
        for text in texts {
            ids.push(orchestrator.submit(text, &owner).await.unwrap());
        }

        let pool = WorkerPool::spawn(orchestrator.clone(), workers, fast_backoff());
        let mut views = Vec::new();
        for id in &ids {
            views.push(wait_terminal(&orchestrator, id).await);
        }
        pool.shutdown().await;
        views
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn single_addition_yields_four() {
        let views = evaluate_distributed(&["2+2"], 1).await;
        assert_eq!(views[0].status, ExpressionStatus::Completed);
        assert_eq!(views[0].result, Some(4.0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn mixed_precedence_expression() {
        let postfix: Vec<String> = to_postfix("2+3*4-5/2")
            .unwrap()
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(postfix.join(" "), "2 3 4 * + 5 2 / -");

        let views = evaluate_distributed(&["2+3*4-5/2"], 3).await;
        assert_eq!(views[0].result, Some(11.5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn distributed_matches_direct_evaluation() {
        let corpus = [
            "1+2",
            "2-3-1",
            "8/2/2",
            "2*(3+4)*5",
            "((1.5+2.25)*4)/3",
            "10-2*3+4/8",
            "(1+2)*(3+4)-(5-6)/(7+8)",
            "100 / 7 * 7",
            "0.1+0.2+0.3",
            "((((9))))-1",
            "1-(2-(3-(4-5)))",
            "12.5*(3-1.25)/0.5+6",
        ];

        let views = evaluate_distributed(&corpus, 4).await;
        for (text, view) in corpus.iter().zip(views) {
            let expected = evaluate(text).unwrap();
            assert_eq!(view.status, ExpressionStatus::Completed, "{text}");
            assert_eq!(view.result, Some(expected), "{text}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn division_by_zero_fails_the_expression() {
        let views = evaluate_distributed(&["3/0", "1+2*(4/(2-2))"], 2).await;

        for view in views {
            assert_eq!(view.status, ExpressionStatus::Failed);
            assert_eq!(view.result, None);
            assert_eq!(view.error.as_deref(), Some("Division by zero"));
        }
    }

    #[tokio::test]
    async fn malformed_submissions_create_no_state() {
        let orchestrator = orchestrator();
        let owner = OwnerId::from("alice");

        for text in ["(2+3))", "(2+3", "2+(3*4"] {
            let err = orchestrator.submit(text, &owner).await.unwrap_err();
            assert!(
                matches!(err, SubmitError::Compile(CompileError::BracketMismatch { .. })),
                "{text}: {err}"
            );
        }
        for text in ["2++2", "", "+"] {
            let err = orchestrator.submit(text, &owner).await.unwrap_err();
            assert_eq!(err, SubmitError::Compile(CompileError::InsufficientOperands), "{text}");
        }

        assert!(orchestrator.list_expressions(&owner).await.unwrap().is_empty());
        assert!(orchestrator.pull_task().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn aggregation_after_terminal_is_a_no_op() {
        let orchestrator = orchestrator();
        let id = orchestrator.submit("7-2", &OwnerId::from("alice")).await.unwrap();

        let task = orchestrator.pull_task().await.unwrap().unwrap();
        orchestrator
            .report(&task.id, crate::model::TaskReport::Completed { result: 5.0 })
            .await
            .unwrap();

        let store = orchestrator.store();
        let before = store.expression(&id).await.unwrap().unwrap();
        assert_eq!(store.aggregate(&id).await.unwrap(), ExpressionStatus::Completed);
        assert_eq!(store.aggregate(&id).await.unwrap(), ExpressionStatus::Completed);
        assert_eq!(store.expression(&id).await.unwrap().unwrap(), before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_pollers_dispatch_a_task_at_most_once() {
        const POLLERS: usize = 32;

        let store = Arc::new(InMemoryStore::new());
        let id = ExpressionId::new();
        let tasks = decompose("6*7", &id).unwrap();
        let task_id = tasks[0].id.clone();
        let ids = vec![task_id.clone()];
        store
            .put(
                crate::model::Expression::new(id, OwnerId::from("alice"), "6*7", ids),
                tasks,
            )
            .await
            .unwrap();

        let barrier = Arc::new(Barrier::new(POLLERS));
        let handles: Vec<_> = (0..POLLERS)
            .map(|i| {
                let (store, barrier, task_id) = (store.clone(), barrier.clone(), task_id.clone());
                tokio::spawn(async move {
                    barrier.wait().await;
                    // Half race on the id they saw, half on the queue head
                    if i % 2 == 0 {
                        store.try_dispatch(&task_id).await.unwrap().is_some()
                    } else {
                        store.dispatch_next().await.unwrap().is_some()
                    }
                })
            })
            .collect();

        let mut claimed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                claimed += 1;
            }
        }

        assert_eq!(claimed, 1);
        let task = store.task(&task_id).await.unwrap().unwrap();
        assert_eq!(task.status, crate::model::TaskStatus::Running);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_workers_compute_each_task_once() {
        let orchestrator = orchestrator();
        let owner = OwnerId::from("alice");
        let text = "(1+2)*(3+4)+(5+6)*(7+8)-(9+10)/(11+12)";
        let id = orchestrator.submit(text, &owner).await.unwrap();
        let task_count = orchestrator
            .store()
            .expression(&id)
            .await
            .unwrap()
            .unwrap()
            .task_ids
            .len();

        let pool = WorkerPool::spawn(orchestrator.clone(), 8, fast_backoff());
        let view = wait_terminal(&orchestrator, &id).await;
        let reported = pool.shutdown().await;

        assert_eq!(view.result, Some(evaluate(text).unwrap()));
        assert_eq!(reported, task_count);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn shutdown_stops_idle_workers_promptly() {
        let backoff = BackoffPolicy::new(Duration::from_secs(30), Duration::from_secs(30), 1.0);
        let pool = WorkerPool::spawn(orchestrator(), 4, backoff);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let processed = tokio::time::timeout(Duration::from_secs(5), pool.shutdown())
            .await
            .expect("idle workers ignored cancellation");
        assert_eq!(processed, 0);
    }
}
