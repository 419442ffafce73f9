//! Import orchestrator
//!
//! Fan-out/fan-in scheduler over a bounded job queue. Each stage runs
//! under its own concurrency cap; workers retry transient failures with
//! linear backoff and report every outcome (at least once) to the
//! completion dispatcher, which gates the next stage.

pub mod dispatcher;
pub mod handlers;
pub mod jobs;
pub mod scheduler;

use chrono::Utc;
use dispatcher::Dispatcher;
use jobs::{Job, JobHandler, Outcome, StageEvent, StageId};
use nald_common::config::{ImportConfig, RetryConfig};
use nald_common::events::{EventBus, ImportEvent, RunTrigger};
use nald_common::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

/// Handle for submitting work to the running pipeline
#[derive(Clone)]
pub struct Orchestrator {
    job_tx: mpsc::Sender<Job>,
    event_bus: EventBus,
}

impl Orchestrator {
    /// Spawn the dispatcher and worker loop; returns the submission handle
    pub fn start(
        config: &ImportConfig,
        handler: Arc<dyn JobHandler>,
        event_bus: EventBus,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel(config.queue_capacity);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let dispatcher = Dispatcher::new(job_tx.clone(), event_bus.clone());
        tokio::spawn(dispatcher.run(event_rx));

        let limits = stage_limits(config);
        tokio::spawn(run_workers(job_rx, limits, config.retry, handler, event_tx));

        Self { job_tx, event_bus }
    }

    /// Submit one job. Applies queue backpressure; errors only if the
    /// pipeline has shut down.
    pub async fn enqueue(&self, job: Job) -> Result<()> {
        self.job_tx
            .send(job)
            .await
            .map_err(|_| Error::Internal("import pipeline is not running".to_string()))
    }

    /// Kick off a full import run: companies first, licences gated behind
    /// their completion.
    pub async fn trigger_run(&self, trigger: RunTrigger) -> Result<()> {
        self.event_bus.emit_lossy(ImportEvent::RunStarted {
            trigger,
            timestamp: Utc::now(),
        });
        self.enqueue(Job::ImportCompanies).await
    }

    /// Queue the historical bill-run load for every NALD region
    pub async fn trigger_bill_runs(&self) -> Result<()> {
        for region_code in 1..=8 {
            self.enqueue(Job::ImportBillRuns { region_code }).await?;
        }
        Ok(())
    }
}

/// One semaphore per stage. Root stages are single units; leaves use the
/// configured pool sizes.
fn stage_limits(config: &ImportConfig) -> HashMap<StageId, Arc<Semaphore>> {
    HashMap::from([
        (StageId::Companies, Arc::new(Semaphore::new(1))),
        (
            StageId::Company,
            Arc::new(Semaphore::new(config.workers.companies)),
        ),
        (StageId::Licences, Arc::new(Semaphore::new(1))),
        (
            StageId::Licence,
            Arc::new(Semaphore::new(config.workers.licences)),
        ),
        (
            StageId::BillRuns,
            Arc::new(Semaphore::new(config.workers.bill_runs)),
        ),
    ])
}

/// Pull jobs off the queue and spawn a worker per job, capped per stage
async fn run_workers(
    mut job_rx: mpsc::Receiver<Job>,
    limits: HashMap<StageId, Arc<Semaphore>>,
    retry: RetryConfig,
    handler: Arc<dyn JobHandler>,
    event_tx: mpsc::UnboundedSender<StageEvent>,
) {
    while let Some(job) = job_rx.recv().await {
        let Some(semaphore) = limits.get(&job.stage()).cloned() else {
            continue;
        };
        let handler = handler.clone();
        let event_tx = event_tx.clone();
        // Wait for the stage permit inside the task: a saturated stage
        // must not hold up dispatch of jobs for other stages.
        tokio::spawn(async move {
            let Ok(permit) = semaphore.acquire_owned().await else {
                return;
            };
            let unit_id = Uuid::new_v4();
            tracing::debug!(job = %job.describe(), %unit_id, "Starting import unit");
            let outcome = execute_with_retry(&job, handler.as_ref(), retry).await;
            let _ = event_tx.send(StageEvent {
                job,
                unit_id,
                outcome,
            });
            drop(permit);
        });
    }
}

/// Run one job; transient errors retry with linear backoff, everything
/// else is terminal
async fn execute_with_retry(
    job: &Job,
    handler: &dyn JobHandler,
    retry: RetryConfig,
) -> Outcome {
    let mut attempt = 1;
    loop {
        match handler.handle(job).await {
            Ok(outcome) => return outcome,
            Err(e) if e.is_transient() && attempt < retry.max_attempts => {
                tracing::warn!(
                    job = %job.describe(),
                    attempt,
                    error = %e,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(Duration::from_millis(retry.backoff_ms * attempt as u64))
                    .await;
                attempt += 1;
            }
            Err(e) => return Outcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted handler: companies discover two parties, licences discover
    /// one licence, leaves complete.
    struct ScriptedHandler;

    #[async_trait]
    impl JobHandler for ScriptedHandler {
        async fn handle(&self, job: &Job) -> Result<Outcome> {
            Ok(match job {
                Job::ImportCompanies => Outcome::Discovered(
                    (1..=2)
                        .map(|party_id| Job::ImportCompany {
                            region_code: 1,
                            party_id,
                        })
                        .collect(),
                ),
                Job::ImportLicences => Outcome::Discovered(vec![Job::ImportLicence {
                    licence_number: "01/123".to_string(),
                }]),
                _ => Outcome::Completed,
            })
        }
    }

    #[tokio::test]
    async fn full_run_flows_companies_then_licences_then_completes() {
        let config = ImportConfig::default();
        let bus = EventBus::new(64);
        let mut events = bus.subscribe();
        let orchestrator = Orchestrator::start(&config, Arc::new(ScriptedHandler), bus);

        orchestrator.trigger_run(RunTrigger::Manual).await.unwrap();

        loop {
            match events.recv().await.unwrap() {
                ImportEvent::RunCompleted { completed, failed, .. } => {
                    // Two company leaves + one licence leaf
                    assert_eq!(completed, 3);
                    assert_eq!(failed, 0);
                    break;
                }
                _ => continue,
            }
        }
    }

    /// Flaky handler: fails transiently twice, then succeeds
    struct FlakyHandler {
        calls: AtomicU32,
    }

    #[async_trait]
    impl JobHandler for FlakyHandler {
        async fn handle(&self, _job: &Job) -> Result<Outcome> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(Error::Io(std::io::Error::other("connection reset")))
            } else {
                Ok(Outcome::Completed)
            }
        }
    }

    #[tokio::test]
    async fn transient_errors_retry_until_success() {
        let handler = Arc::new(FlakyHandler {
            calls: AtomicU32::new(0),
        });
        let retry = RetryConfig {
            max_attempts: 3,
            backoff_ms: 1,
        };
        let outcome = execute_with_retry(
            &Job::ImportBillRuns { region_code: 1 },
            handler.as_ref(),
            retry,
        )
        .await;
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn terminal_errors_do_not_retry() {
        struct TerminalHandler {
            calls: AtomicU32,
        }

        #[async_trait]
        impl JobHandler for TerminalHandler {
            async fn handle(&self, _job: &Job) -> Result<Outcome> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::transform(1, "10", "unmapped licence version status code: XYZ"))
            }
        }

        let handler = Arc::new(TerminalHandler {
            calls: AtomicU32::new(0),
        });
        let retry = RetryConfig {
            max_attempts: 3,
            backoff_ms: 1,
        };
        let outcome = execute_with_retry(
            &Job::ImportLicence {
                licence_number: "01/123".to_string(),
            },
            handler.as_ref(),
            retry,
        )
        .await;
        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }
}
