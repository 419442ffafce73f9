//! Orchestrator fan-out/fan-in tests
//!
//! Exercises the scheduler with scripted handlers: randomized batch sizes
//! and completion orders, stage concurrency caps, and the ordering
//! guarantee that the licences stage never starts before every company
//! unit has finished.

use async_trait::async_trait;
use nald_common::config::ImportConfig;
use nald_common::events::{EventBus, ImportEvent, RunTrigger};
use nald_import::orchestrator::jobs::{Job, JobHandler, Outcome};
use nald_import::orchestrator::Orchestrator;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Scripted handler with configurable fan-out sizes. Leaves sleep a random
/// few milliseconds so completion order is shuffled, and track how many
/// run concurrently.
struct ScriptedHandler {
    companies: usize,
    licences: usize,
    pending_companies: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedHandler {
    fn new(companies: usize, licences: usize) -> Self {
        Self {
            companies,
            licences,
            pending_companies: AtomicUsize::new(companies),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    async fn leaf(&self) -> Outcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = rand::thread_rng().gen_range(0..5);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Outcome::Completed
    }
}

#[async_trait]
impl JobHandler for ScriptedHandler {
    async fn handle(&self, job: &Job) -> nald_common::Result<Outcome> {
        Ok(match job {
            Job::ImportCompanies => Outcome::Discovered(
                (0..self.companies as i64)
                    .map(|party_id| Job::ImportCompany {
                        region_code: 1,
                        party_id,
                    })
                    .collect(),
            ),
            Job::ImportLicences => {
                // The licences root must never start while company units
                // are outstanding
                assert_eq!(
                    self.pending_companies.load(Ordering::SeqCst),
                    0,
                    "licences root started before company fan-in"
                );
                Outcome::Discovered(
                    (0..self.licences)
                        .map(|i| Job::ImportLicence {
                            licence_number: format!("01/{}", i),
                        })
                        .collect(),
                )
            }
            Job::ImportCompany { .. } => {
                let outcome = self.leaf().await;
                self.pending_companies.fetch_sub(1, Ordering::SeqCst);
                outcome
            }
            _ => self.leaf().await,
        })
    }
}

async fn run_and_wait(handler: Arc<ScriptedHandler>, config: &ImportConfig) -> (usize, usize) {
    let bus = EventBus::new(256);
    let mut events = bus.subscribe();
    let orchestrator = Orchestrator::start(config, handler, bus);
    orchestrator.trigger_run(RunTrigger::Manual).await.unwrap();

    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            if let ImportEvent::RunCompleted {
                completed, failed, ..
            } = events.recv().await.unwrap()
            {
                return (completed, failed);
            }
        }
    })
    .await
    .expect("run did not complete")
}

#[tokio::test]
async fn downstream_fires_exactly_after_all_children_with_random_sizes() {
    for _ in 0..5 {
        let (companies, licences) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(0..40), rng.gen_range(0..40))
        };
        let handler = Arc::new(ScriptedHandler::new(companies, licences));
        let (completed, failed) = run_and_wait(handler.clone(), &ImportConfig::default()).await;

        assert_eq!(completed, companies + licences);
        assert_eq!(failed, 0);
    }
}

#[tokio::test]
async fn stage_concurrency_never_exceeds_the_configured_cap() {
    let mut config = ImportConfig::default();
    config.workers.companies = 3;
    config.workers.licences = 3;

    let handler = Arc::new(ScriptedHandler::new(30, 30));
    run_and_wait(handler.clone(), &config).await;

    assert!(
        handler.max_in_flight.load(Ordering::SeqCst) <= 3,
        "observed {} concurrent leaf units",
        handler.max_in_flight.load(Ordering::SeqCst)
    );
}

#[tokio::test]
async fn zero_children_complete_the_run_immediately() {
    let handler = Arc::new(ScriptedHandler::new(0, 0));
    let (completed, failed) = run_and_wait(handler, &ImportConfig::default()).await;
    assert_eq!(completed, 0);
    assert_eq!(failed, 0);
}

/// Handler whose leaves fail with a terminal transform error
struct FailingLeaves;

#[async_trait]
impl JobHandler for FailingLeaves {
    async fn handle(&self, job: &Job) -> nald_common::Result<Outcome> {
        match job {
            Job::ImportCompanies => Ok(Outcome::Discovered(
                (0..4)
                    .map(|party_id| Job::ImportCompany {
                        region_code: 1,
                        party_id,
                    })
                    .collect(),
            )),
            Job::ImportLicences => Ok(Outcome::Discovered(vec![])),
            _ => Err(nald_common::Error::transform(
                1,
                "100",
                "party referenced but never extracted",
            )),
        }
    }
}

#[tokio::test]
async fn failed_units_are_reported_and_the_run_still_completes() {
    let bus = EventBus::new(256);
    let mut events = bus.subscribe();
    let orchestrator = Orchestrator::start(
        &ImportConfig::default(),
        Arc::new(FailingLeaves),
        bus,
    );
    orchestrator.trigger_run(RunTrigger::Manual).await.unwrap();

    let mut unit_failures = 0;
    let (completed, failed) = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match events.recv().await.unwrap() {
                ImportEvent::UnitFailed { .. } => unit_failures += 1,
                ImportEvent::RunCompleted {
                    completed, failed, ..
                } => return (completed, failed),
                _ => {}
            }
        }
    })
    .await
    .expect("run did not complete");

    assert_eq!(completed, 0);
    assert_eq!(failed, 4);
    assert_eq!(unit_failures, 4);
}

/// Root discovery that fails terminally on its first call and discovers
/// nothing afterwards
struct FailingDiscovery {
    calls: AtomicUsize,
}

#[async_trait]
impl JobHandler for FailingDiscovery {
    async fn handle(&self, job: &Job) -> nald_common::Result<Outcome> {
        match job {
            Job::ImportCompanies => {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(nald_common::Error::transform(
                        1,
                        "scan",
                        "staging tables unreadable",
                    ))
                } else {
                    Ok(Outcome::Discovered(vec![]))
                }
            }
            Job::ImportLicences => Ok(Outcome::Discovered(vec![])),
            _ => Ok(Outcome::Completed),
        }
    }
}

#[tokio::test]
async fn failed_root_discovery_completes_the_run_and_resets_counters() {
    let bus = EventBus::new(256);
    let mut events = bus.subscribe();
    let orchestrator = Orchestrator::start(
        &ImportConfig::default(),
        Arc::new(FailingDiscovery {
            calls: AtomicUsize::new(0),
        }),
        bus,
    );

    orchestrator.trigger_run(RunTrigger::Manual).await.unwrap();
    assert_eq!(next_completion(&mut events).await, (0, 1));

    // The failure must not leak into the next run's accounting
    orchestrator.trigger_run(RunTrigger::Manual).await.unwrap();
    assert_eq!(next_completion(&mut events).await, (0, 0));
}

async fn next_completion(
    events: &mut tokio::sync::broadcast::Receiver<ImportEvent>,
) -> (usize, usize) {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let ImportEvent::RunCompleted {
                completed, failed, ..
            } = events.recv().await.unwrap()
            {
                return (completed, failed);
            }
        }
    })
    .await
    .expect("run did not complete")
}

/// Licence units block on a gate that only a bill-run unit opens, so the
/// run can only finish if a saturated licence stage never stalls dispatch
/// of the bill-run job queued behind it.
struct GatedLicences {
    gate: Arc<Semaphore>,
}

#[async_trait]
impl JobHandler for GatedLicences {
    async fn handle(&self, job: &Job) -> nald_common::Result<Outcome> {
        match job {
            Job::ImportLicence { .. } => {
                let _open = self.gate.acquire().await.unwrap();
                Ok(Outcome::Completed)
            }
            Job::ImportBillRuns { .. } => {
                self.gate.add_permits(2);
                Ok(Outcome::Completed)
            }
            _ => Ok(Outcome::Completed),
        }
    }
}

#[tokio::test]
async fn saturated_stage_does_not_stall_other_stages() {
    let mut config = ImportConfig::default();
    config.workers.licences = 1;

    let bus = EventBus::new(256);
    let mut events = bus.subscribe();
    let orchestrator = Orchestrator::start(
        &config,
        Arc::new(GatedLicences {
            gate: Arc::new(Semaphore::new(0)),
        }),
        bus,
    );

    for i in 0..2 {
        orchestrator
            .enqueue(Job::ImportLicence {
                licence_number: format!("01/{}", i),
            })
            .await
            .unwrap();
    }
    orchestrator
        .enqueue(Job::ImportBillRuns { region_code: 1 })
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(10), async {
        let mut done = 0;
        while done < 3 {
            if let ImportEvent::StageCompleted { .. } = events.recv().await.unwrap() {
                done += 1;
            }
        }
    })
    .await
    .expect("bill-run unit starved behind a saturated licence stage");
}
