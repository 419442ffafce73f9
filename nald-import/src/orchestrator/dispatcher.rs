//! Completion dispatcher: fan-in barriers and downstream triggering
//!
//! Workers report every unit's outcome here. The dispatcher counts
//! outstanding units per stage and fires the stage's downstream action
//! exactly once, when the count reaches zero. A failed unit still counts
//! down its barrier, so one bad licence never wedges the run.

use super::jobs::{Downstream, Job, Outcome, StageEvent, StageId};
use chrono::Utc;
use nald_common::events::{EventBus, ImportEvent};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Maps a root stage to the stage of the leaves it discovers
fn fan_out_stage(root: StageId) -> Option<StageId> {
    match root {
        StageId::Companies => Some(StageId::Company),
        StageId::Licences => Some(StageId::Licence),
        _ => None,
    }
}

struct Barrier {
    outstanding: usize,
}

pub struct Dispatcher {
    job_tx: mpsc::Sender<Job>,
    event_bus: EventBus,
    barriers: HashMap<StageId, Barrier>,
    completed: usize,
    failed: usize,
}

impl Dispatcher {
    pub fn new(job_tx: mpsc::Sender<Job>, event_bus: EventBus) -> Self {
        Self {
            job_tx,
            event_bus,
            barriers: HashMap::new(),
            completed: 0,
            failed: 0,
        }
    }

    /// Consume completion reports until every sender is dropped
    pub async fn run(mut self, mut event_rx: mpsc::UnboundedReceiver<StageEvent>) {
        while let Some(event) = event_rx.recv().await {
            self.handle_event(event).await;
        }
        tracing::debug!("Dispatcher shutting down: all workers gone");
    }

    async fn handle_event(&mut self, event: StageEvent) {
        let stage = event.job.stage();
        match event.outcome {
            Outcome::Completed => {
                self.completed += 1;
                self.event_bus.emit_lossy(ImportEvent::StageCompleted {
                    stage: stage.as_str().to_string(),
                    unit_id: event.unit_id,
                    succeeded: true,
                    timestamp: Utc::now(),
                });
                self.count_down(stage).await;
            }
            Outcome::Failed(reason) => {
                self.failed += 1;
                tracing::warn!(
                    stage = stage.as_str(),
                    job = %event.job.describe(),
                    %reason,
                    "Import unit failed"
                );
                self.event_bus.emit_lossy(ImportEvent::UnitFailed {
                    stage: stage.as_str().to_string(),
                    unit_id: event.unit_id,
                    reason,
                    timestamp: Utc::now(),
                });
                if fan_out_stage(stage).is_some() {
                    // A failed discovery root armed no barrier, so nothing
                    // else will ever fire: end the run here rather than
                    // leaving its counters to leak into the next one.
                    self.fire(Downstream::RunComplete).await;
                } else {
                    self.count_down(stage).await;
                }
            }
            Outcome::Discovered(children) => {
                self.event_bus.emit_lossy(ImportEvent::StageCompleted {
                    stage: stage.as_str().to_string(),
                    unit_id: event.unit_id,
                    succeeded: true,
                    timestamp: Utc::now(),
                });
                let Some(child_stage) = fan_out_stage(stage) else {
                    tracing::error!(
                        stage = stage.as_str(),
                        "Leaf stage reported discovered children; dropping them"
                    );
                    return;
                };
                self.arm_barrier(child_stage, children).await;
            }
        }
    }

    /// Install the fan-in barrier for a batch of discovered children and
    /// enqueue them. An empty batch fires the downstream immediately.
    async fn arm_barrier(&mut self, child_stage: StageId, children: Vec<Job>) {
        if self
            .barriers
            .insert(
                child_stage,
                Barrier {
                    outstanding: children.len(),
                },
            )
            .is_some()
        {
            // A new run started while the previous one was still in
            // flight; the old barrier is abandoned and its downstream
            // will not fire twice.
            tracing::warn!(
                stage = child_stage.as_str(),
                "Replacing in-flight fan-in barrier: overlapping import runs"
            );
        }

        tracing::info!(
            stage = child_stage.as_str(),
            count = children.len(),
            "Fanning out discovered units"
        );

        if children.is_empty() {
            self.barriers.remove(&child_stage);
            self.fire(child_stage.downstream()).await;
            return;
        }
        for child in children {
            if self.job_tx.send(child).await.is_err() {
                tracing::error!("Job queue closed while fanning out");
                return;
            }
        }
    }

    async fn count_down(&mut self, stage: StageId) {
        let Some(barrier) = self.barriers.get_mut(&stage) else {
            return;
        };
        barrier.outstanding = barrier.outstanding.saturating_sub(1);
        if barrier.outstanding == 0 {
            self.barriers.remove(&stage);
            self.fire(stage.downstream()).await;
        }
    }

    async fn fire(&mut self, action: Downstream) {
        match action {
            Downstream::Submit(job) => {
                tracing::info!(job = %job.describe(), "Stage complete, submitting successor");
                if self.job_tx.send(job).await.is_err() {
                    tracing::error!("Job queue closed while submitting successor");
                }
            }
            Downstream::RunComplete => {
                tracing::info!(
                    completed = self.completed,
                    failed = self.failed,
                    "Import run complete"
                );
                self.event_bus.emit_lossy(ImportEvent::RunCompleted {
                    completed: self.completed,
                    failed: self.failed,
                    timestamp: Utc::now(),
                });
                self.completed = 0;
                self.failed = 0;
            }
            Downstream::Nothing => {}
        }
    }
}
