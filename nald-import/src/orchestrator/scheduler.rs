//! Daily import schedule
//!
//! One long-lived task that sleeps until the configured trigger time
//! (UTC) and starts a full run. Environments with `import_enabled = false`
//! never schedule; manual triggers through the API still work there.

use super::Orchestrator;
use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use nald_common::config::ImportConfig;
use nald_common::events::RunTrigger;

/// The next `hour:minute` (UTC) strictly after `now`
pub fn next_occurrence(now: DateTime<Utc>, hour: u32, minute: u32) -> DateTime<Utc> {
    let today = now
        .with_hour(hour)
        .and_then(|t| t.with_minute(minute))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

/// Sleep-and-trigger loop; runs until the process exits
pub async fn run_scheduler(config: ImportConfig, orchestrator: Orchestrator) {
    if !config.import_enabled {
        tracing::info!("Scheduled import disabled in this environment");
        return;
    }

    loop {
        let now = Utc::now();
        let next = next_occurrence(now, config.schedule.hour, config.schedule.minute);
        let wait = (next - now)
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(60));
        tracing::info!(next = %next, "Next scheduled import run");
        tokio::time::sleep(wait).await;

        if let Err(e) = orchestrator.trigger_run(RunTrigger::Scheduled).await {
            tracing::error!(error = %e, "Failed to start scheduled import run");
        }
    }
}
