//! Manual import triggers
//!
//! Operators can start a full run or the historical bill-run load without
//! waiting for the schedule. Triggers are accepted regardless of the
//! `import_enabled` gate; that gate only controls the daily schedule.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;

use crate::error::ApiResult;
use crate::AppState;
use nald_common::events::RunTrigger;

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub status: String,
}

/// POST /import/licences - start a full company+licence import run
pub async fn trigger_import(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<TriggerResponse>)> {
    tracing::info!("Manual import run requested");
    state.orchestrator.trigger_run(RunTrigger::Manual).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerResponse {
            status: "queued".to_string(),
        }),
    ))
}

/// POST /import/bill-runs - load historical bill runs for every region
pub async fn trigger_bill_runs(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<TriggerResponse>)> {
    tracing::info!("Manual bill-run import requested");
    state.orchestrator.trigger_bill_runs().await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(TriggerResponse {
            status: "queued".to_string(),
        }),
    ))
}

pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/import/licences", post(trigger_import))
        .route("/import/bill-runs", post(trigger_bill_runs))
}
