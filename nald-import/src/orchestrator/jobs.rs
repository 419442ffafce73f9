//! Job and stage model for the import pipeline
//!
//! Two kinds of jobs: roots, which scan staging and discover a batch of
//! leaf jobs, and leaves, which import one unit (a company, a licence, or
//! one region's bill runs). A root's discovered children form a fan-out
//! whose completion gates the next root.

use async_trait::async_trait;
use nald_common::Result;
use serde::{Deserialize, Serialize};

/// A unit of work on the import queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum Job {
    /// Root: discover every party in staging, fan out to `ImportCompany`
    ImportCompanies,
    /// Leaf: import one party as a company graph
    ImportCompany { region_code: i64, party_id: i64 },
    /// Root: discover every licence number in staging, fan out to
    /// `ImportLicence`
    ImportLicences,
    /// Leaf: import one licence graph
    ImportLicence { licence_number: String },
    /// Leaf: load one region's historical bill runs
    ImportBillRuns { region_code: i64 },
}

impl Job {
    pub fn stage(&self) -> StageId {
        match self {
            Job::ImportCompanies => StageId::Companies,
            Job::ImportCompany { .. } => StageId::Company,
            Job::ImportLicences => StageId::Licences,
            Job::ImportLicence { .. } => StageId::Licence,
            Job::ImportBillRuns { .. } => StageId::BillRuns,
        }
    }

    /// Short human-readable identity for logs and events
    pub fn describe(&self) -> String {
        match self {
            Job::ImportCompanies => "import-companies".to_string(),
            Job::ImportCompany {
                region_code,
                party_id,
            } => format!("import-company {}:{}", region_code, party_id),
            Job::ImportLicences => "import-licences".to_string(),
            Job::ImportLicence { licence_number } => {
                format!("import-licence {}", licence_number)
            }
            Job::ImportBillRuns { region_code } => {
                format!("import-bill-runs region {}", region_code)
            }
        }
    }
}

/// Pipeline stage. Concurrency limits and fan-in barriers are tracked per
/// stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Companies,
    Company,
    Licences,
    Licence,
    BillRuns,
}

impl StageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::Companies => "companies",
            StageId::Company => "company",
            StageId::Licences => "licences",
            StageId::Licence => "licence",
            StageId::BillRuns => "bill_runs",
        }
    }

    /// What happens when every unit of this stage has finished
    pub fn downstream(&self) -> Downstream {
        match self {
            // The companies root is a single unit; its fan-in is the
            // completion of its discovered children
            StageId::Companies => Downstream::Nothing,
            StageId::Company => Downstream::Submit(Job::ImportLicences),
            StageId::Licences => Downstream::Nothing,
            StageId::Licence => Downstream::RunComplete,
            StageId::BillRuns => Downstream::Nothing,
        }
    }
}

/// Action the dispatcher takes when a stage's fan-in barrier reaches zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Downstream {
    /// Submit the next root job
    Submit(Job),
    /// The whole run is finished
    RunComplete,
    /// No gated successor
    Nothing,
}

/// Result of handling one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Leaf finished
    Completed,
    /// Root finished and discovered its children
    Discovered(Vec<Job>),
    /// Terminal failure after retries were exhausted or the error was not
    /// retryable
    Failed(String),
}

/// Completion report from a worker to the dispatcher
#[derive(Debug, Clone)]
pub struct StageEvent {
    pub job: Job,
    pub unit_id: uuid::Uuid,
    pub outcome: Outcome,
}

/// Executes one job. The production handler drives the extract/transform/
/// load pipeline; tests substitute scripted handlers.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &Job) -> Result<Outcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_fan_in_gates_the_licences_root() {
        assert_eq!(
            StageId::Company.downstream(),
            Downstream::Submit(Job::ImportLicences)
        );
    }

    #[test]
    fn licence_fan_in_completes_the_run() {
        assert_eq!(StageId::Licence.downstream(), Downstream::RunComplete);
    }

    #[test]
    fn bill_runs_have_no_gated_successor() {
        assert_eq!(StageId::BillRuns.downstream(), Downstream::Nothing);
    }

    #[test]
    fn job_stage_mapping() {
        assert_eq!(Job::ImportCompanies.stage(), StageId::Companies);
        assert_eq!(
            Job::ImportLicence {
                licence_number: "01/123".to_string()
            }
            .stage(),
            StageId::Licence
        );
    }
}
