//! Sequential step pipeline.
//!
//! The orchestration is an ordered list of named steps run strictly in
//! program order. A step reports one of three outcomes; a fatal failure
//! halts the run and the remaining steps are recorded as skipped, while
//! a non-fatal failure is recorded and execution continues. There is no
//! dependency graph, no parallelism, and no retry.

use serde::Serialize;

use crate::error::Error;

pub enum StepOutcome {
    Completed,
    Skipped(String),
    Failed { error: Error, fatal: bool },
}

pub struct Step<C> {
    pub id: &'static str,
    pub run: fn(&mut C) -> StepOutcome,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub id: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_steps: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub steps: Vec<StepRecord>,
    pub summary: RunSummary,
    /// Id of the step whose fatal failure aborted the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted_by: Option<String>,
}

impl PipelineResult {
    pub fn fatal_exit_code(&self) -> Option<i32> {
        let halted = self.halted_by.as_deref()?;
        self.steps
            .iter()
            .find(|record| record.id == halted)
            .and_then(|record| record.exit_code)
    }

    pub fn failed(&self) -> bool {
        self.steps
            .iter()
            .any(|record| record.status == StepStatus::Failed)
    }
}

/// Run every step in order, halting on fatal failures.
pub fn run<C>(steps: &[Step<C>], ctx: &mut C) -> PipelineResult {
    let mut records = Vec::with_capacity(steps.len());
    let mut halted_by: Option<String> = None;

    for step in steps {
        if let Some(fatal_id) = &halted_by {
            records.push(StepRecord {
                id: step.id.to_string(),
                status: StepStatus::Skipped,
                note: Some(format!("Not run: '{}' failed", fatal_id)),
                error: None,
                error_code: None,
                exit_code: None,
            });
            continue;
        }

        log_status!("run", "Step {}", step.id);
        let record = match (step.run)(ctx) {
            StepOutcome::Completed => StepRecord {
                id: step.id.to_string(),
                status: StepStatus::Success,
                note: None,
                error: None,
                error_code: None,
                exit_code: None,
            },
            StepOutcome::Skipped(reason) => StepRecord {
                id: step.id.to_string(),
                status: StepStatus::Skipped,
                note: Some(reason),
                error: None,
                error_code: None,
                exit_code: None,
            },
            StepOutcome::Failed { error, fatal } => {
                if fatal {
                    halted_by = Some(step.id.to_string());
                }
                StepRecord {
                    id: step.id.to_string(),
                    status: StepStatus::Failed,
                    note: None,
                    error: Some(error.to_string()),
                    error_code: Some(error.code().to_string()),
                    exit_code: Some(error.exit_code()),
                }
            }
        };
        records.push(record);
    }

    let summary = build_summary(&records);
    PipelineResult {
        steps: records,
        summary,
        halted_by,
    }
}

fn build_summary(records: &[StepRecord]) -> RunSummary {
    RunSummary {
        total_steps: records.len(),
        succeeded: records
            .iter()
            .filter(|r| r.status == StepStatus::Success)
            .count(),
        failed: records
            .iter()
            .filter(|r| r.status == StepStatus::Failed)
            .count(),
        skipped: records
            .iter()
            .filter(|r| r.status == StepStatus::Skipped)
            .count(),
    }
}
