use serde::Serialize;

use crate::commands::MeasurementTable;
use crate::runtime::StatusLine;
use crate::ui::interaction::{EditOutcome, RoiModel};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StepReport {
    pub index: usize,
    pub step: String,
    pub duration_ms: u128,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<EditOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReplayReport {
    pub script_name: Option<String>,
    pub steps: Vec<StepReport>,
    pub rois: Vec<RoiModel>,
    pub measurements: Vec<MeasurementTable>,
    pub status: Vec<StatusLine>,
}

impl ReplayReport {
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| step.error.is_some())
    }
}
