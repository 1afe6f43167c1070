use serde::Serialize;
use ts_rs::TS;

use super::entities::{LearningOutcome, LoPoContribution, ProgramOutcome};
use crate::models::courses::responses::WeightSummary;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct LearningOutcomeListResponse {
    pub items: Vec<LearningOutcome>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct ProgramOutcomeListResponse {
    pub items: Vec<ProgramOutcome>,
}

// LO 的贡献度列表，附带合计
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct ContributionListResponse {
    pub learning_outcome_id: i64,
    pub items: Vec<LoPoContribution>,
    pub summary: WeightSummary,
}
