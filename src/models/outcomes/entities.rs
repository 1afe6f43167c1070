use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程学习成果（LO）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct LearningOutcome {
    pub id: i64,
    pub course_id: i64,
    // 课程内唯一
    pub code: String,
    pub title: String,
    pub description: Option<String>,
}

// 专业毕业要求（PO）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct ProgramOutcome {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
}

// LO 对 PO 的贡献度
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct LoPoContribution {
    pub id: i64,
    pub learning_outcome_id: i64,
    pub program_outcome_id: i64,
    pub program_outcome_code: String,
    #[ts(type = "string")]
    pub contribution_percentage: Decimal,
}
