use rust_decimal::Decimal;
use serde::Deserialize;
use ts_rs::TS;

// 创建 LO 请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct CreateLearningOutcomeRequest {
    pub code: String,
    pub title: String,
    pub description: Option<String>,
}

// 更新 LO 请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct UpdateLearningOutcomeRequest {
    pub code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

// 创建 PO 请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct CreateProgramOutcomeRequest {
    pub code: String,
    pub title: String,
    pub description: Option<String>,
}

// 更新 PO 请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct UpdateProgramOutcomeRequest {
    pub code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

// 设置 LO 对某个 PO 的贡献度（已存在则更新）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "outcome.ts")]
pub struct UpsertContributionRequest {
    pub program_outcome_id: i64,
    #[ts(type = "string")]
    pub contribution_percentage: Decimal,
}
