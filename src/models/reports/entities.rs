use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 持久化的学生 PO 得分（每次重算整体替换）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct StudentPoScore {
    pub id: i64,
    pub student_id: i64,
    pub program_outcome_id: i64,
    pub program_outcome_code: String,
    #[ts(type = "string")]
    pub score: Decimal,
    pub computed_at: chrono::DateTime<chrono::Utc>,
}
