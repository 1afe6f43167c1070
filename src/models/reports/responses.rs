use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::StudentPoScore;
use crate::engine::DepartmentPoScore;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct LoScoresResponse {
    pub student_id: i64,
    pub course_id: i64,
    #[ts(type = "Record<string, string>")]
    pub scores: BTreeMap<String, Decimal>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct CourseGradeResponse {
    pub student_id: i64,
    pub course_id: i64,
    #[ts(type = "string")]
    pub score: Decimal,
    #[ts(type = "string")]
    pub gpa: Decimal,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct PoScoresResponse {
    pub student_id: i64,
    pub course_id: Option<i64>,
    #[ts(type = "Record<string, string>")]
    pub scores: BTreeMap<String, Decimal>,
    // 各 PO 得分平均值，无数据时为空
    #[ts(type = "string | null")]
    pub average: Option<Decimal>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct StoredPoScoresResponse {
    pub student_id: i64,
    pub items: Vec<StudentPoScore>,
}

// 单个学生重算结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct RecomputeResponse {
    pub student_id: i64,
    #[ts(type = "Record<string, string>")]
    pub scores: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct RecomputeFailure {
    pub student_id: i64,
    pub message: String,
}

// 全量重算结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct RecomputeAllResponse {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<RecomputeFailure>,
}

// 院系 PO 报表（可缓存）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct DepartmentReportResponse {
    pub report_available: bool,
    pub message: Option<String>,
    #[ts(type = "string")]
    pub total_system_ects: Decimal,
    pub data: BTreeMap<String, DepartmentPoScore>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct GpaResponse {
    #[ts(type = "string")]
    pub score: Decimal,
    #[ts(type = "string")]
    pub gpa: Decimal,
}
