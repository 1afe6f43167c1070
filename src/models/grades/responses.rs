use serde::Serialize;
use ts_rs::TS;

use super::entities::{Grade, GradeAudit};
use crate::models::common::PaginationInfo;

// 成绩列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeListResponse {
    pub items: Vec<Grade>,
    pub pagination: PaginationInfo,
}

// 审计记录列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeAuditListResponse {
    pub items: Vec<GradeAudit>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "grade.ts")]
pub enum ImportRowStatus {
    Success,
    Failed,
}

// 导入单行结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct ImportRowResult {
    // 文件中的行号（含表头，从 1 开始）
    pub row: usize,
    pub status: ImportRowStatus,
    pub field: Option<String>,
    pub message: String,
}

impl ImportRowResult {
    pub fn success(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            status: ImportRowStatus::Success,
            field: None,
            message: message.into(),
        }
    }

    pub fn failed(row: usize, field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            row,
            status: ImportRowStatus::Failed,
            field: field.map(str::to_string),
            message: message.into(),
        }
    }
}

// 成绩导入响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeImportResponse {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub rows: Vec<ImportRowResult>,
}

impl GradeImportResponse {
    pub fn from_rows(mut rows: Vec<ImportRowResult>) -> Self {
        rows.sort_by_key(|r| r.row);
        let success = rows
            .iter()
            .filter(|r| r.status == ImportRowStatus::Success)
            .count();
        Self {
            total: rows.len(),
            success,
            failed: rows.len() - success,
            rows,
        }
    }
}
