use rust_decimal::Decimal;
use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;

// 录入成绩请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct CreateGradeRequest {
    pub student_id: i64,
    pub assessment_id: i64,
    pub learning_outcome_id: Option<i64>,
    #[ts(type = "string")]
    pub score_percentage: Decimal,
    pub lo_mastery_score: i32,
}

// 修改成绩请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct UpdateGradeRequest {
    #[ts(type = "string | null")]
    pub score_percentage: Option<Decimal>,
    pub lo_mastery_score: Option<i32>,
}

// 成绩查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub student_id: Option<i64>,
    pub assessment_id: Option<i64>,
    pub course_id: Option<i64>,
}

// 成绩列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct GradeListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub assessment_id: Option<i64>,
    pub course_id: Option<i64>,
}

impl From<GradeQueryParams> for GradeListQuery {
    fn from(params: GradeQueryParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            student_id: params.student_id,
            assessment_id: params.assessment_id,
            course_id: params.course_id,
        }
    }
}

// 审计记录查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeAuditQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub student_id: Option<i64>,
    pub assessment_id: Option<i64>,
    pub grade_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct GradeAuditListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub student_id: Option<i64>,
    pub assessment_id: Option<i64>,
    pub grade_id: Option<i64>,
}

impl From<GradeAuditQueryParams> for GradeAuditListQuery {
    fn from(params: GradeAuditQueryParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            student_id: params.student_id,
            assessment_id: params.assessment_id,
            grade_id: params.grade_id,
        }
    }
}
