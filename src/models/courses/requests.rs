use rust_decimal::Decimal;
use serde::Deserialize;
use ts_rs::TS;

use super::entities::AssessmentType;
use crate::models::common::PaginationQuery;

// 课程查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 课程列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct CourseListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
}

impl From<CourseQueryParams> for CourseListQuery {
    fn from(params: CourseQueryParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            search: params.search,
        }
    }
}

// 创建课程请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateCourseRequest {
    pub code: String,
    pub title: String,
    #[ts(type = "string")]
    pub ects_credit: Decimal,
}

// 更新课程请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct UpdateCourseRequest {
    pub code: Option<String>,
    pub title: Option<String>,
    #[ts(type = "string | null")]
    pub ects_credit: Option<Decimal>,
}

// 创建考核请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateAssessmentRequest {
    pub assessment_type: AssessmentType,
    #[ts(type = "string | null")]
    pub weight_percentage: Option<Decimal>,
    #[serde(default)]
    pub learning_outcome_ids: Vec<i64>,
}

// 更新考核请求
//
// weight_percentage 为空表示不修改；clear_weight 为 true 时清除权重
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct UpdateAssessmentRequest {
    pub assessment_type: Option<AssessmentType>,
    #[ts(type = "string | null")]
    pub weight_percentage: Option<Decimal>,
    #[serde(default)]
    pub clear_weight: bool,
}

// 批量编辑中的一行（id 为空表示新增，delete 为 true 表示删除）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct AssessmentBatchRow {
    pub id: Option<i64>,
    pub assessment_type: Option<AssessmentType>,
    #[ts(type = "string | null")]
    pub weight_percentage: Option<Decimal>,
    #[serde(default)]
    pub delete: bool,
}

// 批量编辑课程考核
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct BatchAssessmentRequest {
    pub rows: Vec<AssessmentBatchRow>,
}

// 设置考核关联的 LO（整体替换）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct SetAssessmentOutcomesRequest {
    pub learning_outcome_ids: Vec<i64>,
}
