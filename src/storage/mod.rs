use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::engine::OutcomeSnapshot;
use crate::models::{
    courses::{
        entities::{Assessment, Course},
        requests::{
            AssessmentBatchRow, CourseListQuery, CreateAssessmentRequest, CreateCourseRequest,
            UpdateAssessmentRequest, UpdateCourseRequest,
        },
        responses::CourseListResponse,
    },
    grades::{
        entities::{Grade, GradeAuditEntry, GradeValues, GradeWrite},
        requests::{CreateGradeRequest, GradeAuditListQuery, GradeListQuery, UpdateGradeRequest},
        responses::{GradeAuditListResponse, GradeListResponse},
    },
    outcomes::{
        entities::{LearningOutcome, LoPoContribution, ProgramOutcome},
        requests::{
            CreateLearningOutcomeRequest, CreateProgramOutcomeRequest,
            UpdateLearningOutcomeRequest, UpdateProgramOutcomeRequest, UpsertContributionRequest,
        },
    },
    reports::entities::StudentPoScore,
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListQuery},
        responses::StudentListResponse,
    },
};

use crate::errors::Result;

pub mod locks;
pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 学生
    async fn create_student(&self, req: CreateStudentRequest) -> Result<Student>;
    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>>;
    async fn get_student_by_identifier(&self, identifier: &str) -> Result<Option<Student>>;
    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse>;
    // 所有学生 ID（全量重算用）
    async fn list_student_ids(&self) -> Result<Vec<i64>>;

    /// 课程
    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(&self, query: CourseListQuery)
    -> Result<CourseListResponse>;
    async fn update_course(&self, id: i64, req: UpdateCourseRequest) -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<bool>;
    // 系统内所有课程学分合计
    async fn total_system_ects(&self) -> Result<Decimal>;

    /// 考核（权重校验在写事务内完成）
    async fn list_course_assessments(&self, course_id: i64) -> Result<Vec<Assessment>>;
    async fn get_assessment_by_id(&self, id: i64) -> Result<Option<Assessment>>;
    async fn create_assessment(
        &self,
        course_id: i64,
        req: CreateAssessmentRequest,
    ) -> Result<Assessment>;
    async fn update_assessment(
        &self,
        id: i64,
        req: UpdateAssessmentRequest,
    ) -> Result<Option<Assessment>>;
    async fn delete_assessment(&self, id: i64) -> Result<bool>;
    // 批量编辑：新增 / 修改 / 删除在同一事务内，校验整体权重
    async fn batch_update_assessments(
        &self,
        course_id: i64,
        rows: Vec<AssessmentBatchRow>,
    ) -> Result<Vec<Assessment>>;
    async fn set_assessment_outcomes(
        &self,
        id: i64,
        learning_outcome_ids: Vec<i64>,
    ) -> Result<Option<Assessment>>;

    /// 课程学习成果（LO）
    async fn list_course_learning_outcomes(&self, course_id: i64) -> Result<Vec<LearningOutcome>>;
    async fn get_learning_outcome_by_id(&self, id: i64) -> Result<Option<LearningOutcome>>;
    async fn create_learning_outcome(
        &self,
        course_id: i64,
        req: CreateLearningOutcomeRequest,
    ) -> Result<LearningOutcome>;
    async fn update_learning_outcome(
        &self,
        id: i64,
        req: UpdateLearningOutcomeRequest,
    ) -> Result<Option<LearningOutcome>>;
    async fn delete_learning_outcome(&self, id: i64) -> Result<bool>;

    /// 专业毕业要求（PO）
    async fn list_program_outcomes(&self) -> Result<Vec<ProgramOutcome>>;
    async fn get_program_outcome_by_id(&self, id: i64) -> Result<Option<ProgramOutcome>>;
    async fn create_program_outcome(&self, req: CreateProgramOutcomeRequest)
    -> Result<ProgramOutcome>;
    async fn update_program_outcome(
        &self,
        id: i64,
        req: UpdateProgramOutcomeRequest,
    ) -> Result<Option<ProgramOutcome>>;
    async fn delete_program_outcome(&self, id: i64) -> Result<bool>;

    /// LO → PO 贡献度
    async fn list_lo_contributions(&self, learning_outcome_id: i64)
    -> Result<Vec<LoPoContribution>>;
    async fn upsert_contribution(
        &self,
        learning_outcome_id: i64,
        req: UpsertContributionRequest,
    ) -> Result<LoPoContribution>;
    async fn delete_contribution(
        &self,
        learning_outcome_id: i64,
        program_outcome_id: i64,
    ) -> Result<bool>;

    /// 成绩写入路径（同键串行 + 事务），提交后追加审计
    async fn create_grade(&self, req: CreateGradeRequest, actor: Option<i64>) -> Result<Grade>;
    async fn get_grade_by_id(&self, id: i64) -> Result<Option<Grade>>;
    async fn update_grade(
        &self,
        id: i64,
        req: UpdateGradeRequest,
        actor: Option<i64>,
    ) -> Result<Option<Grade>>;
    // 返回被删除的成绩
    async fn delete_grade(&self, id: i64, actor: Option<i64>) -> Result<Option<Grade>>;
    async fn list_grades_with_pagination(&self, query: GradeListQuery) -> Result<GradeListResponse>;
    // 学生成绩，可按课程过滤
    async fn list_student_grades(&self, student_id: i64, course_id: Option<i64>)
    -> Result<Vec<Grade>>;
    // 批量写入（导入），整批一个事务，已存在则覆盖
    async fn upsert_grades(
        &self,
        rows: Vec<GradeValues>,
        actor: Option<i64>,
    ) -> Result<Vec<GradeWrite>>;

    /// 审计
    // 失败只记录日志，不向调用方返回错误
    async fn record_grade_audit(&self, entry: GradeAuditEntry);
    async fn list_grade_audits(&self, query: GradeAuditListQuery)
    -> Result<GradeAuditListResponse>;

    /// 聚合输入与产物
    // student_id 为空时加载全部成绩
    async fn load_outcome_snapshot(&self, student_id: Option<i64>) -> Result<OutcomeSnapshot>;
    // 整体替换学生的 PO 得分
    async fn replace_student_po_scores(
        &self,
        student_id: i64,
        scores: &BTreeMap<String, Decimal>,
    ) -> Result<Vec<StudentPoScore>>;
    async fn list_student_po_scores(&self, student_id: i64) -> Result<Vec<StudentPoScore>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
