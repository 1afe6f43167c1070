//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assessments;
mod audits;
mod contributions;
mod courses;
mod grades;
mod outcomes;
mod snapshots;
mod students;

use std::collections::BTreeMap;
use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use tracing::info;

use super::locks::KeyedLocks;
use crate::config::AppConfig;
use crate::errors::{ObeError, Result};
use crate::models::grades::entities::GradeKey;

/// 权重校验的串行范围：同一课程的考核权重 / 同一 LO 的贡献度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum WeightLockKey {
    Course(i64),
    LearningOutcome(i64),
}

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
    pub(crate) grade_locks: KeyedLocks<GradeKey>,
    pub(crate) weight_locks: KeyedLocks<WeightLockKey>,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Self::migrate(&db).await?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self::from_connection(db))
    }

    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            db,
            grade_locks: KeyedLocks::new(),
            weight_locks: KeyedLocks::new(),
        }
    }

    async fn migrate(db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None)
            .await
            .map_err(|e| ObeError::database_operation(format!("数据库迁移失败: {e}")))
    }

    /// 内存 SQLite（单连接，已迁移）
    pub async fn new_in_memory() -> Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .map_err(|e| ObeError::database_connection(format!("SQLite 连接失败: {e}")))?;
        Self::migrate(&db).await?;
        Ok(Self::from_connection(db))
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ObeError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| ObeError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ObeError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") || url.starts_with("sqlite::memory:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ObeError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 写操作错误：唯一约束冲突映射为 Conflict，外键失败映射为 NotFound
pub(crate) fn write_err(context: &str, e: DbErr) -> ObeError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            ObeError::conflict(format!("{context}: 记录已存在 ({detail})"))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            ObeError::not_found(format!("{context}: 关联记录不存在 ({detail})"))
        }
        _ => ObeError::database_operation(format!("{context}: {e}")),
    }
}

pub(crate) fn read_err(context: &str, e: DbErr) -> ObeError {
    ObeError::database_operation(format!("{context}: {e}"))
}

// Storage trait 实现
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
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 学生模块
    async fn create_student(&self, req: CreateStudentRequest) -> Result<Student> {
        self.create_student_impl(req).await
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Option<Student>> {
        self.get_student_by_id_impl(id).await
    }

    async fn get_student_by_identifier(&self, identifier: &str) -> Result<Option<Student>> {
        self.get_student_by_identifier_impl(identifier).await
    }

    async fn list_students_with_pagination(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        self.list_students_with_pagination_impl(query).await
    }

    async fn list_student_ids(&self) -> Result<Vec<i64>> {
        self.list_student_ids_impl().await
    }

    // 课程模块
    async fn create_course(&self, req: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(req).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_courses_with_pagination(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        self.list_courses_with_pagination_impl(query).await
    }

    async fn update_course(&self, id: i64, req: UpdateCourseRequest) -> Result<Option<Course>> {
        self.update_course_impl(id, req).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    async fn total_system_ects(&self) -> Result<Decimal> {
        self.total_system_ects_impl().await
    }

    // 考核模块
    async fn list_course_assessments(&self, course_id: i64) -> Result<Vec<Assessment>> {
        self.list_course_assessments_impl(course_id).await
    }

    async fn get_assessment_by_id(&self, id: i64) -> Result<Option<Assessment>> {
        self.get_assessment_by_id_impl(id).await
    }

    async fn create_assessment(
        &self,
        course_id: i64,
        req: CreateAssessmentRequest,
    ) -> Result<Assessment> {
        self.create_assessment_impl(course_id, req).await
    }

    async fn update_assessment(
        &self,
        id: i64,
        req: UpdateAssessmentRequest,
    ) -> Result<Option<Assessment>> {
        self.update_assessment_impl(id, req).await
    }

    async fn delete_assessment(&self, id: i64) -> Result<bool> {
        self.delete_assessment_impl(id).await
    }

    async fn batch_update_assessments(
        &self,
        course_id: i64,
        rows: Vec<AssessmentBatchRow>,
    ) -> Result<Vec<Assessment>> {
        self.batch_update_assessments_impl(course_id, rows).await
    }

    async fn set_assessment_outcomes(
        &self,
        id: i64,
        learning_outcome_ids: Vec<i64>,
    ) -> Result<Option<Assessment>> {
        self.set_assessment_outcomes_impl(id, learning_outcome_ids)
            .await
    }

    // LO / PO 模块
    async fn list_course_learning_outcomes(&self, course_id: i64) -> Result<Vec<LearningOutcome>> {
        self.list_course_learning_outcomes_impl(course_id).await
    }

    async fn get_learning_outcome_by_id(&self, id: i64) -> Result<Option<LearningOutcome>> {
        self.get_learning_outcome_by_id_impl(id).await
    }

    async fn create_learning_outcome(
        &self,
        course_id: i64,
        req: CreateLearningOutcomeRequest,
    ) -> Result<LearningOutcome> {
        self.create_learning_outcome_impl(course_id, req).await
    }

    async fn update_learning_outcome(
        &self,
        id: i64,
        req: UpdateLearningOutcomeRequest,
    ) -> Result<Option<LearningOutcome>> {
        self.update_learning_outcome_impl(id, req).await
    }

    async fn delete_learning_outcome(&self, id: i64) -> Result<bool> {
        self.delete_learning_outcome_impl(id).await
    }

    async fn list_program_outcomes(&self) -> Result<Vec<ProgramOutcome>> {
        self.list_program_outcomes_impl().await
    }

    async fn get_program_outcome_by_id(&self, id: i64) -> Result<Option<ProgramOutcome>> {
        self.get_program_outcome_by_id_impl(id).await
    }

    async fn create_program_outcome(
        &self,
        req: CreateProgramOutcomeRequest,
    ) -> Result<ProgramOutcome> {
        self.create_program_outcome_impl(req).await
    }

    async fn update_program_outcome(
        &self,
        id: i64,
        req: UpdateProgramOutcomeRequest,
    ) -> Result<Option<ProgramOutcome>> {
        self.update_program_outcome_impl(id, req).await
    }

    async fn delete_program_outcome(&self, id: i64) -> Result<bool> {
        self.delete_program_outcome_impl(id).await
    }

    // 贡献度模块
    async fn list_lo_contributions(
        &self,
        learning_outcome_id: i64,
    ) -> Result<Vec<LoPoContribution>> {
        self.list_lo_contributions_impl(learning_outcome_id).await
    }

    async fn upsert_contribution(
        &self,
        learning_outcome_id: i64,
        req: UpsertContributionRequest,
    ) -> Result<LoPoContribution> {
        self.upsert_contribution_impl(learning_outcome_id, req)
            .await
    }

    async fn delete_contribution(
        &self,
        learning_outcome_id: i64,
        program_outcome_id: i64,
    ) -> Result<bool> {
        self.delete_contribution_impl(learning_outcome_id, program_outcome_id)
            .await
    }

    // 成绩模块
    async fn create_grade(&self, req: CreateGradeRequest, actor: Option<i64>) -> Result<Grade> {
        self.create_grade_impl(req, actor).await
    }

    async fn get_grade_by_id(&self, id: i64) -> Result<Option<Grade>> {
        self.get_grade_by_id_impl(id).await
    }

    async fn update_grade(
        &self,
        id: i64,
        req: UpdateGradeRequest,
        actor: Option<i64>,
    ) -> Result<Option<Grade>> {
        self.update_grade_impl(id, req, actor).await
    }

    async fn delete_grade(&self, id: i64, actor: Option<i64>) -> Result<Option<Grade>> {
        self.delete_grade_impl(id, actor).await
    }

    async fn list_grades_with_pagination(&self, query: GradeListQuery) -> Result<GradeListResponse> {
        self.list_grades_with_pagination_impl(query).await
    }

    async fn list_student_grades(
        &self,
        student_id: i64,
        course_id: Option<i64>,
    ) -> Result<Vec<Grade>> {
        self.list_student_grades_impl(student_id, course_id).await
    }

    async fn upsert_grades(
        &self,
        rows: Vec<GradeValues>,
        actor: Option<i64>,
    ) -> Result<Vec<GradeWrite>> {
        self.upsert_grades_impl(rows, actor).await
    }

    // 审计模块
    async fn record_grade_audit(&self, entry: GradeAuditEntry) {
        self.record_grade_audit_impl(entry).await
    }

    async fn list_grade_audits(
        &self,
        query: GradeAuditListQuery,
    ) -> Result<GradeAuditListResponse> {
        self.list_grade_audits_impl(query).await
    }

    // 聚合模块
    async fn load_outcome_snapshot(&self, student_id: Option<i64>) -> Result<OutcomeSnapshot> {
        self.load_outcome_snapshot_impl(student_id).await
    }

    async fn replace_student_po_scores(
        &self,
        student_id: i64,
        scores: &BTreeMap<String, Decimal>,
    ) -> Result<Vec<StudentPoScore>> {
        self.replace_student_po_scores_impl(student_id, scores)
            .await
    }

    async fn list_student_po_scores(&self, student_id: i64) -> Result<Vec<StudentPoScore>> {
        self.list_student_po_scores_impl(student_id).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! 存储层测试用的数据准备

    use rust_decimal::Decimal;

    use super::SeaOrmStorage;
    use crate::models::courses::entities::{Assessment, AssessmentType, Course};
    use crate::models::courses::requests::{CreateAssessmentRequest, CreateCourseRequest};
    use crate::models::grades::entities::{Grade, GradeAudit};
    use crate::models::grades::requests::{CreateGradeRequest, GradeAuditListQuery};
    use crate::models::outcomes::entities::{LearningOutcome, ProgramOutcome};
    use crate::models::outcomes::requests::{
        CreateLearningOutcomeRequest, CreateProgramOutcomeRequest, UpsertContributionRequest,
    };
    use crate::models::students::entities::Student;
    use crate::models::students::requests::CreateStudentRequest;

    pub async fn storage() -> SeaOrmStorage {
        SeaOrmStorage::new_in_memory().await.unwrap()
    }

    pub async fn course(storage: &SeaOrmStorage, code: &str, ects: Decimal) -> Course {
        storage
            .create_course_impl(CreateCourseRequest {
                code: code.to_string(),
                title: format!("Course {code}"),
                ects_credit: ects,
            })
            .await
            .unwrap()
    }

    pub async fn student(storage: &SeaOrmStorage, identifier: &str) -> Student {
        storage
            .create_student_impl(CreateStudentRequest {
                identifier: identifier.to_string(),
                display_name: None,
            })
            .await
            .unwrap()
    }

    pub async fn learning_outcome(
        storage: &SeaOrmStorage,
        course_id: i64,
        code: &str,
    ) -> LearningOutcome {
        storage
            .create_learning_outcome_impl(
                course_id,
                CreateLearningOutcomeRequest {
                    code: code.to_string(),
                    title: format!("Outcome {code}"),
                    description: None,
                },
            )
            .await
            .unwrap()
    }

    pub async fn program_outcome(storage: &SeaOrmStorage, code: &str) -> ProgramOutcome {
        storage
            .create_program_outcome_impl(CreateProgramOutcomeRequest {
                code: code.to_string(),
                title: format!("Program outcome {code}"),
                description: None,
            })
            .await
            .unwrap()
    }

    pub async fn assessment(
        storage: &SeaOrmStorage,
        course_id: i64,
        assessment_type: AssessmentType,
        weight: Option<Decimal>,
        learning_outcome_ids: Vec<i64>,
    ) -> Assessment {
        storage
            .create_assessment_impl(
                course_id,
                CreateAssessmentRequest {
                    assessment_type,
                    weight_percentage: weight,
                    learning_outcome_ids,
                },
            )
            .await
            .unwrap()
    }

    pub async fn contribution(
        storage: &SeaOrmStorage,
        lo_id: i64,
        po_id: i64,
        percentage: Decimal,
    ) {
        storage
            .upsert_contribution_impl(
                lo_id,
                UpsertContributionRequest {
                    program_outcome_id: po_id,
                    contribution_percentage: percentage,
                },
            )
            .await
            .unwrap();
    }

    pub async fn grade(
        storage: &SeaOrmStorage,
        student_id: i64,
        assessment_id: i64,
        lo_id: Option<i64>,
        score: Decimal,
    ) -> Grade {
        storage
            .create_grade_impl(
                CreateGradeRequest {
                    student_id,
                    assessment_id,
                    learning_outcome_id: lo_id,
                    score_percentage: score,
                    lo_mastery_score: 4,
                },
                Some(1),
            )
            .await
            .unwrap()
    }

    /// 学生的审计记录，最新在前
    pub async fn audits(storage: &SeaOrmStorage, student_id: i64) -> Vec<GradeAudit> {
        storage
            .list_grade_audits_impl(GradeAuditListQuery {
                student_id: Some(student_id),
                ..Default::default()
            })
            .await
            .unwrap()
            .items
    }
}
