//! 成绩存储操作
//!
//! 写入路径：校验 -> 同键加锁 -> 事务内读改写 -> 提交 -> 追加审计。

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
    sea_query::{Condition, JoinType},
};

use super::{SeaOrmStorage, read_err, write_err};
use crate::engine::to_hundredths;
use crate::entity::assessments::{Column as AssessmentColumn, Entity as Assessments};
use crate::entity::grades::{ActiveModel, Column, Entity as Grades, Model, Relation};
use crate::entity::learning_outcomes::Entity as LearningOutcomes;
use crate::entity::students::Entity as Students;
use crate::errors::{ObeError, Result};
use crate::models::{
    PaginationInfo, PaginationQuery,
    grades::{
        entities::{Grade, GradeAuditEntry, GradeKey, GradeValues, GradeWrite},
        requests::{CreateGradeRequest, GradeListQuery, UpdateGradeRequest},
        responses::GradeListResponse,
    },
};
use crate::utils::validate::{validate_mastery, validate_percentage};

fn check_values(score: rust_decimal::Decimal, mastery: i32) -> Result<()> {
    validate_percentage(score).map_err(ObeError::validation)?;
    validate_mastery(mastery).map_err(ObeError::validation)
}

fn key_condition(key: &GradeKey) -> Condition {
    let lo = match key.learning_outcome_id {
        Some(id) => Column::LearningOutcomeId.eq(id),
        None => Column::LearningOutcomeId.is_null(),
    };
    Condition::all()
        .add(Column::StudentId.eq(key.student_id))
        .add(Column::AssessmentId.eq(key.assessment_id))
        .add(lo)
}

async fn find_by_key<C: ConnectionTrait>(conn: &C, key: &GradeKey) -> Result<Option<Model>> {
    Grades::find()
        .filter(key_condition(key))
        .one(conn)
        .await
        .map_err(|e| read_err("查询成绩失败", e))
}

/// 插入或覆盖一行成绩
async fn write_values<C: ConnectionTrait>(conn: &C, values: &GradeValues) -> Result<GradeWrite> {
    let now = chrono::Utc::now().timestamp();
    let score = to_hundredths(values.score_percentage);

    match find_by_key(conn, &values.key).await? {
        Some(existing) => {
            let before = existing.clone().into_grade();
            let mut model: ActiveModel = existing.into();
            model.score_hundredths = Set(score);
            model.mastery_score = Set(values.lo_mastery_score);
            model.updated_at = Set(now);
            let after = model
                .update(conn)
                .await
                .map_err(|e| write_err("更新成绩失败", e))?
                .into_grade();
            Ok(GradeWrite::Updated { before, after })
        }
        None => {
            let created = ActiveModel {
                student_id: Set(values.key.student_id),
                assessment_id: Set(values.key.assessment_id),
                learning_outcome_id: Set(values.key.learning_outcome_id),
                score_hundredths: Set(score),
                mastery_score: Set(values.lo_mastery_score),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(|e| write_err("创建成绩失败", e))?
            .into_grade();
            Ok(GradeWrite::Created(created))
        }
    }
}

/// 删除满足条件的成绩并返回删除前的快照
///
/// 考核、LO、课程删除时先在同一事务内显式删除成绩，不依赖外键级联，
/// 提交后由 `audit_removed_grades` 为每一行补写删除审计。
pub(crate) async fn remove_grades_where<C: ConnectionTrait>(
    conn: &C,
    condition: Condition,
) -> Result<Vec<Grade>> {
    let removed = Grades::find()
        .filter(condition)
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| read_err("查询待删除成绩失败", e))?;
    if removed.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = removed.iter().map(|m| m.id).collect();
    Grades::delete_many()
        .filter(Column::Id.is_in(ids))
        .exec(conn)
        .await
        .map_err(|e| write_err("删除成绩失败", e))?;

    Ok(removed.into_iter().map(Model::into_grade).collect())
}

impl SeaOrmStorage {
    /// 目录删除连带删除的成绩，逐行追加删除审计
    pub(crate) async fn audit_removed_grades(&self, removed: &[Grade]) {
        for grade in removed {
            self.record_grade_audit_impl(GradeAuditEntry::for_delete(grade, None))
                .await;
        }
    }

    /// 校验成绩引用：学生、考核存在，LO 属于考核所在课程
    async fn check_grade_references(&self, key: &GradeKey) -> Result<()> {
        if Students::find_by_id(key.student_id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询学生失败", e))?
            .is_none()
        {
            return Err(ObeError::not_found(format!(
                "Student {} not found",
                key.student_id
            )));
        }

        let Some(assessment) = Assessments::find_by_id(key.assessment_id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询考核失败", e))?
        else {
            return Err(ObeError::not_found(format!(
                "Assessment {} not found",
                key.assessment_id
            )));
        };

        if let Some(lo_id) = key.learning_outcome_id {
            let Some(lo) = LearningOutcomes::find_by_id(lo_id)
                .one(&self.db)
                .await
                .map_err(|e| read_err("查询 LO 失败", e))?
            else {
                return Err(ObeError::not_found(format!(
                    "Learning outcome {lo_id} not found"
                )));
            };
            if lo.course_id != assessment.course_id {
                return Err(ObeError::validation(format!(
                    "Learning outcome {lo_id} does not belong to the course of assessment {}",
                    key.assessment_id
                )));
            }
        }
        Ok(())
    }

    pub async fn create_grade_impl(
        &self,
        req: CreateGradeRequest,
        actor: Option<i64>,
    ) -> Result<Grade> {
        check_values(req.score_percentage, req.lo_mastery_score)?;

        let key = GradeKey {
            student_id: req.student_id,
            assessment_id: req.assessment_id,
            learning_outcome_id: req.learning_outcome_id,
        };
        self.check_grade_references(&key).await?;

        let grade = {
            let _guard = self.grade_locks.acquire(key).await;
            let tx = self
                .db
                .begin()
                .await
                .map_err(|e| read_err("开启事务失败", e))?;

            if find_by_key(&tx, &key).await?.is_some() {
                return Err(ObeError::conflict(format!(
                    "Grade already exists for student {} on assessment {}",
                    key.student_id, key.assessment_id
                )));
            }

            let values = GradeValues {
                key,
                score_percentage: req.score_percentage,
                lo_mastery_score: req.lo_mastery_score,
            };
            let written = write_values(&tx, &values).await?;
            tx.commit()
                .await
                .map_err(|e| write_err("提交成绩事务失败", e))?;
            written.grade().clone()
        };

        self.record_grade_audit_impl(GradeAuditEntry::for_create(&grade, actor))
            .await;
        Ok(grade)
    }

    pub async fn get_grade_by_id_impl(&self, id: i64) -> Result<Option<Grade>> {
        let result = Grades::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询成绩失败", e))?;

        Ok(result.map(|m| m.into_grade()))
    }

    pub async fn update_grade_impl(
        &self,
        id: i64,
        req: UpdateGradeRequest,
        actor: Option<i64>,
    ) -> Result<Option<Grade>> {
        let Some(current) = self.get_grade_by_id_impl(id).await? else {
            return Ok(None);
        };

        let (before, after) = {
            let _guard = self.grade_locks.acquire(current.key()).await;
            let tx = self
                .db
                .begin()
                .await
                .map_err(|e| read_err("开启事务失败", e))?;

            // 加锁后重新读取
            let Some(existing) = Grades::find_by_id(id)
                .one(&tx)
                .await
                .map_err(|e| read_err("查询成绩失败", e))?
            else {
                return Ok(None);
            };
            let before = existing.clone().into_grade();
            let score = req.score_percentage.unwrap_or(before.score_percentage);
            let mastery = req.lo_mastery_score.unwrap_or(before.lo_mastery_score);
            check_values(score, mastery)?;

            let mut model: ActiveModel = existing.into();
            model.score_hundredths = Set(to_hundredths(score));
            model.mastery_score = Set(mastery);
            model.updated_at = Set(chrono::Utc::now().timestamp());
            let after = model
                .update(&tx)
                .await
                .map_err(|e| write_err("更新成绩失败", e))?
                .into_grade();

            tx.commit()
                .await
                .map_err(|e| write_err("提交成绩事务失败", e))?;
            (before, after)
        };

        self.record_grade_audit_impl(GradeAuditEntry::for_update(&before, &after, actor))
            .await;
        Ok(Some(after))
    }

    pub async fn delete_grade_impl(&self, id: i64, actor: Option<i64>) -> Result<Option<Grade>> {
        let Some(current) = self.get_grade_by_id_impl(id).await? else {
            return Ok(None);
        };

        let deleted = {
            let _guard = self.grade_locks.acquire(current.key()).await;
            let tx = self
                .db
                .begin()
                .await
                .map_err(|e| read_err("开启事务失败", e))?;

            let Some(existing) = Grades::find_by_id(id)
                .one(&tx)
                .await
                .map_err(|e| read_err("查询成绩失败", e))?
            else {
                return Ok(None);
            };
            Grades::delete_by_id(id)
                .exec(&tx)
                .await
                .map_err(|e| write_err("删除成绩失败", e))?;

            tx.commit()
                .await
                .map_err(|e| write_err("提交成绩事务失败", e))?;
            existing.into_grade()
        };

        self.record_grade_audit_impl(GradeAuditEntry::for_delete(&deleted, actor))
            .await;
        Ok(Some(deleted))
    }

    pub async fn list_grades_with_pagination_impl(
        &self,
        query: GradeListQuery,
    ) -> Result<GradeListResponse> {
        let (page, size) = PaginationQuery::normalized(query.page, query.size);

        let mut select = Grades::find();
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(assessment_id) = query.assessment_id {
            select = select.filter(Column::AssessmentId.eq(assessment_id));
        }
        if let Some(course_id) = query.course_id {
            select = select
                .join(JoinType::InnerJoin, Relation::Assessment.def())
                .filter(AssessmentColumn::CourseId.eq(course_id));
        }

        let paginator = select.order_by_asc(Column::Id).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_err("查询成绩总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_err("查询成绩页数失败", e))?;
        let grades = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_err("查询成绩列表失败", e))?;

        Ok(GradeListResponse {
            items: grades.into_iter().map(|m| m.into_grade()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_student_grades_impl(
        &self,
        student_id: i64,
        course_id: Option<i64>,
    ) -> Result<Vec<Grade>> {
        let mut select = Grades::find().filter(Column::StudentId.eq(student_id));
        if let Some(course_id) = course_id {
            select = select
                .join(JoinType::InnerJoin, Relation::Assessment.def())
                .filter(AssessmentColumn::CourseId.eq(course_id));
        }

        let grades = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| read_err("查询学生成绩失败", e))?;

        Ok(grades.into_iter().map(|m| m.into_grade()).collect())
    }

    /// 整批在一个事务内写入，任一行失败则整批回滚
    pub async fn upsert_grades_impl(
        &self,
        rows: Vec<GradeValues>,
        actor: Option<i64>,
    ) -> Result<Vec<GradeWrite>> {
        for values in &rows {
            check_values(values.score_percentage, values.lo_mastery_score)?;
        }

        // 按固定顺序加锁，同一键只锁一次
        let mut keys: Vec<GradeKey> = rows.iter().map(|v| v.key).collect();
        keys.sort_by_key(|k| (k.student_id, k.assessment_id, k.learning_outcome_id));
        keys.dedup();

        let writes = {
            let mut guards = Vec::with_capacity(keys.len());
            for key in keys {
                guards.push(self.grade_locks.acquire(key).await);
            }

            let tx = self
                .db
                .begin()
                .await
                .map_err(|e| read_err("开启事务失败", e))?;
            let mut writes = Vec::with_capacity(rows.len());
            for values in &rows {
                writes.push(write_values(&tx, values).await?);
            }
            tx.commit()
                .await
                .map_err(|e| write_err("提交成绩事务失败", e))?;
            writes
        };

        for write in &writes {
            self.record_grade_audit_impl(write.audit_entry(actor)).await;
        }
        Ok(writes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::AssessmentType;
    use crate::models::grades::entities::GradeAuditAction;
    use crate::models::grades::requests::GradeAuditListQuery;
    use crate::storage::sea_orm_storage::test_support;
    use rust_decimal_macros::dec;

    struct Fixture {
        storage: SeaOrmStorage,
        student_id: i64,
        course_id: i64,
        assessment_id: i64,
        lo_id: i64,
    }

    async fn fixture() -> Fixture {
        let storage = test_support::storage().await;
        let student = test_support::student(&storage, "s1001").await;
        let course = test_support::course(&storage, "CS101", dec!(5)).await;
        let lo = test_support::learning_outcome(&storage, course.id, "LO1").await;
        let assessment = test_support::assessment(
            &storage,
            course.id,
            AssessmentType::Midterm,
            Some(dec!(40)),
            vec![lo.id],
        )
        .await;
        Fixture {
            storage,
            student_id: student.id,
            course_id: course.id,
            assessment_id: assessment.id,
            lo_id: lo.id,
        }
    }

    fn create_request(f: &Fixture, score: rust_decimal::Decimal) -> CreateGradeRequest {
        CreateGradeRequest {
            student_id: f.student_id,
            assessment_id: f.assessment_id,
            learning_outcome_id: Some(f.lo_id),
            score_percentage: score,
            lo_mastery_score: 4,
        }
    }

    #[tokio::test]
    async fn test_create_and_duplicate_is_conflict() {
        let f = fixture().await;
        let grade = f
            .storage
            .create_grade_impl(create_request(&f, dec!(78.5)), Some(7))
            .await
            .unwrap();
        assert_eq!(grade.score_percentage, dec!(78.50));

        let err = f
            .storage
            .create_grade_impl(create_request(&f, dec!(90)), Some(7))
            .await
            .unwrap_err();
        assert!(matches!(err, ObeError::Conflict(_)));

        let audits = f
            .storage
            .list_grade_audits_impl(GradeAuditListQuery::default())
            .await
            .unwrap();
        assert_eq!(audits.items.len(), 1);
        assert_eq!(audits.items[0].action, GradeAuditAction::Create);
        assert_eq!(audits.items[0].changed_by, Some(7));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_values_and_references() {
        let f = fixture().await;
        let err = f
            .storage
            .create_grade_impl(create_request(&f, dec!(100.5)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ObeError::Validation(_)));

        let mut req = create_request(&f, dec!(50));
        req.lo_mastery_score = 6;
        let err = f.storage.create_grade_impl(req, None).await.unwrap_err();
        assert!(matches!(err, ObeError::Validation(_)));

        let mut req = create_request(&f, dec!(50));
        req.student_id = 999;
        let err = f.storage.create_grade_impl(req, None).await.unwrap_err();
        assert!(matches!(err, ObeError::NotFound(_)));

        let other = test_support::course(&f.storage, "CS102", dec!(5)).await;
        let foreign_lo = test_support::learning_outcome(&f.storage, other.id, "LO9").await;
        let mut req = create_request(&f, dec!(50));
        req.learning_outcome_id = Some(foreign_lo.id);
        let err = f.storage.create_grade_impl(req, None).await.unwrap_err();
        assert!(matches!(err, ObeError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_are_audited() {
        let f = fixture().await;
        let grade = f
            .storage
            .create_grade_impl(create_request(&f, dec!(60)), Some(1))
            .await
            .unwrap();

        let updated = f
            .storage
            .update_grade_impl(
                grade.id,
                UpdateGradeRequest {
                    score_percentage: Some(dec!(75)),
                    lo_mastery_score: None,
                },
                Some(2),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.score_percentage, dec!(75));
        assert_eq!(updated.lo_mastery_score, 4);

        let deleted = f
            .storage
            .delete_grade_impl(grade.id, Some(3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(deleted.id, grade.id);
        assert!(f.storage.get_grade_by_id_impl(grade.id).await.unwrap().is_none());
        assert!(f.storage.delete_grade_impl(grade.id, None).await.unwrap().is_none());

        let audits = f
            .storage
            .list_grade_audits_impl(GradeAuditListQuery {
                student_id: Some(f.student_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(audits.items.len(), 3);
        // 最新在前，删除后所有记录的 grade_id 均已置空
        let delete = &audits.items[0];
        assert_eq!(delete.action, GradeAuditAction::Delete);
        assert_eq!(delete.old_score, Some(dec!(75)));
        assert_eq!(delete.new_score, None);
        assert_eq!(delete.assessment_id, f.assessment_id);
        assert!(audits.items.iter().all(|a| a.grade_id.is_none()));
        assert_eq!(audits.items[1].old_score, Some(dec!(60)));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_and_filters_by_course() {
        let f = fixture().await;
        let key = GradeKey {
            student_id: f.student_id,
            assessment_id: f.assessment_id,
            learning_outcome_id: Some(f.lo_id),
        };
        let first = f
            .storage
            .upsert_grades_impl(
                vec![GradeValues {
                    key,
                    score_percentage: dec!(50),
                    lo_mastery_score: 3,
                }],
                None,
            )
            .await
            .unwrap();
        assert!(matches!(first[0], GradeWrite::Created(_)));

        let second = f
            .storage
            .upsert_grades_impl(
                vec![GradeValues {
                    key,
                    score_percentage: dec!(88),
                    lo_mastery_score: 5,
                }],
                None,
            )
            .await
            .unwrap();
        match &second[0] {
            GradeWrite::Updated { before, after } => {
                assert_eq!(before.score_percentage, dec!(50));
                assert_eq!(after.score_percentage, dec!(88));
            }
            other => panic!("unexpected write {other:?}"),
        }

        let in_course = f
            .storage
            .list_student_grades_impl(f.student_id, Some(f.course_id))
            .await
            .unwrap();
        assert_eq!(in_course.len(), 1);
        let elsewhere = f
            .storage
            .list_grades_with_pagination_impl(GradeListQuery {
                course_id: Some(f.course_id + 100),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(elsewhere.items.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_rolls_back_whole_batch() {
        let f = fixture().await;
        let good = GradeValues {
            key: GradeKey {
                student_id: f.student_id,
                assessment_id: f.assessment_id,
                learning_outcome_id: None,
            },
            score_percentage: dec!(70),
            lo_mastery_score: 3,
        };
        let bad = GradeValues {
            key: GradeKey {
                student_id: 999,
                assessment_id: f.assessment_id,
                learning_outcome_id: None,
            },
            score_percentage: dec!(70),
            lo_mastery_score: 3,
        };

        let err = f.storage.upsert_grades_impl(vec![good, bad], None).await;
        assert!(err.is_err());
        assert!(
            f.storage
                .list_student_grades_impl(f.student_id, None)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
