//! 课程存储操作

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::grades::remove_grades_where;
use super::{SeaOrmStorage, WeightLockKey, read_err, write_err};
use crate::engine::{from_hundredths, to_hundredths};
use crate::entity::assessments::{Column as AssessmentColumn, Entity as Assessments};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::grades::Column as GradeColumn;
use crate::entity::learning_outcomes::{Column as LoColumn, Entity as LearningOutcomes};
use crate::errors::Result;
use crate::models::{
    PaginationInfo, PaginationQuery,
    courses::{
        entities::Course,
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::CourseListResponse,
    },
};

impl SeaOrmStorage {
    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            code: Set(req.code),
            title: Set(req.title),
            ects_hundredths: Set(to_hundredths(req.ects_credit)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err("创建课程失败", e))?;

        Ok(result.into_course())
    }

    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询课程失败", e))?;

        Ok(result.map(|m| m.into_course()))
    }

    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let (page, size) = PaginationQuery::normalized(query.page, query.size);

        let mut select = Courses::find();

        // 按代码或名称搜索
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Code.contains(search))
                    .add(Column::Title.contains(search)),
            );
        }

        let paginator = select.order_by_asc(Column::Code).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_err("查询课程总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_err("查询课程页数失败", e))?;
        let courses = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_err("查询课程列表失败", e))?;

        Ok(CourseListResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_course_impl(
        &self,
        id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        let Some(existing) = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询课程失败", e))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(code) = update.code {
            model.code = Set(code);
        }
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(ects) = update.ects_credit {
            model.ects_hundredths = Set(to_hundredths(ects));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| write_err("更新课程失败", e))?;

        Ok(Some(updated.into_course()))
    }

    /// 删除课程，考核与 LO 随外键级联删除；成绩先显式删除并逐行审计
    pub async fn delete_course_impl(&self, id: i64) -> Result<bool> {
        let _guard = self.weight_locks.acquire(WeightLockKey::Course(id)).await;
        let tx = self
            .db
            .begin()
            .await
            .map_err(|e| read_err("开启事务失败", e))?;

        let assessment_ids: Vec<i64> = Assessments::find()
            .select_only()
            .column(AssessmentColumn::Id)
            .filter(AssessmentColumn::CourseId.eq(id))
            .into_tuple()
            .all(&tx)
            .await
            .map_err(|e| read_err("查询课程考核失败", e))?;
        let lo_ids: Vec<i64> = LearningOutcomes::find()
            .select_only()
            .column(LoColumn::Id)
            .filter(LoColumn::CourseId.eq(id))
            .into_tuple()
            .all(&tx)
            .await
            .map_err(|e| read_err("查询课程 LO 失败", e))?;

        let removed = if assessment_ids.is_empty() && lo_ids.is_empty() {
            Vec::new()
        } else {
            remove_grades_where(
                &tx,
                Condition::any()
                    .add(GradeColumn::AssessmentId.is_in(assessment_ids))
                    .add(GradeColumn::LearningOutcomeId.is_in(lo_ids)),
            )
            .await?
        };

        let result = Courses::delete_by_id(id)
            .exec(&tx)
            .await
            .map_err(|e| write_err("删除课程失败", e))?;

        tx.commit()
            .await
            .map_err(|e| write_err("提交课程事务失败", e))?;

        self.audit_removed_grades(&removed).await;
        Ok(result.rows_affected > 0)
    }

    pub async fn total_system_ects_impl(&self) -> Result<Decimal> {
        let credits: Vec<i64> = Courses::find()
            .select_only()
            .column(Column::EctsHundredths)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| read_err("统计课程学分失败", e))?;

        Ok(credits.into_iter().map(from_hundredths).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ObeError;
    use crate::models::courses::entities::AssessmentType;
    use crate::models::grades::entities::GradeAuditAction;
    use crate::storage::sea_orm_storage::test_support;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_course_round_trip_keeps_decimal_credit() {
        let storage = test_support::storage().await;
        let course = test_support::course(&storage, "CS101", dec!(7.5)).await;

        let loaded = storage.get_course_by_id_impl(course.id).await.unwrap().unwrap();
        assert_eq!(loaded.ects_credit, dec!(7.50));
        assert_eq!(loaded.code, "CS101");
    }

    #[tokio::test]
    async fn test_duplicate_code_is_conflict() {
        let storage = test_support::storage().await;
        test_support::course(&storage, "CS101", dec!(5)).await;
        let err = storage
            .create_course_impl(CreateCourseRequest {
                code: "CS101".to_string(),
                title: "Again".to_string(),
                ects_credit: dec!(5),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ObeError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_and_total_ects() {
        let storage = test_support::storage().await;
        let first = test_support::course(&storage, "CS101", dec!(5)).await;
        test_support::course(&storage, "CS102", dec!(3)).await;

        let updated = storage
            .update_course_impl(
                first.id,
                UpdateCourseRequest {
                    ects_credit: Some(dec!(6)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.ects_credit, dec!(6));
        assert_eq!(storage.total_system_ects_impl().await.unwrap(), dec!(9));

        assert!(
            storage
                .update_course_impl(999, UpdateCourseRequest::default())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let storage = test_support::storage().await;
        let course = test_support::course(&storage, "MATH201", dec!(4)).await;
        test_support::course(&storage, "CS101", dec!(5)).await;

        let resp = storage
            .list_courses_with_pagination_impl(CourseListQuery {
                search: Some("MATH".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(resp.items.len(), 1);

        assert!(storage.delete_course_impl(course.id).await.unwrap());
        assert!(!storage.delete_course_impl(course.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_course_audits_every_removed_grade() {
        let storage = test_support::storage().await;
        let s1 = test_support::student(&storage, "s1").await;
        let s2 = test_support::student(&storage, "s2").await;
        let course = test_support::course(&storage, "CS101", dec!(5)).await;
        let lo = test_support::learning_outcome(&storage, course.id, "LO1").await;
        let assessment = test_support::assessment(
            &storage,
            course.id,
            AssessmentType::Final,
            Some(dec!(100)),
            vec![lo.id],
        )
        .await;
        test_support::grade(&storage, s1.id, assessment.id, Some(lo.id), dec!(88)).await;
        test_support::grade(&storage, s2.id, assessment.id, None, dec!(47.5)).await;

        assert!(storage.delete_course_impl(course.id).await.unwrap());

        for (student_id, score) in [(s1.id, dec!(88)), (s2.id, dec!(47.5))] {
            let audits = test_support::audits(&storage, student_id).await;
            assert_eq!(audits.len(), 2);
            assert_eq!(audits[0].action, GradeAuditAction::Delete);
            assert_eq!(audits[0].old_score, Some(score));
            assert_eq!(audits[0].new_score, None);
            assert_eq!(audits[0].new_mastery, None);
        }
    }
}
