//! 课程 LO 与专业 PO 存储操作

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::grades::remove_grades_where;
use super::{SeaOrmStorage, read_err, write_err};
use crate::entity::courses::Entity as Courses;
use crate::entity::grades::Column as GradeColumn;
use crate::entity::learning_outcomes::{
    ActiveModel as LoActiveModel, Column as LoColumn, Entity as LearningOutcomes,
};
use crate::entity::program_outcomes::{
    ActiveModel as PoActiveModel, Column as PoColumn, Entity as ProgramOutcomes,
};
use crate::errors::{ObeError, Result};
use crate::models::outcomes::{
    entities::{LearningOutcome, ProgramOutcome},
    requests::{
        CreateLearningOutcomeRequest, CreateProgramOutcomeRequest, UpdateLearningOutcomeRequest,
        UpdateProgramOutcomeRequest,
    },
};

impl SeaOrmStorage {
    pub async fn list_course_learning_outcomes_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<LearningOutcome>> {
        let models = LearningOutcomes::find()
            .filter(LoColumn::CourseId.eq(course_id))
            .order_by_asc(LoColumn::Code)
            .all(&self.db)
            .await
            .map_err(|e| read_err("查询课程 LO 失败", e))?;

        Ok(models.into_iter().map(|m| m.into_learning_outcome()).collect())
    }

    pub async fn get_learning_outcome_by_id_impl(&self, id: i64) -> Result<Option<LearningOutcome>> {
        let result = LearningOutcomes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询 LO 失败", e))?;

        Ok(result.map(|m| m.into_learning_outcome()))
    }

    /// 同一课程内 LO 代码唯一
    pub async fn create_learning_outcome_impl(
        &self,
        course_id: i64,
        req: CreateLearningOutcomeRequest,
    ) -> Result<LearningOutcome> {
        let course = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询课程失败", e))?;
        if course.is_none() {
            return Err(ObeError::not_found(format!("Course {course_id} not found")));
        }

        let model = LoActiveModel {
            course_id: Set(course_id),
            code: Set(req.code),
            title: Set(req.title),
            description: Set(req.description),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err("创建 LO 失败", e))?;

        Ok(result.into_learning_outcome())
    }

    pub async fn update_learning_outcome_impl(
        &self,
        id: i64,
        update: UpdateLearningOutcomeRequest,
    ) -> Result<Option<LearningOutcome>> {
        let Some(existing) = LearningOutcomes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询 LO 失败", e))?
        else {
            return Ok(None);
        };

        let mut model: LoActiveModel = existing.into();
        if let Some(code) = update.code {
            model.code = Set(code);
        }
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| write_err("更新 LO 失败", e))?;

        Ok(Some(updated.into_learning_outcome()))
    }

    /// 删除 LO，贡献度与考核关联随外键级联删除；按 LO 录入的成绩显式删除并逐行审计
    pub async fn delete_learning_outcome_impl(&self, id: i64) -> Result<bool> {
        let tx = self
            .db
            .begin()
            .await
            .map_err(|e| read_err("开启事务失败", e))?;

        let removed = remove_grades_where(
            &tx,
            Condition::all().add(GradeColumn::LearningOutcomeId.eq(id)),
        )
        .await?;
        let result = LearningOutcomes::delete_by_id(id)
            .exec(&tx)
            .await
            .map_err(|e| write_err("删除 LO 失败", e))?;

        tx.commit()
            .await
            .map_err(|e| write_err("提交 LO 事务失败", e))?;

        self.audit_removed_grades(&removed).await;
        Ok(result.rows_affected > 0)
    }

    pub async fn list_program_outcomes_impl(&self) -> Result<Vec<ProgramOutcome>> {
        let models = ProgramOutcomes::find()
            .order_by_asc(PoColumn::Code)
            .all(&self.db)
            .await
            .map_err(|e| read_err("查询 PO 列表失败", e))?;

        Ok(models.into_iter().map(|m| m.into_program_outcome()).collect())
    }

    pub async fn get_program_outcome_by_id_impl(&self, id: i64) -> Result<Option<ProgramOutcome>> {
        let result = ProgramOutcomes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询 PO 失败", e))?;

        Ok(result.map(|m| m.into_program_outcome()))
    }

    pub async fn create_program_outcome_impl(
        &self,
        req: CreateProgramOutcomeRequest,
    ) -> Result<ProgramOutcome> {
        let model = PoActiveModel {
            code: Set(req.code),
            title: Set(req.title),
            description: Set(req.description),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err("创建 PO 失败", e))?;

        Ok(result.into_program_outcome())
    }

    pub async fn update_program_outcome_impl(
        &self,
        id: i64,
        update: UpdateProgramOutcomeRequest,
    ) -> Result<Option<ProgramOutcome>> {
        let Some(existing) = ProgramOutcomes::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询 PO 失败", e))?
        else {
            return Ok(None);
        };

        let mut model: PoActiveModel = existing.into();
        if let Some(code) = update.code {
            model.code = Set(code);
        }
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| write_err("更新 PO 失败", e))?;

        Ok(Some(updated.into_program_outcome()))
    }

    pub async fn delete_program_outcome_impl(&self, id: i64) -> Result<bool> {
        let result = ProgramOutcomes::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| write_err("删除 PO 失败", e))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::AssessmentType;
    use crate::models::grades::entities::GradeAuditAction;
    use crate::storage::sea_orm_storage::test_support;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_learning_outcome_code_unique_per_course() {
        let storage = test_support::storage().await;
        let cs101 = test_support::course(&storage, "CS101", dec!(5)).await;
        let cs102 = test_support::course(&storage, "CS102", dec!(5)).await;
        test_support::learning_outcome(&storage, cs101.id, "LO1").await;
        // 不同课程可以复用代码
        test_support::learning_outcome(&storage, cs102.id, "LO1").await;

        let err = storage
            .create_learning_outcome_impl(
                cs101.id,
                CreateLearningOutcomeRequest {
                    code: "LO1".to_string(),
                    title: "Duplicate".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ObeError::Conflict(_)));
        assert_eq!(
            storage.list_course_learning_outcomes_impl(cs101.id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_learning_outcome_requires_course() {
        let storage = test_support::storage().await;
        let err = storage
            .create_learning_outcome_impl(
                42,
                CreateLearningOutcomeRequest {
                    code: "LO1".to_string(),
                    title: "Orphan".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ObeError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_program_outcome_crud() {
        let storage = test_support::storage().await;
        let po = test_support::program_outcome(&storage, "PO-01").await;

        let updated = storage
            .update_program_outcome_impl(
                po.id,
                UpdateProgramOutcomeRequest {
                    title: Some("Problem analysis".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Problem analysis");
        assert_eq!(updated.code, "PO-01");

        assert_eq!(storage.list_program_outcomes_impl().await.unwrap().len(), 1);
        assert!(storage.delete_program_outcome_impl(po.id).await.unwrap());
        assert!(storage.get_program_outcome_by_id_impl(po.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_learning_outcome_audits_removed_grades() {
        let storage = test_support::storage().await;
        let student = test_support::student(&storage, "s1").await;
        let course = test_support::course(&storage, "CS101", dec!(5)).await;
        let lo1 = test_support::learning_outcome(&storage, course.id, "LO1").await;
        let lo2 = test_support::learning_outcome(&storage, course.id, "LO2").await;
        let assessment = test_support::assessment(
            &storage,
            course.id,
            AssessmentType::Final,
            Some(dec!(50)),
            vec![lo1.id, lo2.id],
        )
        .await;
        test_support::grade(&storage, student.id, assessment.id, Some(lo1.id), dec!(90)).await;
        let other =
            test_support::grade(&storage, student.id, assessment.id, Some(lo2.id), dec!(65)).await;

        assert!(storage.delete_learning_outcome_impl(lo1.id).await.unwrap());

        let audits = test_support::audits(&storage, student.id).await;
        assert_eq!(audits.len(), 3);
        let latest = &audits[0];
        assert_eq!(latest.action, GradeAuditAction::Delete);
        assert_eq!(latest.learning_outcome_id, Some(lo1.id));
        assert_eq!(latest.new_score, None);
        assert_eq!(latest.new_mastery, None);
        // 其他 LO 的成绩不受影响
        assert!(storage.get_grade_by_id_impl(other.id).await.unwrap().is_some());
    }
}
