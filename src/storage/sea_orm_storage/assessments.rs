//! 考核存储操作
//!
//! 所有改变权重的写入都在 `WeightLockKey::Course` 锁内开启事务，
//! 事务内重新读取已存储的权重后再校验，校验失败时不写入任何数据。

use std::collections::{BTreeSet, HashMap};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::grades::remove_grades_where;
use super::{SeaOrmStorage, WeightLockKey, read_err, write_err};
use crate::engine::to_hundredths;
use crate::engine::weights::{WeightRow, apply_change, validate_assessment_weights};
use crate::entity::assessment_learning_outcomes::{
    ActiveModel as LinkActiveModel, Column as LinkColumn, Entity as AssessmentLearningOutcomes,
};
use crate::entity::assessments::{ActiveModel, Column, Entity as Assessments};
use crate::entity::courses::Entity as Courses;
use crate::entity::grades::Column as GradeColumn;
use crate::entity::learning_outcomes::{Column as LoColumn, Entity as LearningOutcomes};
use crate::errors::{ObeError, Result};
use crate::models::courses::{
    entities::{Assessment, AssessmentType},
    requests::{AssessmentBatchRow, CreateAssessmentRequest, UpdateAssessmentRequest},
};
use crate::utils::validate::validate_percentage;

/// 考核 -> 关联 LO
pub(crate) async fn load_lo_links<C: ConnectionTrait>(
    conn: &C,
    assessment_ids: &[i64],
) -> Result<HashMap<i64, Vec<i64>>> {
    if assessment_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = AssessmentLearningOutcomes::find()
        .filter(LinkColumn::AssessmentId.is_in(assessment_ids.to_vec()))
        .order_by_asc(LinkColumn::LearningOutcomeId)
        .all(conn)
        .await
        .map_err(|e| read_err("查询考核关联 LO 失败", e))?;

    let mut map: HashMap<i64, Vec<i64>> = HashMap::new();
    for link in links {
        map.entry(link.assessment_id)
            .or_default()
            .push(link.learning_outcome_id);
    }
    Ok(map)
}

async fn load_course_assessments<C: ConnectionTrait>(
    conn: &C,
    course_id: i64,
) -> Result<Vec<Assessment>> {
    let models = Assessments::find()
        .filter(Column::CourseId.eq(course_id))
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| read_err("查询课程考核失败", e))?;

    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
    let mut links = load_lo_links(conn, &ids).await?;

    Ok(models
        .into_iter()
        .map(|m| {
            let lo_ids = links.remove(&m.id).unwrap_or_default();
            m.into_assessment(lo_ids)
        })
        .collect())
}

async fn ensure_course_exists<C: ConnectionTrait>(conn: &C, course_id: i64) -> Result<()> {
    let found = Courses::find_by_id(course_id)
        .one(conn)
        .await
        .map_err(|e| read_err("查询课程失败", e))?;
    if found.is_none() {
        return Err(ObeError::not_found(format!("Course {course_id} not found")));
    }
    Ok(())
}

/// 关联的 LO 必须属于同一课程，返回去重后的 ID
async fn check_course_outcomes<C: ConnectionTrait>(
    conn: &C,
    course_id: i64,
    learning_outcome_ids: &[i64],
) -> Result<Vec<i64>> {
    let wanted: BTreeSet<i64> = learning_outcome_ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let found: BTreeSet<i64> = LearningOutcomes::find()
        .select_only()
        .column(LoColumn::Id)
        .filter(LoColumn::CourseId.eq(course_id))
        .filter(LoColumn::Id.is_in(wanted.iter().copied().collect::<Vec<_>>()))
        .into_tuple::<i64>()
        .all(conn)
        .await
        .map_err(|e| read_err("查询课程 LO 失败", e))?
        .into_iter()
        .collect();

    if let Some(missing) = wanted.difference(&found).next() {
        return Err(ObeError::validation(format!(
            "Learning outcome {missing} does not belong to course {course_id}"
        )));
    }
    Ok(wanted.into_iter().collect())
}

async fn replace_links<C: ConnectionTrait>(
    conn: &C,
    assessment_id: i64,
    learning_outcome_ids: &[i64],
) -> Result<()> {
    AssessmentLearningOutcomes::delete_many()
        .filter(LinkColumn::AssessmentId.eq(assessment_id))
        .exec(conn)
        .await
        .map_err(|e| write_err("清除考核关联 LO 失败", e))?;

    for lo_id in learning_outcome_ids {
        LinkActiveModel {
            assessment_id: Set(assessment_id),
            learning_outcome_id: Set(*lo_id),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| write_err("写入考核关联 LO 失败", e))?;
    }
    Ok(())
}

fn check_weight_value(weight: Option<rust_decimal::Decimal>) -> Result<()> {
    match weight {
        Some(w) => validate_percentage(w).map_err(ObeError::invalid_numeric),
        None => Ok(()),
    }
}

impl SeaOrmStorage {
    pub async fn list_course_assessments_impl(&self, course_id: i64) -> Result<Vec<Assessment>> {
        load_course_assessments(&self.db, course_id).await
    }

    pub async fn get_assessment_by_id_impl(&self, id: i64) -> Result<Option<Assessment>> {
        let Some(model) = Assessments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询考核失败", e))?
        else {
            return Ok(None);
        };

        let mut links = load_lo_links(&self.db, &[id]).await?;
        Ok(Some(model.into_assessment(links.remove(&id).unwrap_or_default())))
    }

    pub async fn create_assessment_impl(
        &self,
        course_id: i64,
        req: CreateAssessmentRequest,
    ) -> Result<Assessment> {
        check_weight_value(req.weight_percentage)?;

        let _guard = self.weight_locks.acquire(WeightLockKey::Course(course_id)).await;
        let tx = self
            .db
            .begin()
            .await
            .map_err(|e| read_err("开启事务失败", e))?;

        ensure_course_exists(&tx, course_id).await?;
        let stored = load_course_assessments(&tx, course_id).await?;
        let rows: Vec<WeightRow> = stored.iter().map(WeightRow::from).collect();
        validate_assessment_weights(&stored, &apply_change(&rows, None, req.weight_percentage))?;

        let lo_ids = check_course_outcomes(&tx, course_id, &req.learning_outcome_ids).await?;

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            course_id: Set(course_id),
            assessment_type: Set(req.assessment_type.to_string()),
            weight_hundredths: Set(req.weight_percentage.map(to_hundredths)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&tx)
        .await
        .map_err(|e| write_err("创建考核失败", e))?;

        replace_links(&tx, model.id, &lo_ids).await?;

        tx.commit()
            .await
            .map_err(|e| write_err("提交考核事务失败", e))?;

        Ok(model.into_assessment(lo_ids))
    }

    pub async fn update_assessment_impl(
        &self,
        id: i64,
        req: UpdateAssessmentRequest,
    ) -> Result<Option<Assessment>> {
        check_weight_value(req.weight_percentage)?;

        let Some(existing) = Assessments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询考核失败", e))?
        else {
            return Ok(None);
        };
        let course_id = existing.course_id;

        let _guard = self.weight_locks.acquire(WeightLockKey::Course(course_id)).await;
        let tx = self
            .db
            .begin()
            .await
            .map_err(|e| read_err("开启事务失败", e))?;

        let stored = load_course_assessments(&tx, course_id).await?;
        let Some(current) = stored.iter().find(|a| a.id == id) else {
            // 加锁前已被删除
            return Ok(None);
        };

        let weight = if req.clear_weight {
            None
        } else {
            req.weight_percentage.or(current.weight_percentage)
        };
        let rows: Vec<WeightRow> = stored.iter().map(WeightRow::from).collect();
        validate_assessment_weights(&stored, &apply_change(&rows, Some(id), weight))?;

        let lo_ids = current.learning_outcome_ids.clone();
        let mut model: ActiveModel = existing.into();
        if let Some(assessment_type) = req.assessment_type {
            model.assessment_type = Set(assessment_type.to_string());
        }
        model.weight_hundredths = Set(weight.map(to_hundredths));
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&tx)
            .await
            .map_err(|e| write_err("更新考核失败", e))?;

        tx.commit()
            .await
            .map_err(|e| write_err("提交考核事务失败", e))?;

        Ok(Some(updated.into_assessment(lo_ids)))
    }

    /// 删除考核，其成绩在同一事务内删除并逐行审计
    pub async fn delete_assessment_impl(&self, id: i64) -> Result<bool> {
        let Some(existing) = Assessments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询考核失败", e))?
        else {
            return Ok(false);
        };

        let (deleted, removed) = {
            let _guard = self
                .weight_locks
                .acquire(WeightLockKey::Course(existing.course_id))
                .await;
            let tx = self
                .db
                .begin()
                .await
                .map_err(|e| read_err("开启事务失败", e))?;

            let removed =
                remove_grades_where(&tx, Condition::all().add(GradeColumn::AssessmentId.eq(id)))
                    .await?;
            let result = Assessments::delete_by_id(id)
                .exec(&tx)
                .await
                .map_err(|e| write_err("删除考核失败", e))?;

            tx.commit()
                .await
                .map_err(|e| write_err("提交考核事务失败", e))?;
            (result.rows_affected > 0, removed)
        };

        self.audit_removed_grades(&removed).await;
        Ok(deleted)
    }

    /// 批量编辑：每行描述考核的目标状态，整体校验后在一个事务内写入
    pub async fn batch_update_assessments_impl(
        &self,
        course_id: i64,
        rows: Vec<AssessmentBatchRow>,
    ) -> Result<Vec<Assessment>> {
        for row in &rows {
            check_weight_value(row.weight_percentage)?;
            if row.id.is_none() && !row.delete && row.assessment_type.is_none() {
                return Err(ObeError::validation(
                    "assessment_type is required for new assessments",
                ));
            }
        }

        let _guard = self.weight_locks.acquire(WeightLockKey::Course(course_id)).await;
        let tx = self
            .db
            .begin()
            .await
            .map_err(|e| read_err("开启事务失败", e))?;

        ensure_course_exists(&tx, course_id).await?;
        let stored = load_course_assessments(&tx, course_id).await?;
        let stored_by_id: HashMap<i64, &Assessment> = stored.iter().map(|a| (a.id, a)).collect();

        for id in rows.iter().filter_map(|r| r.id) {
            if !stored_by_id.contains_key(&id) {
                return Err(ObeError::not_found(format!(
                    "Assessment {id} not found in course {course_id}"
                )));
            }
        }

        // 未出现在批次中的考核保持不变
        let touched: HashMap<i64, &AssessmentBatchRow> =
            rows.iter().filter_map(|r| r.id.map(|id| (id, r))).collect();
        let mut proposed: Vec<WeightRow> = stored
            .iter()
            .filter(|a| !touched.contains_key(&a.id))
            .map(WeightRow::from)
            .collect();
        for row in &rows {
            match (row.id, row.delete) {
                (Some(id), true) => proposed.push(WeightRow::deleted(id)),
                (None, true) => {}
                (id, false) => proposed.push(WeightRow::new(id, row.weight_percentage)),
            }
        }
        validate_assessment_weights(&stored, &proposed)?;

        let deleted_ids: Vec<i64> = rows
            .iter()
            .filter(|r| r.delete)
            .filter_map(|r| r.id)
            .collect();
        let removed = if deleted_ids.is_empty() {
            Vec::new()
        } else {
            remove_grades_where(
                &tx,
                Condition::all().add(GradeColumn::AssessmentId.is_in(deleted_ids)),
            )
            .await?
        };

        let now = chrono::Utc::now().timestamp();
        for row in rows {
            match (row.id, row.delete) {
                (Some(id), true) => {
                    Assessments::delete_by_id(id)
                        .exec(&tx)
                        .await
                        .map_err(|e| write_err("删除考核失败", e))?;
                }
                (None, true) => {}
                (Some(id), false) => {
                    let current = stored_by_id[&id];
                    let assessment_type = row.assessment_type.unwrap_or(current.assessment_type);
                    ActiveModel {
                        id: Set(id),
                        course_id: Set(course_id),
                        assessment_type: Set(assessment_type.to_string()),
                        weight_hundredths: Set(row.weight_percentage.map(to_hundredths)),
                        created_at: Set(current.created_at.timestamp()),
                        updated_at: Set(now),
                    }
                    .update(&tx)
                    .await
                    .map_err(|e| write_err("更新考核失败", e))?;
                }
                (None, false) => {
                    let assessment_type = row.assessment_type.unwrap_or(AssessmentType::Other);
                    ActiveModel {
                        course_id: Set(course_id),
                        assessment_type: Set(assessment_type.to_string()),
                        weight_hundredths: Set(row.weight_percentage.map(to_hundredths)),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(&tx)
                    .await
                    .map_err(|e| write_err("创建考核失败", e))?;
                }
            }
        }

        let result = load_course_assessments(&tx, course_id).await?;
        tx.commit()
            .await
            .map_err(|e| write_err("提交考核事务失败", e))?;

        self.audit_removed_grades(&removed).await;
        Ok(result)
    }

    pub async fn set_assessment_outcomes_impl(
        &self,
        id: i64,
        learning_outcome_ids: Vec<i64>,
    ) -> Result<Option<Assessment>> {
        let tx = self
            .db
            .begin()
            .await
            .map_err(|e| read_err("开启事务失败", e))?;

        let Some(model) = Assessments::find_by_id(id)
            .one(&tx)
            .await
            .map_err(|e| read_err("查询考核失败", e))?
        else {
            return Ok(None);
        };

        let lo_ids = check_course_outcomes(&tx, model.course_id, &learning_outcome_ids).await?;
        replace_links(&tx, id, &lo_ids).await?;

        tx.commit()
            .await
            .map_err(|e| write_err("提交考核事务失败", e))?;

        Ok(Some(model.into_assessment(lo_ids)))
    }
}
