//! 聚合快照加载与 PO 得分持久化

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use tracing::warn;

use super::assessments::load_lo_links;
use super::contributions::load_po_codes;
use super::{SeaOrmStorage, read_err, write_err};
use crate::engine::{OutcomeSnapshot, to_hundredths};
use crate::entity::assessments::{Column as AssessmentColumn, Entity as Assessments};
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::grades::{Column as GradeColumn, Entity as Grades};
use crate::entity::learning_outcomes::{Column as LoColumn, Entity as LearningOutcomes};
use crate::entity::lo_po_contributions::{Column as ContributionColumn, Entity as LoPoContributions};
use crate::entity::program_outcomes::{Column as PoColumn, Entity as ProgramOutcomes};
use crate::entity::student_po_scores::{ActiveModel, Column, Entity as StudentPoScores};
use crate::errors::Result;
use crate::models::reports::entities::StudentPoScore;

impl SeaOrmStorage {
    /// 加载成绩及其引用的考核、课程、LO 和贡献度
    pub async fn load_outcome_snapshot_impl(&self, student_id: Option<i64>) -> Result<OutcomeSnapshot> {
        let mut grade_select = Grades::find().order_by_asc(GradeColumn::Id);
        if let Some(student_id) = student_id {
            grade_select = grade_select.filter(GradeColumn::StudentId.eq(student_id));
        }
        let grades: Vec<_> = grade_select
            .all(&self.db)
            .await
            .map_err(|e| read_err("加载成绩失败", e))?
            .into_iter()
            .map(|m| m.into_grade())
            .collect();

        if grades.is_empty() {
            return Ok(OutcomeSnapshot::default());
        }

        let assessment_ids: Vec<i64> = grades
            .iter()
            .map(|g| g.assessment_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let assessment_models = Assessments::find()
            .filter(AssessmentColumn::Id.is_in(assessment_ids.clone()))
            .all(&self.db)
            .await
            .map_err(|e| read_err("加载考核失败", e))?;
        let mut links = load_lo_links(&self.db, &assessment_ids).await?;
        let assessments: Vec<_> = assessment_models
            .into_iter()
            .map(|m| {
                let lo_ids = links.remove(&m.id).unwrap_or_default();
                m.into_assessment(lo_ids)
            })
            .collect();

        let course_ids: BTreeSet<i64> = assessments.iter().map(|a| a.course_id).collect();
        let courses = Courses::find()
            .filter(CourseColumn::Id.is_in(course_ids.iter().copied().collect::<Vec<_>>()))
            .all(&self.db)
            .await
            .map_err(|e| read_err("加载课程失败", e))?
            .into_iter()
            .map(|m| m.into_course())
            .collect();

        let lo_ids: Vec<i64> = grades
            .iter()
            .filter_map(|g| g.learning_outcome_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let learning_outcomes = LearningOutcomes::find()
            .filter(LoColumn::Id.is_in(lo_ids.clone()))
            .all(&self.db)
            .await
            .map_err(|e| read_err("加载 LO 失败", e))?
            .into_iter()
            .map(|m| m.into_learning_outcome())
            .collect();

        let contribution_models = LoPoContributions::find()
            .filter(ContributionColumn::LearningOutcomeId.is_in(lo_ids))
            .order_by_asc(ContributionColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| read_err("加载贡献度失败", e))?;
        let codes = load_po_codes(
            &self.db,
            contribution_models
                .iter()
                .map(|m| m.program_outcome_id)
                .collect(),
        )
        .await?;
        let contributions = contribution_models
            .into_iter()
            .map(|m| {
                let code = codes.get(&m.program_outcome_id).cloned().unwrap_or_default();
                m.into_contribution(code)
            })
            .collect();

        Ok(OutcomeSnapshot {
            courses,
            assessments,
            learning_outcomes,
            contributions,
            grades,
        })
    }

    /// 删除学生原有的 PO 得分并写入新结果（同一事务）
    pub async fn replace_student_po_scores_impl(
        &self,
        student_id: i64,
        scores: &BTreeMap<String, Decimal>,
    ) -> Result<Vec<StudentPoScore>> {
        let tx = self
            .db
            .begin()
            .await
            .map_err(|e| read_err("开启事务失败", e))?;

        let po_ids: BTreeMap<String, i64> = ProgramOutcomes::find()
            .filter(PoColumn::Code.is_in(scores.keys().cloned().collect::<Vec<_>>()))
            .all(&tx)
            .await
            .map_err(|e| read_err("查询 PO 失败", e))?
            .into_iter()
            .map(|m| (m.code, m.id))
            .collect();

        StudentPoScores::delete_many()
            .filter(Column::StudentId.eq(student_id))
            .exec(&tx)
            .await
            .map_err(|e| write_err("清除 PO 得分失败", e))?;

        let now = chrono::Utc::now().timestamp();
        let mut stored = Vec::with_capacity(scores.len());
        for (code, score) in scores {
            let Some(po_id) = po_ids.get(code) else {
                warn!("PO {} 已不存在，跳过学生 {} 的得分", code, student_id);
                continue;
            };
            let model = ActiveModel {
                student_id: Set(student_id),
                program_outcome_id: Set(*po_id),
                score_hundredths: Set(to_hundredths(*score)),
                computed_at: Set(now),
                ..Default::default()
            }
            .insert(&tx)
            .await
            .map_err(|e| write_err("写入 PO 得分失败", e))?;
            stored.push(model.into_student_po_score(code.clone()));
        }

        tx.commit()
            .await
            .map_err(|e| write_err("提交 PO 得分事务失败", e))?;

        Ok(stored)
    }

    pub async fn list_student_po_scores_impl(&self, student_id: i64) -> Result<Vec<StudentPoScore>> {
        let models = StudentPoScores::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::ProgramOutcomeId)
            .all(&self.db)
            .await
            .map_err(|e| read_err("查询 PO 得分失败", e))?;

        let codes = load_po_codes(&self.db, models.iter().map(|m| m.program_outcome_id).collect()).await?;
        Ok(models
            .into_iter()
            .map(|m| {
                let code = codes.get(&m.program_outcome_id).cloned().unwrap_or_default();
                m.into_student_po_score(code)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_weighted_po_scores;
    use crate::models::courses::entities::AssessmentType;
    use crate::models::grades::entities::{GradeKey, GradeValues};
    use crate::storage::sea_orm_storage::test_support;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_snapshot_feeds_po_aggregation() {
        let storage = test_support::storage().await;
        let student = test_support::student(&storage, "s1").await;
        let other = test_support::student(&storage, "s2").await;
        let course = test_support::course(&storage, "CS101", dec!(5)).await;
        let lo = test_support::learning_outcome(&storage, course.id, "LO1").await;
        let po = test_support::program_outcome(&storage, "PO-01").await;
        test_support::contribution(&storage, lo.id, po.id, dec!(50)).await;
        let assessment = test_support::assessment(
            &storage,
            course.id,
            AssessmentType::Final,
            Some(dec!(80)),
            vec![lo.id],
        )
        .await;

        let rows = [student.id, other.id]
            .into_iter()
            .map(|student_id| GradeValues {
                key: GradeKey {
                    student_id,
                    assessment_id: assessment.id,
                    learning_outcome_id: Some(lo.id),
                },
                score_percentage: dec!(90),
                lo_mastery_score: 5,
            })
            .collect();
        storage.upsert_grades_impl(rows, None).await.unwrap();

        let snapshot = storage.load_outcome_snapshot_impl(Some(student.id)).await.unwrap();
        assert_eq!(snapshot.grades.len(), 1);
        assert_eq!(snapshot.courses.len(), 1);
        assert_eq!(snapshot.contributions[0].program_outcome_code, "PO-01");

        // 5 × 0.8 × 0.5 × 5 / (5 × 5) × 100 = 40
        let scores = compute_weighted_po_scores(student.id, &snapshot, None).unwrap();
        assert_eq!(scores["PO-01"], dec!(40.00));

        let all = storage.load_outcome_snapshot_impl(None).await.unwrap();
        assert_eq!(all.grades.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_snapshot() {
        let storage = test_support::storage().await;
        let snapshot = storage.load_outcome_snapshot_impl(Some(1)).await.unwrap();
        assert!(snapshot.grades.is_empty());
        assert!(snapshot.courses.is_empty());
    }

    #[tokio::test]
    async fn test_replace_drops_stale_rows() {
        let storage = test_support::storage().await;
        let student = test_support::student(&storage, "s1").await;
        test_support::program_outcome(&storage, "PO-01").await;
        test_support::program_outcome(&storage, "PO-02").await;

        let first = BTreeMap::from([
            ("PO-01".to_string(), dec!(40)),
            ("PO-02".to_string(), dec!(12.5)),
        ]);
        storage
            .replace_student_po_scores_impl(student.id, &first)
            .await
            .unwrap();

        let second = BTreeMap::from([("PO-01".to_string(), dec!(55))]);
        let stored = storage
            .replace_student_po_scores_impl(student.id, &second)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);

        let listed = storage.list_student_po_scores_impl(student.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].program_outcome_code, "PO-01");
        assert_eq!(listed[0].score, dec!(55));
    }
}
