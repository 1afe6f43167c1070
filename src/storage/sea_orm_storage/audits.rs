//! 成绩审计存储操作（只追加）

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use tracing::error;

use super::{SeaOrmStorage, read_err};
use crate::engine::to_hundredths;
use crate::entity::grade_audits::{ActiveModel, Column, Entity as GradeAudits};
use crate::errors::{ObeError, Result};
use crate::models::{
    PaginationInfo, PaginationQuery,
    grades::{
        entities::GradeAuditEntry, requests::GradeAuditListQuery,
        responses::GradeAuditListResponse,
    },
};

impl SeaOrmStorage {
    /// 追加审计记录；失败只记录日志，成绩写入已提交，不回滚
    pub async fn record_grade_audit_impl(&self, entry: GradeAuditEntry) {
        let model = ActiveModel {
            grade_id: Set(entry.grade_id),
            student_id: Set(entry.student_id),
            assessment_id: Set(entry.assessment_id),
            learning_outcome_id: Set(entry.learning_outcome_id),
            action: Set(entry.action.to_string()),
            changed_by: Set(entry.changed_by),
            old_score_hundredths: Set(entry.old_score.map(to_hundredths)),
            new_score_hundredths: Set(entry.new_score.map(to_hundredths)),
            old_mastery: Set(entry.old_mastery),
            new_mastery: Set(entry.new_mastery),
            changed_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Err(e) = model.insert(&self.db).await {
            let err = ObeError::audit_write_failed(format!(
                "{} grade audit for student {} on assessment {}: {e}",
                entry.action, entry.student_id, entry.assessment_id
            ));
            error!("{}", err);
        }
    }

    /// 最新在前
    pub async fn list_grade_audits_impl(
        &self,
        query: GradeAuditListQuery,
    ) -> Result<GradeAuditListResponse> {
        let (page, size) = PaginationQuery::normalized(query.page, query.size);

        let mut select = GradeAudits::find();
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(assessment_id) = query.assessment_id {
            select = select.filter(Column::AssessmentId.eq(assessment_id));
        }
        if let Some(grade_id) = query.grade_id {
            select = select.filter(Column::GradeId.eq(grade_id));
        }

        let paginator = select
            .order_by_desc(Column::ChangedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_err("查询审计总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_err("查询审计页数失败", e))?;
        let audits = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_err("查询审计列表失败", e))?;

        Ok(GradeAuditListResponse {
            items: audits.into_iter().map(|m| m.into_grade_audit()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::GradeAuditAction;
    use crate::storage::sea_orm_storage::test_support;
    use rust_decimal_macros::dec;

    fn entry(student_id: i64, grade_id: Option<i64>) -> GradeAuditEntry {
        GradeAuditEntry {
            grade_id,
            student_id,
            assessment_id: 3,
            learning_outcome_id: None,
            action: GradeAuditAction::Create,
            changed_by: None,
            old_score: None,
            new_score: Some(dec!(80)),
            old_mastery: None,
            new_mastery: Some(4),
        }
    }

    #[tokio::test]
    async fn test_audit_keeps_references_without_grade() {
        let storage = test_support::storage().await;
        storage.record_grade_audit_impl(entry(11, None)).await;
        storage.record_grade_audit_impl(entry(12, None)).await;

        let all = storage
            .list_grade_audits_impl(GradeAuditListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 2);
        assert_eq!(all.items[0].student_id, 12);
        assert_eq!(all.items[0].new_score, Some(dec!(80)));

        let filtered = storage
            .list_grade_audits_impl(GradeAuditListQuery {
                student_id: Some(11),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(filtered.items.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_append_is_swallowed() {
        let storage = test_support::storage().await;
        // 引用不存在的成绩，外键失败，但调用方不受影响
        storage.record_grade_audit_impl(entry(11, Some(404))).await;

        let all = storage
            .list_grade_audits_impl(GradeAuditListQuery::default())
            .await
            .unwrap();
        assert!(all.items.is_empty());
    }
}
