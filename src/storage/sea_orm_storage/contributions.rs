//! LO → PO 贡献度存储操作

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::{SeaOrmStorage, WeightLockKey, read_err, write_err};
use crate::engine::to_hundredths;
use crate::engine::weights::{WeightRow, apply_change, validate_lo_contribution};
use crate::entity::learning_outcomes::Entity as LearningOutcomes;
use crate::entity::lo_po_contributions::{ActiveModel, Column, Entity as LoPoContributions};
use crate::entity::program_outcomes::{Column as PoColumn, Entity as ProgramOutcomes};
use crate::errors::{ObeError, Result};
use crate::models::outcomes::{entities::LoPoContribution, requests::UpsertContributionRequest};
use crate::utils::validate::validate_percentage;

/// PO id -> code
pub(crate) async fn load_po_codes<C: ConnectionTrait>(
    conn: &C,
    program_outcome_ids: Vec<i64>,
) -> Result<HashMap<i64, String>> {
    if program_outcome_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = ProgramOutcomes::find()
        .filter(PoColumn::Id.is_in(program_outcome_ids))
        .all(conn)
        .await
        .map_err(|e| read_err("查询 PO 代码失败", e))?;

    Ok(models.into_iter().map(|m| (m.id, m.code)).collect())
}

async fn load_lo_contributions<C: ConnectionTrait>(
    conn: &C,
    learning_outcome_id: i64,
) -> Result<Vec<LoPoContribution>> {
    let models = LoPoContributions::find()
        .filter(Column::LearningOutcomeId.eq(learning_outcome_id))
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| read_err("查询贡献度失败", e))?;

    let codes = load_po_codes(conn, models.iter().map(|m| m.program_outcome_id).collect()).await?;
    Ok(models
        .into_iter()
        .map(|m| {
            let code = codes.get(&m.program_outcome_id).cloned().unwrap_or_default();
            m.into_contribution(code)
        })
        .collect())
}

impl SeaOrmStorage {
    pub async fn list_lo_contributions_impl(
        &self,
        learning_outcome_id: i64,
    ) -> Result<Vec<LoPoContribution>> {
        load_lo_contributions(&self.db, learning_outcome_id).await
    }

    /// 设置 LO 对某个 PO 的贡献度，写入后该 LO 的合计不得超过 100
    pub async fn upsert_contribution_impl(
        &self,
        learning_outcome_id: i64,
        req: UpsertContributionRequest,
    ) -> Result<LoPoContribution> {
        validate_percentage(req.contribution_percentage).map_err(ObeError::invalid_numeric)?;

        let _guard = self
            .weight_locks
            .acquire(WeightLockKey::LearningOutcome(learning_outcome_id))
            .await;
        let tx = self
            .db
            .begin()
            .await
            .map_err(|e| read_err("开启事务失败", e))?;

        if LearningOutcomes::find_by_id(learning_outcome_id)
            .one(&tx)
            .await
            .map_err(|e| read_err("查询 LO 失败", e))?
            .is_none()
        {
            return Err(ObeError::not_found(format!(
                "Learning outcome {learning_outcome_id} not found"
            )));
        }
        let Some(po) = ProgramOutcomes::find_by_id(req.program_outcome_id)
            .one(&tx)
            .await
            .map_err(|e| read_err("查询 PO 失败", e))?
        else {
            return Err(ObeError::not_found(format!(
                "Program outcome {} not found",
                req.program_outcome_id
            )));
        };

        let stored = load_lo_contributions(&tx, learning_outcome_id).await?;
        let existing = stored
            .iter()
            .find(|c| c.program_outcome_id == req.program_outcome_id)
            .map(|c| c.id);
        let rows: Vec<WeightRow> = stored.iter().map(WeightRow::from).collect();
        validate_lo_contribution(
            &stored,
            &apply_change(&rows, existing, Some(req.contribution_percentage)),
        )?;

        let hundredths = to_hundredths(req.contribution_percentage);
        let model = match existing {
            Some(id) => ActiveModel {
                id: Set(id),
                learning_outcome_id: Set(learning_outcome_id),
                program_outcome_id: Set(req.program_outcome_id),
                contribution_hundredths: Set(hundredths),
            }
            .update(&tx)
            .await
            .map_err(|e| write_err("更新贡献度失败", e))?,
            None => ActiveModel {
                learning_outcome_id: Set(learning_outcome_id),
                program_outcome_id: Set(req.program_outcome_id),
                contribution_hundredths: Set(hundredths),
                ..Default::default()
            }
            .insert(&tx)
            .await
            .map_err(|e| write_err("创建贡献度失败", e))?,
        };

        tx.commit()
            .await
            .map_err(|e| write_err("提交贡献度事务失败", e))?;

        Ok(model.into_contribution(po.code))
    }

    pub async fn delete_contribution_impl(
        &self,
        learning_outcome_id: i64,
        program_outcome_id: i64,
    ) -> Result<bool> {
        let _guard = self
            .weight_locks
            .acquire(WeightLockKey::LearningOutcome(learning_outcome_id))
            .await;
        let result = LoPoContributions::delete_many()
            .filter(Column::LearningOutcomeId.eq(learning_outcome_id))
            .filter(Column::ProgramOutcomeId.eq(program_outcome_id))
            .exec(&self.db)
            .await
            .map_err(|e| write_err("删除贡献度失败", e))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::weights::sum_weights;
    use crate::storage::sea_orm_storage::test_support;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_upsert_replaces_existing_pair() {
        let storage = test_support::storage().await;
        let course = test_support::course(&storage, "CS101", dec!(5)).await;
        let lo = test_support::learning_outcome(&storage, course.id, "LO1").await;
        let po1 = test_support::program_outcome(&storage, "PO-01").await;
        let po2 = test_support::program_outcome(&storage, "PO-02").await;

        test_support::contribution(&storage, lo.id, po1.id, dec!(60)).await;
        test_support::contribution(&storage, lo.id, po2.id, dec!(40)).await;
        // 60 -> 50，合计 90
        test_support::contribution(&storage, lo.id, po1.id, dec!(50)).await;

        let stored = storage.list_lo_contributions_impl(lo.id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].program_outcome_code, "PO-01");
        let rows: Vec<WeightRow> = stored.iter().map(WeightRow::from).collect();
        assert_eq!(sum_weights(&rows), dec!(90));
    }

    #[tokio::test]
    async fn test_exceeding_contribution_is_rejected() {
        let storage = test_support::storage().await;
        let course = test_support::course(&storage, "CS101", dec!(5)).await;
        let lo = test_support::learning_outcome(&storage, course.id, "LO1").await;
        let po1 = test_support::program_outcome(&storage, "PO-01").await;
        let po2 = test_support::program_outcome(&storage, "PO-02").await;
        test_support::contribution(&storage, lo.id, po1.id, dec!(70)).await;

        let err = storage
            .upsert_contribution_impl(
                lo.id,
                UpsertContributionRequest {
                    program_outcome_id: po2.id,
                    contribution_percentage: dec!(30.5),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ObeError::WeightExceeded(_)));
        assert_eq!(storage.list_lo_contributions_impl(lo.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_program_outcome_and_delete() {
        let storage = test_support::storage().await;
        let course = test_support::course(&storage, "CS101", dec!(5)).await;
        let lo = test_support::learning_outcome(&storage, course.id, "LO1").await;
        let po = test_support::program_outcome(&storage, "PO-01").await;

        let err = storage
            .upsert_contribution_impl(
                lo.id,
                UpsertContributionRequest {
                    program_outcome_id: 999,
                    contribution_percentage: dec!(10),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ObeError::NotFound(_)));

        test_support::contribution(&storage, lo.id, po.id, dec!(10)).await;
        assert!(storage.delete_contribution_impl(lo.id, po.id).await.unwrap());
        assert!(!storage.delete_contribution_impl(lo.id, po.id).await.unwrap());
    }
}
