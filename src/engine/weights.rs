//! 权重校验
//!
//! 同一课程下所有考核权重之和、同一 LO 对各 PO 的贡献度之和均不得超过 100.00。
//! 只统计未删除且已设置权重的行；超出时直接拒绝，不做截断。

use std::fmt;

use rust_decimal::Decimal;

use super::{MAX_PERCENTAGE, quantize};
use crate::models::courses::entities::Assessment;
use crate::models::outcomes::entities::LoPoContribution;

/// 参与校验的一行权重
#[derive(Debug, Clone, PartialEq)]
pub struct WeightRow {
    pub id: Option<i64>,
    pub weight: Option<Decimal>,
    pub deleted: bool,
}

impl WeightRow {
    pub fn new(id: Option<i64>, weight: Option<Decimal>) -> Self {
        Self {
            id,
            weight,
            deleted: false,
        }
    }

    /// 批量编辑中标记为删除的行
    pub fn deleted(id: i64) -> Self {
        Self {
            id: Some(id),
            weight: None,
            deleted: true,
        }
    }

    fn counted_weight(&self) -> Option<Decimal> {
        if self.deleted { None } else { self.weight }
    }
}

impl From<&Assessment> for WeightRow {
    fn from(assessment: &Assessment) -> Self {
        WeightRow::new(Some(assessment.id), assessment.weight_percentage)
    }
}

impl From<&LoPoContribution> for WeightRow {
    fn from(contribution: &LoPoContribution) -> Self {
        WeightRow::new(
            Some(contribution.id),
            Some(contribution.contribution_percentage),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightScope {
    Assessment,
    Contribution,
}

impl fmt::Display for WeightScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightScope::Assessment => write!(f, "assessment weight"),
            WeightScope::Contribution => write!(f, "PO contribution"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightErrorKind {
    /// 合计超过 100
    Exceeded,
    /// 单行不在 0..=100 范围内
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightError {
    pub kind: WeightErrorKind,
    pub scope: WeightScope,
    pub current_total: Decimal,
    pub attempted_total: Decimal,
}

impl fmt::Display for WeightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WeightErrorKind::Exceeded => write!(
                f,
                "total {} would be {}% (currently {}%), limit is {}%",
                self.scope,
                quantize(self.attempted_total),
                quantize(self.current_total),
                MAX_PERCENTAGE
            ),
            WeightErrorKind::OutOfRange => write!(
                f,
                "each {} must be between 0 and {}% (currently {}%)",
                self.scope,
                MAX_PERCENTAGE,
                quantize(self.current_total)
            ),
        }
    }
}

impl std::error::Error for WeightError {}

/// 对行求和（跳过删除行与未设置权重的行）
pub fn sum_weights<'a, I>(rows: I) -> Decimal
where
    I: IntoIterator<Item = &'a WeightRow>,
{
    rows.into_iter()
        .filter_map(WeightRow::counted_weight)
        .sum()
}

/// 将单行新增/修改合并进已存储的行，得到写入后的完整集合
pub fn apply_change(stored: &[WeightRow], id: Option<i64>, weight: Option<Decimal>) -> Vec<WeightRow> {
    let mut rows: Vec<WeightRow> = stored
        .iter()
        .filter(|row| id.is_none() || row.id != id)
        .cloned()
        .collect();
    rows.push(WeightRow::new(id, weight));
    rows
}

fn validate_rows(
    scope: WeightScope,
    stored: &[WeightRow],
    proposed: &[WeightRow],
) -> Result<Decimal, WeightError> {
    let current_total = sum_weights(stored);

    if let Some(bad) = proposed
        .iter()
        .filter_map(WeightRow::counted_weight)
        .find(|w| *w < Decimal::ZERO || *w > MAX_PERCENTAGE)
    {
        return Err(WeightError {
            kind: WeightErrorKind::OutOfRange,
            scope,
            current_total: bad,
            attempted_total: bad,
        });
    }

    let attempted_total = sum_weights(proposed);
    if attempted_total > MAX_PERCENTAGE {
        return Err(WeightError {
            kind: WeightErrorKind::Exceeded,
            scope,
            current_total,
            attempted_total,
        });
    }

    Ok(attempted_total)
}

/// 校验某课程写入后的考核权重集合，返回新的合计
pub fn validate_assessment_weights(
    stored: &[Assessment],
    proposed: &[WeightRow],
) -> Result<Decimal, WeightError> {
    let stored_rows: Vec<WeightRow> = stored.iter().map(WeightRow::from).collect();
    validate_rows(WeightScope::Assessment, &stored_rows, proposed)
}

/// 校验某 LO 写入后的 PO 贡献度集合，返回新的合计
pub fn validate_lo_contribution(
    stored: &[LoPoContribution],
    proposed: &[WeightRow],
) -> Result<Decimal, WeightError> {
    let stored_rows: Vec<WeightRow> = stored.iter().map(WeightRow::from).collect();
    validate_rows(WeightScope::Contribution, &stored_rows, proposed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{assessment, contribution};
    use rust_decimal_macros::dec;

    fn stored_assessments() -> Vec<Assessment> {
        vec![
            assessment(1, 10, Some(dec!(30)), &[]),
            assessment(2, 10, Some(dec!(20)), &[]),
            assessment(3, 10, None, &[]),
        ]
    }

    #[test]
    fn test_insert_within_limit() {
        let stored = stored_assessments();
        let rows: Vec<WeightRow> = stored.iter().map(WeightRow::from).collect();
        let proposed = apply_change(&rows, None, Some(dec!(50)));
        assert_eq!(
            validate_assessment_weights(&stored, &proposed),
            Ok(dec!(100))
        );
    }

    #[test]
    fn test_insert_exceeding_limit_reports_totals() {
        let stored = stored_assessments();
        let rows: Vec<WeightRow> = stored.iter().map(WeightRow::from).collect();
        let proposed = apply_change(&rows, None, Some(dec!(50.01)));
        let err = validate_assessment_weights(&stored, &proposed).unwrap_err();
        assert_eq!(err.kind, WeightErrorKind::Exceeded);
        assert_eq!(err.scope, WeightScope::Assessment);
        assert_eq!(err.current_total, dec!(50));
        assert_eq!(err.attempted_total, dec!(100.01));
    }

    #[test]
    fn test_update_replaces_existing_row() {
        let stored = stored_assessments();
        let rows: Vec<WeightRow> = stored.iter().map(WeightRow::from).collect();
        // 30 -> 80：20 + 80 = 100
        let proposed = apply_change(&rows, Some(1), Some(dec!(80)));
        assert_eq!(
            validate_assessment_weights(&stored, &proposed),
            Ok(dec!(100))
        );
        let proposed = apply_change(&rows, Some(1), Some(dec!(81)));
        assert!(validate_assessment_weights(&stored, &proposed).is_err());
    }

    #[test]
    fn test_deleted_and_unset_rows_are_ignored() {
        let stored = stored_assessments();
        let proposed = vec![
            WeightRow::deleted(1),
            WeightRow::new(Some(2), Some(dec!(20))),
            WeightRow::new(Some(3), None),
            WeightRow::new(None, Some(dec!(80))),
        ];
        assert_eq!(
            validate_assessment_weights(&stored, &proposed),
            Ok(dec!(100))
        );
    }

    #[test]
    fn test_out_of_range_row_rejected() {
        let proposed = vec![WeightRow::new(None, Some(dec!(-5)))];
        let err = validate_assessment_weights(&[], &proposed).unwrap_err();
        assert_eq!(err.kind, WeightErrorKind::OutOfRange);
    }

    #[test]
    fn test_contribution_limit() {
        let stored = vec![
            contribution(1, 5, 100, "PO-01", dec!(60)),
            contribution(2, 5, 101, "PO-02", dec!(40)),
        ];
        let rows: Vec<WeightRow> = stored.iter().map(WeightRow::from).collect();
        let proposed = apply_change(&rows, None, Some(dec!(0.01)));
        let err = validate_lo_contribution(&stored, &proposed).unwrap_err();
        assert_eq!(err.scope, WeightScope::Contribution);
        assert_eq!(err.current_total, dec!(100));
        assert!(err.to_string().contains("100.01"));
    }
}
