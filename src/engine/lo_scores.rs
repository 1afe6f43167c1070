//! 课程内 LO 得分
//!
//! LO 得分 = Σ(成绩百分比 × 考核权重比例) / Σ(考核权重比例)，
//! 只统计关联到该 LO 的考核。

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AggregationError, fraction, quantize};
use crate::models::courses::entities::Assessment;
use crate::models::grades::entities::Grade;
use crate::models::outcomes::entities::LearningOutcome;

/// 缺少成绩时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingGradePolicy {
    /// 计 0 分，仍计入分母
    #[default]
    TreatAsZero,
    /// 从该 LO 的分母中剔除
    Exclude,
}

impl MissingGradePolicy {
    pub fn from_flag(treat_missing_as_zero: bool) -> Self {
        if treat_missing_as_zero {
            MissingGradePolicy::TreatAsZero
        } else {
            MissingGradePolicy::Exclude
        }
    }
}

#[derive(Default)]
struct Accumulator {
    numerator: Decimal,
    denominator: Decimal,
}

/// 计算学生在某课程中各 LO 的得分（键为 LO 代码）
pub fn compute_lo_scores(
    student_id: i64,
    assessments: &[Assessment],
    learning_outcomes: &[LearningOutcome],
    grades: &[Grade],
    policy: MissingGradePolicy,
) -> Result<BTreeMap<String, Decimal>, AggregationError> {
    let lo_codes: HashMap<i64, &str> = learning_outcomes
        .iter()
        .map(|lo| (lo.id, lo.code.as_str()))
        .collect();

    let graded: HashMap<(i64, i64), Decimal> = grades
        .iter()
        .filter(|g| g.student_id == student_id)
        .filter_map(|g| {
            g.learning_outcome_id
                .map(|lo| ((g.assessment_id, lo), g.score_percentage))
        })
        .collect();

    let mut totals: BTreeMap<String, Accumulator> = BTreeMap::new();

    for assessment in assessments {
        let weight = fraction(assessment.weight_percentage.unwrap_or_default());

        for lo_id in &assessment.learning_outcome_ids {
            let code = lo_codes.get(lo_id).ok_or(AggregationError::UnknownLearningOutcome {
                assessment_id: assessment.id,
                learning_outcome_id: *lo_id,
            })?;
            let acc = totals.entry((*code).to_string()).or_default();

            match (graded.get(&(assessment.id, *lo_id)), policy) {
                (Some(score), _) => {
                    acc.numerator += *score * weight;
                    acc.denominator += weight;
                }
                (None, MissingGradePolicy::TreatAsZero) => {
                    acc.denominator += weight;
                }
                (None, MissingGradePolicy::Exclude) => {}
            }
        }
    }

    Ok(totals
        .into_iter()
        .map(|(code, acc)| {
            let score = if acc.denominator.is_zero() {
                Decimal::ZERO
            } else {
                acc.numerator / acc.denominator
            };
            (code, quantize(score))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{assessment, grade, learning_outcome};
    use rust_decimal_macros::dec;

    fn course_setup() -> (Vec<Assessment>, Vec<LearningOutcome>) {
        let los = vec![
            learning_outcome(1, 10, "LO1"),
            learning_outcome(2, 10, "LO2"),
            learning_outcome(3, 10, "LO3"),
        ];
        let assessments = vec![
            assessment(100, 10, Some(dec!(40)), &[1, 2]),
            assessment(101, 10, Some(dec!(60)), &[1]),
        ];
        (assessments, los)
    }

    #[test]
    fn test_weighted_average_per_lo() {
        let (assessments, los) = course_setup();
        let grades = vec![
            grade(1, 7, 100, Some(1), dec!(80), 4),
            grade(2, 7, 101, Some(1), dec!(90), 5),
            grade(3, 7, 100, Some(2), dec!(70), 3),
        ];
        let scores =
            compute_lo_scores(7, &assessments, &los, &grades, MissingGradePolicy::TreatAsZero)
                .unwrap();
        // LO1 = (80*0.4 + 90*0.6) / 1.0 = 86
        assert_eq!(scores["LO1"], dec!(86.00));
        assert_eq!(scores["LO2"], dec!(70.00));
        // LO3 没有关联考核，不出现
        assert!(!scores.contains_key("LO3"));
    }

    #[test]
    fn test_missing_grade_policies() {
        let (assessments, los) = course_setup();
        let grades = vec![grade(1, 7, 100, Some(1), dec!(80), 4)];

        let zero =
            compute_lo_scores(7, &assessments, &los, &grades, MissingGradePolicy::TreatAsZero)
                .unwrap();
        // (80*0.4 + 0) / 1.0
        assert_eq!(zero["LO1"], dec!(32.00));
        assert_eq!(zero["LO2"], dec!(0.00));

        let excluded =
            compute_lo_scores(7, &assessments, &los, &grades, MissingGradePolicy::Exclude)
                .unwrap();
        assert_eq!(excluded["LO1"], dec!(80.00));
        // 分母为 0 时得 0
        assert_eq!(excluded["LO2"], Decimal::ZERO);
    }

    #[test]
    fn test_other_students_grades_ignored() {
        let (assessments, los) = course_setup();
        let grades = vec![grade(1, 8, 100, Some(1), dec!(100), 5)];
        let scores =
            compute_lo_scores(7, &assessments, &los, &grades, MissingGradePolicy::Exclude)
                .unwrap();
        assert_eq!(scores["LO1"], Decimal::ZERO);
    }

    #[test]
    fn test_link_to_foreign_lo_is_integrity_fault() {
        let los = vec![learning_outcome(1, 10, "LO1")];
        let assessments = vec![assessment(100, 10, Some(dec!(40)), &[99])];
        let err = compute_lo_scores(7, &assessments, &los, &[], MissingGradePolicy::TreatAsZero)
            .unwrap_err();
        assert_eq!(
            err,
            AggregationError::UnknownLearningOutcome {
                assessment_id: 100,
                learning_outcome_id: 99
            }
        );
    }
}
