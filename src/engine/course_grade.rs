//! 课程总评
//!
//! 总评 = Σ(考核成绩 × 考核权重比例)。未录入成绩的考核按 0 分计。

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::{fraction, quantize};
use crate::models::courses::entities::Assessment;
use crate::models::grades::entities::Grade;

/// 计算学生课程总评（0-100）
///
/// 一个考核可能按 LO 拆成多条成绩，此时取这些成绩的平均值。
pub fn compute_course_grade(student_id: i64, assessments: &[Assessment], grades: &[Grade]) -> Decimal {
    let mut per_assessment: HashMap<i64, (Decimal, u32)> = HashMap::new();
    for grade in grades.iter().filter(|g| g.student_id == student_id) {
        let entry = per_assessment
            .entry(grade.assessment_id)
            .or_insert((Decimal::ZERO, 0));
        entry.0 += grade.score_percentage;
        entry.1 += 1;
    }

    let total: Decimal = assessments
        .iter()
        .map(|assessment| {
            let weight = fraction(assessment.weight_percentage.unwrap_or_default());
            let score = match per_assessment.get(&assessment.id) {
                Some((sum, count)) if *count > 0 => *sum / Decimal::from(*count),
                _ => Decimal::ZERO,
            };
            score * weight
        })
        .sum();

    quantize(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{assessment, grade};
    use rust_decimal_macros::dec;

    fn assessments() -> Vec<Assessment> {
        vec![
            assessment(1, 10, Some(dec!(30)), &[]),
            assessment(2, 10, Some(dec!(20)), &[]),
            assessment(3, 10, Some(dec!(50)), &[]),
        ]
    }

    #[test]
    fn test_weighted_course_grade() {
        let grades = vec![
            grade(1, 7, 1, None, dec!(90), 5),
            grade(2, 7, 2, None, dec!(80), 4),
            grade(3, 7, 3, None, dec!(70), 4),
        ];
        assert_eq!(compute_course_grade(7, &assessments(), &grades), dec!(78.00));
    }

    #[test]
    fn test_missing_grade_counts_as_zero() {
        let grades = vec![
            grade(1, 7, 1, None, dec!(90), 5),
            grade(3, 7, 3, None, dec!(70), 4),
        ];
        // 27 + 0 + 35
        assert_eq!(compute_course_grade(7, &assessments(), &grades), dec!(62.00));
        assert_eq!(compute_course_grade(8, &assessments(), &grades), Decimal::ZERO);
    }

    #[test]
    fn test_linear_in_scores() {
        let grades = vec![
            grade(1, 7, 1, None, dec!(90), 5),
            grade(2, 7, 2, None, dec!(80), 4),
            grade(3, 7, 3, None, dec!(70), 4),
        ];
        let halved: Vec<Grade> = grades
            .iter()
            .cloned()
            .map(|mut g| {
                g.score_percentage *= dec!(0.5);
                g
            })
            .collect();
        let full = compute_course_grade(7, &assessments(), &grades);
        let half = compute_course_grade(7, &assessments(), &halved);
        assert_eq!(half, full * dec!(0.5));
    }

    #[test]
    fn test_per_lo_rows_are_averaged() {
        let grades = vec![
            grade(1, 7, 3, Some(1), dec!(60), 3),
            grade(2, 7, 3, Some(2), dec!(80), 4),
        ];
        // (60+80)/2 * 0.5
        assert_eq!(compute_course_grade(7, &assessments(), &grades), dec!(35.00));
    }
}
