//! PO 达成度聚合
//!
//! 对每条成绩：
//! 1. `weighted_lo = 掌握度 × 考核权重比例`
//! 2. 对该 LO 的每条 PO 贡献度：`weighted_lo × 贡献度比例 × 课程学分` 累加到 PO
//! 3. 归一化因子 = 学分合计 × 5（学分为 0 时取 1）
//! 4. PO 得分 = 累计值 / 归一化因子 × 100
//!
//! 结果是成绩账本的纯函数，可以随时整体重算。

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{AggregationError, MAX_MASTERY, MAX_PERCENTAGE, OutcomeSnapshot, fraction, quantize};
use crate::models::grades::entities::Grade;

/// 院系报表中单个 PO 的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct DepartmentPoScore {
    #[ts(type = "string")]
    pub score: Decimal,
    pub student_count: usize,
}

struct Contribution<'a> {
    student_id: i64,
    po_code: &'a str,
    amount: Decimal,
}

/// 逐条成绩展开为 PO 贡献值，同时返回涉及到的课程学分
fn expand_grades<'a, I>(
    snapshot: &'a OutcomeSnapshot,
    grades: I,
    course_filter: Option<i64>,
) -> Result<(Vec<Contribution<'a>>, BTreeMap<i64, Decimal>), AggregationError>
where
    I: IntoIterator<Item = &'a Grade>,
{
    let courses = snapshot.courses_by_id();
    let assessments = snapshot.assessments_by_id();
    let contributions = snapshot.contributions_by_lo();

    let mut expanded = Vec::new();
    let mut touched_courses = BTreeMap::new();

    for grade in grades {
        let assessment =
            assessments
                .get(&grade.assessment_id)
                .ok_or(AggregationError::MissingAssessment {
                    grade_id: grade.id,
                    assessment_id: grade.assessment_id,
                })?;

        if let Some(filter) = course_filter
            && assessment.course_id != filter
        {
            continue;
        }

        let course = courses
            .get(&assessment.course_id)
            .ok_or(AggregationError::MissingCourse {
                assessment_id: assessment.id,
                course_id: assessment.course_id,
            })?;
        touched_courses.insert(course.id, course.ects_credit);

        let Some(lo_id) = grade.learning_outcome_id else {
            continue;
        };

        let weighted_lo = Decimal::from(grade.lo_mastery_score)
            * fraction(assessment.weight_percentage.unwrap_or_default());

        for contribution in contributions.get(&lo_id).into_iter().flatten().copied() {
            expanded.push(Contribution {
                student_id: grade.student_id,
                po_code: contribution.program_outcome_code.as_str(),
                amount: weighted_lo
                    * fraction(contribution.contribution_percentage)
                    * course.ects_credit,
            });
        }
    }

    Ok((expanded, touched_courses))
}

fn normalize(total: Decimal, divisor_ects: Decimal) -> Decimal {
    let normalizing_factor = if divisor_ects.is_zero() {
        Decimal::ONE
    } else {
        divisor_ects * Decimal::from(MAX_MASTERY)
    };
    quantize(total / normalizing_factor * MAX_PERCENTAGE)
}

/// 计算学生的 PO 达成度（键为 PO 代码）
///
/// 指定 `course_id` 时只统计该课程，分母取该课程学分；
/// 否则分母为学生成绩涉及的所有课程学分之和。
pub fn compute_weighted_po_scores(
    student_id: i64,
    snapshot: &OutcomeSnapshot,
    course_id: Option<i64>,
) -> Result<BTreeMap<String, Decimal>, AggregationError> {
    let grades = snapshot.grades.iter().filter(|g| g.student_id == student_id);
    let (expanded, touched_courses) = expand_grades(snapshot, grades, course_id)?;

    if touched_courses.is_empty() {
        return Ok(BTreeMap::new());
    }

    let divisor_ects = match course_id {
        Some(id) => snapshot
            .courses
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.ects_credit)
            .unwrap_or_default(),
        None => touched_courses.values().copied().sum(),
    };

    let mut po_totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for contribution in expanded {
        *po_totals
            .entry(contribution.po_code.to_string())
            .or_default() += contribution.amount;
    }

    Ok(po_totals
        .into_iter()
        .map(|(code, total)| (code, normalize(total, divisor_ects)))
        .collect())
}

/// 院系 PO 报表：所有学生成绩合并聚合，分母为系统内全部课程学分
pub fn aggregate_department_report(
    snapshot: &OutcomeSnapshot,
    total_system_ects: Decimal,
) -> Result<BTreeMap<String, DepartmentPoScore>, AggregationError> {
    if snapshot.grades.is_empty() || total_system_ects.is_zero() {
        return Ok(BTreeMap::new());
    }

    let (expanded, _) = expand_grades(snapshot, &snapshot.grades, None)?;

    let mut po_totals: BTreeMap<&str, (Decimal, BTreeSet<i64>)> = BTreeMap::new();
    for contribution in expanded {
        let entry = po_totals.entry(contribution.po_code).or_default();
        entry.0 += contribution.amount;
        entry.1.insert(contribution.student_id);
    }

    Ok(po_totals
        .into_iter()
        .map(|(code, (total, students))| {
            (
                code.to_string(),
                DepartmentPoScore {
                    score: normalize(total, total_system_ects),
                    student_count: students.len(),
                },
            )
        })
        .collect())
}

/// PO 得分平均值，无数据时返回 None
pub fn average_po_score(scores: &BTreeMap<String, Decimal>) -> Option<Decimal> {
    if scores.is_empty() {
        return None;
    }
    let sum: Decimal = scores.values().copied().sum();
    Some(quantize(sum / Decimal::from(scores.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{assessment, contribution, course, grade, learning_outcome};
    use rust_decimal_macros::dec;

    fn single_course_snapshot() -> OutcomeSnapshot {
        OutcomeSnapshot {
            courses: vec![course(10, "CS101", dec!(5))],
            assessments: vec![assessment(100, 10, Some(dec!(40)), &[1])],
            learning_outcomes: vec![learning_outcome(1, 10, "LO1")],
            contributions: vec![contribution(1, 1, 500, "PO-01", dec!(100))],
            grades: vec![grade(1, 7, 100, Some(1), dec!(85), 5)],
        }
    }

    #[test]
    fn test_reference_scenario() {
        // weighted_lo = 5*0.4 = 2.0; contribution = 2.0*1.0*5 = 10; factor = 25 -> 40.00
        let scores = compute_weighted_po_scores(7, &single_course_snapshot(), None).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["PO-01"], dec!(40.00));
    }

    #[test]
    fn test_no_grades_yields_empty_mapping() {
        let snapshot = single_course_snapshot();
        assert!(compute_weighted_po_scores(8, &snapshot, None).unwrap().is_empty());
    }

    #[test]
    fn test_idempotent() {
        let snapshot = single_course_snapshot();
        let first = compute_weighted_po_scores(7, &snapshot, None).unwrap();
        let second = compute_weighted_po_scores(7, &snapshot, None).unwrap();
        assert_eq!(first, second);
    }

    fn two_course_snapshot() -> OutcomeSnapshot {
        OutcomeSnapshot {
            courses: vec![course(10, "CS101", dec!(5)), course(20, "CS102", dec!(3))],
            assessments: vec![
                assessment(100, 10, Some(dec!(40)), &[1]),
                assessment(200, 20, Some(dec!(100)), &[2]),
            ],
            learning_outcomes: vec![learning_outcome(1, 10, "LO1"), learning_outcome(2, 20, "LO1")],
            contributions: vec![
                contribution(1, 1, 500, "PO-01", dec!(100)),
                contribution(2, 2, 500, "PO-01", dec!(50)),
                contribution(3, 2, 501, "PO-02", dec!(50)),
            ],
            grades: vec![
                grade(1, 7, 100, Some(1), dec!(85), 5),
                grade(2, 7, 200, Some(2), dec!(60), 3),
            ],
        }
    }

    #[test]
    fn test_multi_course_divisor_is_total_ects() {
        let scores = compute_weighted_po_scores(7, &two_course_snapshot(), None).unwrap();
        // PO-01: 10 + 3*1.0*0.5*3 = 14.5; factor = 8*5 = 40 -> 36.25
        assert_eq!(scores["PO-01"], dec!(36.25));
        // PO-02: 4.5 / 40 * 100 = 11.25
        assert_eq!(scores["PO-02"], dec!(11.25));
    }

    #[test]
    fn test_course_filter_uses_course_ects() {
        let scores = compute_weighted_po_scores(7, &two_course_snapshot(), Some(20)).unwrap();
        // PO-01: 4.5 / 15 * 100 = 30
        assert_eq!(scores["PO-01"], dec!(30.00));
        assert_eq!(scores["PO-02"], dec!(30.00));
    }

    #[test]
    fn test_po_without_contributions_not_zero_filled() {
        let mut snapshot = single_course_snapshot();
        snapshot.grades.push(grade(2, 7, 100, None, dec!(50), 2));
        let scores = compute_weighted_po_scores(7, &snapshot, None).unwrap();
        assert_eq!(scores.keys().collect::<Vec<_>>(), vec!["PO-01"]);
    }

    #[test]
    fn test_zero_ects_yields_zero_not_error() {
        let mut snapshot = single_course_snapshot();
        snapshot.courses[0].ects_credit = Decimal::ZERO;
        let scores = compute_weighted_po_scores(7, &snapshot, None).unwrap();
        assert_eq!(scores["PO-01"], Decimal::ZERO);
    }

    #[test]
    fn test_missing_assessment_is_integrity_fault() {
        let mut snapshot = single_course_snapshot();
        snapshot.assessments.clear();
        let err = compute_weighted_po_scores(7, &snapshot, None).unwrap_err();
        assert_eq!(
            err,
            AggregationError::MissingAssessment {
                grade_id: 1,
                assessment_id: 100
            }
        );
    }

    #[test]
    fn test_department_report_counts_distinct_students() {
        let mut snapshot = two_course_snapshot();
        snapshot.grades.push(grade(3, 8, 100, Some(1), dec!(40), 5));
        let report = aggregate_department_report(&snapshot, dec!(8)).unwrap();
        // PO-01: 10 + 4.5 + 10 = 24.5 / 40 * 100 = 61.25
        assert_eq!(report["PO-01"].score, dec!(61.25));
        assert_eq!(report["PO-01"].student_count, 2);
        assert_eq!(report["PO-02"].student_count, 1);
    }

    #[test]
    fn test_department_report_without_ects_is_empty() {
        assert!(
            aggregate_department_report(&two_course_snapshot(), Decimal::ZERO)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_average_po_score() {
        let scores = compute_weighted_po_scores(7, &two_course_snapshot(), None).unwrap();
        assert_eq!(average_po_score(&scores), Some(dec!(23.75)));
        assert_eq!(average_po_score(&BTreeMap::new()), None);
    }
}
