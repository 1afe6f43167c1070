//! 成果聚合引擎
//!
//! 纯计算层：不依赖存储，所有输入均为内存中的业务实体。
//! - `weights`: 考核权重 / LO→PO 贡献度校验
//! - `lo_scores`: 学生课程内各 LO 得分
//! - `course_grade`: 课程总评
//! - `po_scores`: PO 达成度聚合（学生 / 院系）
//! - `gpa`: 百分制到 4 分制映射
//!
//! 所有数值均为定点小数（`Decimal`），仅在最终输出时保留两位小数。

pub mod course_grade;
pub mod gpa;
pub mod lo_scores;
pub mod po_scores;
pub mod weights;

use std::collections::HashMap;
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::models::courses::entities::{Assessment, Course};
use crate::models::grades::entities::Grade;
use crate::models::outcomes::entities::{LearningOutcome, LoPoContribution};

pub use course_grade::compute_course_grade;
pub use gpa::score_to_gpa;
pub use lo_scores::{MissingGradePolicy, compute_lo_scores};
pub use po_scores::{
    DepartmentPoScore, aggregate_department_report, average_po_score, compute_weighted_po_scores,
};
pub use weights::{
    WeightError, WeightErrorKind, WeightRow, WeightScope, validate_assessment_weights,
    validate_lo_contribution,
};

/// 百分比上限
pub const MAX_PERCENTAGE: Decimal = dec!(100.00);
/// 掌握度上限
pub const MAX_MASTERY: i32 = 5;
/// 掌握度下限
pub const MIN_MASTERY: i32 = 1;

/// 保留两位小数（银行家舍入）
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// 从数据库中的百分位整数还原
pub fn from_hundredths(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

/// 转换为数据库中的百分位整数
pub fn to_hundredths(value: Decimal) -> i64 {
    let mut quantized = quantize(value);
    quantized.rescale(2);
    quantized.mantissa() as i64
}

/// 百分比转为比例（30 -> 0.3）
pub(crate) fn fraction(percentage: Decimal) -> Decimal {
    percentage / MAX_PERCENTAGE
}

/// 聚合计算时发现的存储数据错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    MissingAssessment { grade_id: i64, assessment_id: i64 },
    MissingCourse { assessment_id: i64, course_id: i64 },
    UnknownLearningOutcome { assessment_id: i64, learning_outcome_id: i64 },
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationError::MissingAssessment {
                grade_id,
                assessment_id,
            } => write!(
                f,
                "grade {grade_id} references missing assessment {assessment_id}"
            ),
            AggregationError::MissingCourse {
                assessment_id,
                course_id,
            } => write!(
                f,
                "assessment {assessment_id} references missing course {course_id}"
            ),
            AggregationError::UnknownLearningOutcome {
                assessment_id,
                learning_outcome_id,
            } => write!(
                f,
                "assessment {assessment_id} is linked to learning outcome {learning_outcome_id} outside its course"
            ),
        }
    }
}

impl std::error::Error for AggregationError {}

/// 聚合所需的全部输入
#[derive(Debug, Clone, Default)]
pub struct OutcomeSnapshot {
    pub courses: Vec<Course>,
    pub assessments: Vec<Assessment>,
    pub learning_outcomes: Vec<LearningOutcome>,
    pub contributions: Vec<LoPoContribution>,
    pub grades: Vec<Grade>,
}

impl OutcomeSnapshot {
    pub(crate) fn courses_by_id(&self) -> HashMap<i64, &Course> {
        self.courses.iter().map(|c| (c.id, c)).collect()
    }

    pub(crate) fn assessments_by_id(&self) -> HashMap<i64, &Assessment> {
        self.assessments.iter().map(|a| (a.id, a)).collect()
    }

    /// LO -> 贡献度列表
    pub(crate) fn contributions_by_lo(&self) -> HashMap<i64, Vec<&LoPoContribution>> {
        let mut map: HashMap<i64, Vec<&LoPoContribution>> = HashMap::new();
        for contribution in &self.contributions {
            map.entry(contribution.learning_outcome_id)
                .or_default()
                .push(contribution);
        }
        map
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::models::courses::entities::{Assessment, AssessmentType, Course};
    use crate::models::grades::entities::Grade;
    use crate::models::outcomes::entities::{LearningOutcome, LoPoContribution};

    pub fn course(id: i64, code: &str, ects: Decimal) -> Course {
        Course {
            id,
            code: code.to_string(),
            title: format!("Course {code}"),
            ects_credit: ects,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn assessment(id: i64, course_id: i64, weight: Option<Decimal>, los: &[i64]) -> Assessment {
        Assessment {
            id,
            course_id,
            assessment_type: AssessmentType::Other,
            weight_percentage: weight,
            learning_outcome_ids: los.to_vec(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn learning_outcome(id: i64, course_id: i64, code: &str) -> LearningOutcome {
        LearningOutcome {
            id,
            course_id,
            code: code.to_string(),
            title: format!("Outcome {code}"),
            description: None,
        }
    }

    pub fn contribution(
        id: i64,
        lo_id: i64,
        po_id: i64,
        po_code: &str,
        pct: Decimal,
    ) -> LoPoContribution {
        LoPoContribution {
            id,
            learning_outcome_id: lo_id,
            program_outcome_id: po_id,
            program_outcome_code: po_code.to_string(),
            contribution_percentage: pct,
        }
    }

    pub fn grade(
        id: i64,
        student_id: i64,
        assessment_id: i64,
        lo_id: Option<i64>,
        score: Decimal,
        mastery: i32,
    ) -> Grade {
        Grade {
            id,
            student_id,
            assessment_id,
            learning_outcome_id: lo_id,
            score_percentage: score,
            lo_mastery_score: mastery,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_uses_bankers_rounding() {
        assert_eq!(quantize(dec!(2.345)), dec!(2.34));
        assert_eq!(quantize(dec!(2.355)), dec!(2.36));
        assert_eq!(quantize(dec!(78)), dec!(78));
    }

    #[test]
    fn test_hundredths_conversion() {
        assert_eq!(to_hundredths(dec!(78.5)), 7850);
        assert_eq!(to_hundredths(dec!(0.015)), 2);
        assert_eq!(from_hundredths(7850), dec!(78.50));
        assert_eq!(from_hundredths(to_hundredths(dec!(33.33))), dec!(33.33));
    }
}
