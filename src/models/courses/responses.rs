use rust_decimal::Decimal;
use serde::Serialize;
use ts_rs::TS;

use super::entities::{Assessment, Course};
use crate::engine::MAX_PERCENTAGE;
use crate::models::common::PaginationInfo;

// 课程列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CourseListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Course>,
}

// 课程权重汇总
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct WeightSummary {
    #[ts(type = "string")]
    pub total: Decimal,
    #[ts(type = "string")]
    pub remaining: Decimal,
    // 合计恰好为 100 时为 true，仅作提示
    pub is_complete: bool,
}

impl WeightSummary {
    pub fn from_total(total: Decimal) -> Self {
        Self {
            total,
            remaining: (MAX_PERCENTAGE - total).max(Decimal::ZERO),
            is_complete: total == MAX_PERCENTAGE,
        }
    }
}

// 课程考核列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct AssessmentListResponse {
    pub items: Vec<Assessment>,
    pub weight_summary: WeightSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_weight_summary() {
        let partial = WeightSummary::from_total(dec!(70));
        assert_eq!(partial.remaining, dec!(30));
        assert!(!partial.is_complete);

        let full = WeightSummary::from_total(dec!(100.00));
        assert_eq!(full.remaining, Decimal::ZERO);
        assert!(full.is_complete);
    }
}
