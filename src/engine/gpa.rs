use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::quantize;

/// 4 分制上限
pub const MAX_GPA: Decimal = dec!(4.00);

const GPA_SLOPE: Decimal = dec!(0.05);
const GPA_OFFSET: Decimal = dec!(1.00);

/// 百分制成绩映射为 4 分制绩点：`0.05 × score − 1`，结果截断到 0.00..=4.00
pub fn score_to_gpa(score: Decimal) -> Decimal {
    let point = GPA_SLOPE * score - GPA_OFFSET;
    quantize(point.clamp(Decimal::ZERO, MAX_GPA))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_points() {
        assert_eq!(score_to_gpa(dec!(100)), dec!(4.00));
        assert_eq!(score_to_gpa(dec!(90)), dec!(3.50));
        assert_eq!(score_to_gpa(dec!(80)), dec!(3.00));
        assert_eq!(score_to_gpa(dec!(78)), dec!(2.90));
        assert_eq!(score_to_gpa(dec!(0)), dec!(0.00));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(score_to_gpa(dec!(120)), MAX_GPA);
        assert_eq!(score_to_gpa(dec!(-3)), Decimal::ZERO);
        // 20 分以下都落在 0
        assert_eq!(score_to_gpa(dec!(15)), Decimal::ZERO);
    }

    #[test]
    fn test_monotonic() {
        let mut previous = Decimal::ZERO;
        for step in 0..=100 {
            let gpa = score_to_gpa(Decimal::from(step));
            assert!(gpa >= previous);
            previous = gpa;
        }
    }
}
