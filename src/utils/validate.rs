use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::engine::{MAX_MASTERY, MAX_PERCENTAGE, MIN_MASTERY};

static CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,19}$").expect("Invalid outcome code regex")
});

/// 课程 / LO / PO 代码
pub fn validate_code(code: &str) -> Result<(), &'static str> {
    if !CODE_RE.is_match(code) {
        return Err(
            "Code must be 1-20 characters of letters, digits, '_', '.' or '-', starting with a letter or digit",
        );
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), &'static str> {
    let len = title.trim().chars().count();
    if len == 0 || len > 200 {
        return Err("Title length must be between 1 and 200 characters");
    }
    Ok(())
}

/// 百分比（成绩、权重、贡献度）均要求 0-100
pub fn validate_percentage(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > MAX_PERCENTAGE {
        return Err("Percentage must be between 0 and 100");
    }
    if value.normalize().scale() > 2 {
        return Err("Percentage supports at most 2 decimal places");
    }
    Ok(())
}

pub fn validate_mastery(mastery: i32) -> Result<(), &'static str> {
    if !(MIN_MASTERY..=MAX_MASTERY).contains(&mastery) {
        return Err("Mastery score must be between 1 and 5");
    }
    Ok(())
}

pub fn validate_ects(ects: Decimal) -> Result<(), &'static str> {
    if ects < Decimal::ZERO {
        return Err("ECTS credit must not be negative");
    }
    if ects.normalize().scale() > 2 {
        return Err("ECTS credit supports at most 2 decimal places");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_codes() {
        assert!(validate_code("PO-01").is_ok());
        assert!(validate_code("CS101").is_ok());
        assert!(validate_code("LO1.2_a").is_ok());
    }

    #[test]
    fn test_invalid_codes() {
        assert!(validate_code("").is_err());
        assert!(validate_code("-PO").is_err());
        assert!(validate_code("PO 01").is_err());
        assert!(validate_code("ABCDEFGHIJKLMNOPQRSTU").is_err());
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(validate_percentage(dec!(0)).is_ok());
        assert!(validate_percentage(dec!(100.00)).is_ok());
        assert!(validate_percentage(dec!(33.33)).is_ok());
        assert!(validate_percentage(dec!(100.01)).is_err());
        assert!(validate_percentage(dec!(-0.01)).is_err());
        assert!(validate_percentage(dec!(12.345)).is_err());
    }

    #[test]
    fn test_mastery_bounds() {
        assert!(validate_mastery(1).is_ok());
        assert!(validate_mastery(5).is_ok());
        assert!(validate_mastery(0).is_err());
        assert!(validate_mastery(6).is_err());
    }

    #[test]
    fn test_ects() {
        assert!(validate_ects(dec!(0)).is_ok());
        assert!(validate_ects(dec!(7.5)).is_ok());
        assert!(validate_ects(dec!(-1)).is_err());
    }
}
