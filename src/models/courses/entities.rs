use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Course {
    pub id: i64,
    // 课程代码（唯一）
    pub code: String,
    pub title: String,
    // ECTS 学分
    #[ts(type = "string")]
    pub ects_credit: Decimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 考核类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "course.ts")]
pub enum AssessmentType {
    Midterm,
    Final,
    Quiz,
    Project,
    Homework,
    Other,
}

impl AssessmentType {
    pub const MIDTERM: &'static str = "MIDTERM";
    pub const FINAL: &'static str = "FINAL";
    pub const QUIZ: &'static str = "QUIZ";
    pub const PROJECT: &'static str = "PROJECT";
    pub const HOMEWORK: &'static str = "HOMEWORK";
    pub const OTHER: &'static str = "OTHER";

    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Midterm => Self::MIDTERM,
            AssessmentType::Final => Self::FINAL,
            AssessmentType::Quiz => Self::QUIZ,
            AssessmentType::Project => Self::PROJECT,
            AssessmentType::Homework => Self::HOMEWORK,
            AssessmentType::Other => Self::OTHER,
        }
    }
}

impl<'de> Deserialize<'de> for AssessmentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssessmentType {
    type Err = String;

    // 大小写不敏感，便于导入文件直接写 "midterm"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            Self::MIDTERM => Ok(AssessmentType::Midterm),
            Self::FINAL => Ok(AssessmentType::Final),
            Self::QUIZ => Ok(AssessmentType::Quiz),
            Self::PROJECT => Ok(AssessmentType::Project),
            Self::HOMEWORK => Ok(AssessmentType::Homework),
            Self::OTHER => Ok(AssessmentType::Other),
            _ => Err(format!(
                "Invalid assessment type: '{s}'. Supported: MIDTERM, FINAL, QUIZ, PROJECT, HOMEWORK, OTHER"
            )),
        }
    }
}

// 考核
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct Assessment {
    pub id: i64,
    pub course_id: i64,
    pub assessment_type: AssessmentType,
    // 权重百分比，未设置时为空
    #[ts(type = "string | null")]
    pub weight_percentage: Option<Decimal>,
    // 关联的 LO
    pub learning_outcome_ids: Vec<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessment_type_parse_is_case_insensitive() {
        assert_eq!("midterm".parse::<AssessmentType>(), Ok(AssessmentType::Midterm));
        assert_eq!(" Final ".parse::<AssessmentType>(), Ok(AssessmentType::Final));
        assert!("exam".parse::<AssessmentType>().is_err());
    }

    #[test]
    fn test_assessment_type_serde() {
        let json = serde_json::to_string(&AssessmentType::Homework).unwrap();
        assert_eq!(json, "\"HOMEWORK\"");
        let parsed: AssessmentType = serde_json::from_str("\"quiz\"").unwrap();
        assert_eq!(parsed, AssessmentType::Quiz);
    }
}
