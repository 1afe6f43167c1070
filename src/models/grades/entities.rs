use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 成绩
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct Grade {
    pub id: i64,
    pub student_id: i64,
    pub assessment_id: i64,
    // 按 LO 拆分录入时非空
    pub learning_outcome_id: Option<i64>,
    // 原始百分制成绩 0-100
    #[ts(type = "string")]
    pub score_percentage: Decimal,
    // LO 掌握度 1-5
    pub lo_mastery_score: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Grade {
    pub fn key(&self) -> GradeKey {
        GradeKey {
            student_id: self.student_id,
            assessment_id: self.assessment_id,
            learning_outcome_id: self.learning_outcome_id,
        }
    }
}

/// 成绩唯一键，同一键上的写操作需要串行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GradeKey {
    pub student_id: i64,
    pub assessment_id: i64,
    pub learning_outcome_id: Option<i64>,
}

/// 一次成绩写入的值（创建或导入）
#[derive(Debug, Clone, PartialEq)]
pub struct GradeValues {
    pub key: GradeKey,
    pub score_percentage: Decimal,
    pub lo_mastery_score: i32,
}

// 审计动作
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "grade.ts")]
pub enum GradeAuditAction {
    Create,
    Update,
    Delete,
}

impl GradeAuditAction {
    pub const CREATE: &'static str = "CREATE";
    pub const UPDATE: &'static str = "UPDATE";
    pub const DELETE: &'static str = "DELETE";
}

impl<'de> Deserialize<'de> for GradeAuditAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for GradeAuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeAuditAction::Create => write!(f, "{}", GradeAuditAction::CREATE),
            GradeAuditAction::Update => write!(f, "{}", GradeAuditAction::UPDATE),
            GradeAuditAction::Delete => write!(f, "{}", GradeAuditAction::DELETE),
        }
    }
}

impl std::str::FromStr for GradeAuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            GradeAuditAction::CREATE => Ok(GradeAuditAction::Create),
            GradeAuditAction::UPDATE => Ok(GradeAuditAction::Update),
            GradeAuditAction::DELETE => Ok(GradeAuditAction::Delete),
            _ => Err(format!("Invalid audit action: {s}")),
        }
    }
}

// 成绩审计记录（只追加）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeAudit {
    pub id: i64,
    // 成绩被删除后为空
    pub grade_id: Option<i64>,
    pub student_id: i64,
    pub assessment_id: i64,
    pub learning_outcome_id: Option<i64>,
    pub action: GradeAuditAction,
    pub changed_by: Option<i64>,
    #[ts(type = "string | null")]
    pub old_score: Option<Decimal>,
    #[ts(type = "string | null")]
    pub new_score: Option<Decimal>,
    pub old_mastery: Option<i32>,
    pub new_mastery: Option<i32>,
    pub changed_at: chrono::DateTime<chrono::Utc>,
}

/// 待写入的审计记录，由成绩写入路径在提交后生成
#[derive(Debug, Clone, PartialEq)]
pub struct GradeAuditEntry {
    pub grade_id: Option<i64>,
    pub student_id: i64,
    pub assessment_id: i64,
    pub learning_outcome_id: Option<i64>,
    pub action: GradeAuditAction,
    pub changed_by: Option<i64>,
    pub old_score: Option<Decimal>,
    pub new_score: Option<Decimal>,
    pub old_mastery: Option<i32>,
    pub new_mastery: Option<i32>,
}

impl GradeAuditEntry {
    pub fn for_create(grade: &Grade, actor: Option<i64>) -> Self {
        Self {
            grade_id: Some(grade.id),
            student_id: grade.student_id,
            assessment_id: grade.assessment_id,
            learning_outcome_id: grade.learning_outcome_id,
            action: GradeAuditAction::Create,
            changed_by: actor,
            old_score: None,
            new_score: Some(grade.score_percentage),
            old_mastery: None,
            new_mastery: Some(grade.lo_mastery_score),
        }
    }

    pub fn for_update(before: &Grade, after: &Grade, actor: Option<i64>) -> Self {
        Self {
            grade_id: Some(after.id),
            student_id: after.student_id,
            assessment_id: after.assessment_id,
            learning_outcome_id: after.learning_outcome_id,
            action: GradeAuditAction::Update,
            changed_by: actor,
            old_score: Some(before.score_percentage),
            new_score: Some(after.score_percentage),
            old_mastery: Some(before.lo_mastery_score),
            new_mastery: Some(after.lo_mastery_score),
        }
    }

    /// 成绩已不存在，grade_id 置空，其余引用保留
    pub fn for_delete(before: &Grade, actor: Option<i64>) -> Self {
        Self {
            grade_id: None,
            student_id: before.student_id,
            assessment_id: before.assessment_id,
            learning_outcome_id: before.learning_outcome_id,
            action: GradeAuditAction::Delete,
            changed_by: actor,
            old_score: Some(before.score_percentage),
            new_score: None,
            old_mastery: Some(before.lo_mastery_score),
            new_mastery: None,
        }
    }
}

/// 导入写入结果：新建或覆盖
#[derive(Debug, Clone)]
pub enum GradeWrite {
    Created(Grade),
    Updated { before: Grade, after: Grade },
}

impl GradeWrite {
    pub fn grade(&self) -> &Grade {
        match self {
            GradeWrite::Created(grade) => grade,
            GradeWrite::Updated { after, .. } => after,
        }
    }

    pub fn audit_entry(&self, actor: Option<i64>) -> GradeAuditEntry {
        match self {
            GradeWrite::Created(grade) => GradeAuditEntry::for_create(grade, actor),
            GradeWrite::Updated { before, after } => {
                GradeAuditEntry::for_update(before, after, actor)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_grade(score: Decimal, mastery: i32) -> Grade {
        Grade {
            id: 42,
            student_id: 7,
            assessment_id: 3,
            learning_outcome_id: Some(11),
            score_percentage: score,
            lo_mastery_score: mastery,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_create_entry_has_no_old_values() {
        let entry = GradeAuditEntry::for_create(&sample_grade(dec!(80), 4), Some(1));
        assert_eq!(entry.action, GradeAuditAction::Create);
        assert_eq!(entry.grade_id, Some(42));
        assert_eq!(entry.old_score, None);
        assert_eq!(entry.new_score, Some(dec!(80)));
        assert_eq!(entry.new_mastery, Some(4));
        assert_eq!(entry.changed_by, Some(1));
    }

    #[test]
    fn test_update_entry_captures_both_sides() {
        let before = sample_grade(dec!(80), 4);
        let after = sample_grade(dec!(92.5), 5);
        let entry = GradeAuditEntry::for_update(&before, &after, None);
        assert_eq!(entry.old_score, Some(dec!(80)));
        assert_eq!(entry.new_score, Some(dec!(92.5)));
        assert_eq!(entry.old_mastery, Some(4));
        assert_eq!(entry.new_mastery, Some(5));
    }

    #[test]
    fn test_delete_entry_drops_grade_reference() {
        let entry = GradeAuditEntry::for_delete(&sample_grade(dec!(55), 2), Some(9));
        assert_eq!(entry.grade_id, None);
        assert_eq!(entry.student_id, 7);
        assert_eq!(entry.assessment_id, 3);
        assert_eq!(entry.learning_outcome_id, Some(11));
        assert_eq!(entry.new_score, None);
        assert_eq!(entry.new_mastery, None);
        assert_eq!(entry.old_mastery, Some(2));
    }

    #[test]
    fn test_audit_action_round_trip() {
        assert_eq!("DELETE".parse::<GradeAuditAction>(), Ok(GradeAuditAction::Delete));
        assert_eq!(GradeAuditAction::Update.to_string(), "UPDATE");
        assert!("delete".parse::<GradeAuditAction>().is_err());
    }
}
