//! 成绩审计实体
//!
//! 只有 grade_id 带外键（成绩删除时置空），学生 / 考核 / LO 引用保留原值。

use sea_orm::entity::prelude::*;

use crate::engine::from_hundredths;
use crate::models::grades::entities::{GradeAudit, GradeAuditAction};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_audits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub grade_id: Option<i64>,
    pub student_id: i64,
    pub assessment_id: i64,
    pub learning_outcome_id: Option<i64>,
    pub action: String,
    pub changed_by: Option<i64>,
    pub old_score_hundredths: Option<i64>,
    pub new_score_hundredths: Option<i64>,
    pub old_mastery: Option<i32>,
    pub new_mastery: Option<i32>,
    pub changed_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grades::Entity",
        from = "Column::GradeId",
        to = "super::grades::Column::Id"
    )]
    Grade,
}

impl Related<super::grades::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grade.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_grade_audit(self) -> GradeAudit {
        GradeAudit {
            id: self.id,
            grade_id: self.grade_id,
            student_id: self.student_id,
            assessment_id: self.assessment_id,
            learning_outcome_id: self.learning_outcome_id,
            action: self.action.parse().unwrap_or(GradeAuditAction::Update),
            changed_by: self.changed_by,
            old_score: self.old_score_hundredths.map(from_hundredths),
            new_score: self.new_score_hundredths.map(from_hundredths),
            old_mastery: self.old_mastery,
            new_mastery: self.new_mastery,
            changed_at: super::timestamp_to_datetime(self.changed_at),
        }
    }
}
