//! 成绩实体

use sea_orm::entity::prelude::*;

use crate::engine::from_hundredths;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub assessment_id: i64,
    pub learning_outcome_id: Option<i64>,
    pub score_hundredths: i64,
    pub mastery_score: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::assessments::Entity",
        from = "Column::AssessmentId",
        to = "super::assessments::Column::Id"
    )]
    Assessment,
    #[sea_orm(
        belongs_to = "super::learning_outcomes::Entity",
        from = "Column::LearningOutcomeId",
        to = "super::learning_outcomes::Column::Id"
    )]
    LearningOutcome,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::assessments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessment.def()
    }
}

impl Related<super::learning_outcomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LearningOutcome.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_grade(self) -> crate::models::grades::entities::Grade {
        crate::models::grades::entities::Grade {
            id: self.id,
            student_id: self.student_id,
            assessment_id: self.assessment_id,
            learning_outcome_id: self.learning_outcome_id,
            score_percentage: from_hundredths(self.score_hundredths),
            lo_mastery_score: self.mastery_score,
            created_at: super::timestamp_to_datetime(self.created_at),
            updated_at: super::timestamp_to_datetime(self.updated_at),
        }
    }
}
