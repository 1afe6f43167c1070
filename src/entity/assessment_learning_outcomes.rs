//! 考核与 LO 的关联

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assessment_learning_outcomes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assessment_id: i64,
    pub learning_outcome_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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
