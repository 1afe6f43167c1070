//! LO → PO 贡献度实体

use sea_orm::entity::prelude::*;

use crate::engine::from_hundredths;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lo_po_contributions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub learning_outcome_id: i64,
    pub program_outcome_id: i64,
    pub contribution_hundredths: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::learning_outcomes::Entity",
        from = "Column::LearningOutcomeId",
        to = "super::learning_outcomes::Column::Id"
    )]
    LearningOutcome,
    #[sea_orm(
        belongs_to = "super::program_outcomes::Entity",
        from = "Column::ProgramOutcomeId",
        to = "super::program_outcomes::Column::Id"
    )]
    ProgramOutcome,
}

impl Related<super::learning_outcomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LearningOutcome.def()
    }
}

impl Related<super::program_outcomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProgramOutcome.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_contribution(
        self,
        program_outcome_code: String,
    ) -> crate::models::outcomes::entities::LoPoContribution {
        crate::models::outcomes::entities::LoPoContribution {
            id: self.id,
            learning_outcome_id: self.learning_outcome_id,
            program_outcome_id: self.program_outcome_id,
            program_outcome_code,
            contribution_percentage: from_hundredths(self.contribution_hundredths),
        }
    }
}
