//! 学生 PO 得分（重算产物）

use sea_orm::entity::prelude::*;

use crate::engine::from_hundredths;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_po_scores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub program_outcome_id: i64,
    pub score_hundredths: i64,
    pub computed_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::program_outcomes::Entity",
        from = "Column::ProgramOutcomeId",
        to = "super::program_outcomes::Column::Id"
    )]
    ProgramOutcome,
}

impl Related<super::program_outcomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProgramOutcome.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student_po_score(
        self,
        program_outcome_code: String,
    ) -> crate::models::reports::entities::StudentPoScore {
        crate::models::reports::entities::StudentPoScore {
            id: self.id,
            student_id: self.student_id,
            program_outcome_id: self.program_outcome_id,
            program_outcome_code,
            score: from_hundredths(self.score_hundredths),
            computed_at: super::timestamp_to_datetime(self.computed_at),
        }
    }
}
