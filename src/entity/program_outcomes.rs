//! 专业毕业要求实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "program_outcomes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lo_po_contributions::Entity")]
    Contributions,
    #[sea_orm(has_many = "super::student_po_scores::Entity")]
    StudentScores,
}

impl Related<super::lo_po_contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl Related<super::student_po_scores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentScores.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_program_outcome(self) -> crate::models::outcomes::entities::ProgramOutcome {
        crate::models::outcomes::entities::ProgramOutcome {
            id: self.id,
            code: self.code,
            title: self.title,
            description: self.description,
        }
    }
}
