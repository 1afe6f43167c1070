//! 考核实体

use sea_orm::entity::prelude::*;

use crate::engine::from_hundredths;
use crate::models::courses::entities::AssessmentType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub assessment_type: String,
    pub weight_hundredths: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::grades::Entity")]
    Grades,
    #[sea_orm(has_many = "super::assessment_learning_outcomes::Entity")]
    LearningOutcomeLinks,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::grades::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grades.def()
    }
}

impl Related<super::assessment_learning_outcomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LearningOutcomeLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 关联的 LO 存在独立的连接表中，由调用方查询后传入
    pub fn into_assessment(
        self,
        learning_outcome_ids: Vec<i64>,
    ) -> crate::models::courses::entities::Assessment {
        crate::models::courses::entities::Assessment {
            id: self.id,
            course_id: self.course_id,
            assessment_type: self
                .assessment_type
                .parse()
                .unwrap_or(AssessmentType::Other),
            weight_percentage: self.weight_hundredths.map(from_hundredths),
            learning_outcome_ids,
            created_at: super::timestamp_to_datetime(self.created_at),
            updated_at: super::timestamp_to_datetime(self.updated_at),
        }
    }
}
