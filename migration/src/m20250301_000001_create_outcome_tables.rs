use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建学生表
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Students::Identifier)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::DisplayName).string().null())
                    .col(ColumnDef::new(Students::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建课程表
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Courses::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(
                        ColumnDef::new(Courses::EctsHundredths)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Courses::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建考核表
        manager
            .create_table(
                Table::create()
                    .table(Assessments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assessments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assessments::CourseId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Assessments::AssessmentType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::WeightHundredths)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assessments::Table, Assessments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建课程学习成果（LO）表
        manager
            .create_table(
                Table::create()
                    .table(LearningOutcomes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LearningOutcomes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LearningOutcomes::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LearningOutcomes::Code).string().not_null())
                    .col(ColumnDef::new(LearningOutcomes::Title).string().not_null())
                    .col(ColumnDef::new(LearningOutcomes::Description).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(LearningOutcomes::Table, LearningOutcomes::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 考核与 LO 关联表
        manager
            .create_table(
                Table::create()
                    .table(AssessmentLearningOutcomes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssessmentLearningOutcomes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssessmentLearningOutcomes::AssessmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentLearningOutcomes::LearningOutcomeId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                AssessmentLearningOutcomes::Table,
                                AssessmentLearningOutcomes::AssessmentId,
                            )
                            .to(Assessments::Table, Assessments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                AssessmentLearningOutcomes::Table,
                                AssessmentLearningOutcomes::LearningOutcomeId,
                            )
                            .to(LearningOutcomes::Table, LearningOutcomes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建专业成果（PO）表
        manager
            .create_table(
                Table::create()
                    .table(ProgramOutcomes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProgramOutcomes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProgramOutcomes::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ProgramOutcomes::Title).string().not_null())
                    .col(ColumnDef::new(ProgramOutcomes::Description).text().null())
                    .to_owned(),
            )
            .await?;

        // LO -> PO 贡献度表
        manager
            .create_table(
                Table::create()
                    .table(LoPoContributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoPoContributions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LoPoContributions::LearningOutcomeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoPoContributions::ProgramOutcomeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoPoContributions::ContributionHundredths)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LoPoContributions::Table, LoPoContributions::LearningOutcomeId)
                            .to(LearningOutcomes::Table, LearningOutcomes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LoPoContributions::Table, LoPoContributions::ProgramOutcomeId)
                            .to(ProgramOutcomes::Table, ProgramOutcomes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assessments_course_id")
                    .table(Assessments::Table)
                    .col(Assessments::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_learning_outcomes_course_code")
                    .table(LearningOutcomes::Table)
                    .col(LearningOutcomes::CourseId)
                    .col(LearningOutcomes::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assessment_los_pair")
                    .table(AssessmentLearningOutcomes::Table)
                    .col(AssessmentLearningOutcomes::AssessmentId)
                    .col(AssessmentLearningOutcomes::LearningOutcomeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lo_po_contributions_pair")
                    .table(LoPoContributions::Table)
                    .col(LoPoContributions::LearningOutcomeId)
                    .col(LoPoContributions::ProgramOutcomeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(LoPoContributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProgramOutcomes::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(AssessmentLearningOutcomes::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(LearningOutcomes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assessments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
    Identifier,
    DisplayName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    #[sea_orm(iden = "courses")]
    Table,
    Id,
    Code,
    Title,
    EctsHundredths,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Assessments {
    #[sea_orm(iden = "assessments")]
    Table,
    Id,
    CourseId,
    AssessmentType,
    WeightHundredths,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LearningOutcomes {
    #[sea_orm(iden = "learning_outcomes")]
    Table,
    Id,
    CourseId,
    Code,
    Title,
    Description,
}

#[derive(DeriveIden)]
enum AssessmentLearningOutcomes {
    #[sea_orm(iden = "assessment_learning_outcomes")]
    Table,
    Id,
    AssessmentId,
    LearningOutcomeId,
}

#[derive(DeriveIden)]
enum ProgramOutcomes {
    #[sea_orm(iden = "program_outcomes")]
    Table,
    Id,
    Code,
    Title,
    Description,
}

#[derive(DeriveIden)]
enum LoPoContributions {
    #[sea_orm(iden = "lo_po_contributions")]
    Table,
    Id,
    LearningOutcomeId,
    ProgramOutcomeId,
    ContributionHundredths,
}
