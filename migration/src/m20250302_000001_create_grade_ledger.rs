use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 成绩表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Grades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Grades::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Grades::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Grades::AssessmentId).big_integer().not_null())
                    .col(ColumnDef::new(Grades::LearningOutcomeId).big_integer().null())
                    .col(
                        ColumnDef::new(Grades::ScoreHundredths)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Grades::MasteryScore).integer().not_null())
                    .col(ColumnDef::new(Grades::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Grades::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Grades::Table, Grades::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Grades::Table, Grades::AssessmentId)
                            .to(Assessments::Table, Assessments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Grades::Table, Grades::LearningOutcomeId)
                            .to(LearningOutcomes::Table, LearningOutcomes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 成绩审计日志表 ====================
        // 学生/考核/LO 不加外键，删除后仍保留历史记录
        manager
            .create_table(
                Table::create()
                    .table(GradeAudits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeAudits::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GradeAudits::GradeId).big_integer().null())
                    .col(ColumnDef::new(GradeAudits::StudentId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GradeAudits::AssessmentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradeAudits::LearningOutcomeId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(GradeAudits::Action).string().not_null())
                    .col(ColumnDef::new(GradeAudits::ChangedBy).big_integer().null())
                    .col(
                        ColumnDef::new(GradeAudits::OldScoreHundredths)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradeAudits::NewScoreHundredths)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(GradeAudits::OldMastery).integer().null())
                    .col(ColumnDef::new(GradeAudits::NewMastery).integer().null())
                    .col(ColumnDef::new(GradeAudits::ChangedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeAudits::Table, GradeAudits::GradeId)
                            .to(Grades::Table, Grades::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 学生 PO 得分表（派生数据） ====================
        manager
            .create_table(
                Table::create()
                    .table(StudentPoScores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentPoScores::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentPoScores::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentPoScores::ProgramOutcomeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentPoScores::ScoreHundredths)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentPoScores::ComputedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentPoScores::Table, StudentPoScores::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentPoScores::Table, StudentPoScores::ProgramOutcomeId)
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
                    .name("idx_grades_student_assessment_lo")
                    .table(Grades::Table)
                    .col(Grades::StudentId)
                    .col(Grades::AssessmentId)
                    .col(Grades::LearningOutcomeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grades_assessment_id")
                    .table(Grades::Table)
                    .col(Grades::AssessmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grade_audits_student_id")
                    .table(GradeAudits::Table)
                    .col(GradeAudits::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grade_audits_grade_id")
                    .table(GradeAudits::Table)
                    .col(GradeAudits::GradeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_student_po_scores_pair")
                    .table(StudentPoScores::Table)
                    .col(StudentPoScores::StudentId)
                    .col(StudentPoScores::ProgramOutcomeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StudentPoScores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradeAudits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Grades::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Assessments {
    #[sea_orm(iden = "assessments")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum LearningOutcomes {
    #[sea_orm(iden = "learning_outcomes")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ProgramOutcomes {
    #[sea_orm(iden = "program_outcomes")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Grades {
    #[sea_orm(iden = "grades")]
    Table,
    Id,
    StudentId,
    AssessmentId,
    LearningOutcomeId,
    ScoreHundredths,
    MasteryScore,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GradeAudits {
    #[sea_orm(iden = "grade_audits")]
    Table,
    Id,
    GradeId,
    StudentId,
    AssessmentId,
    LearningOutcomeId,
    Action,
    ChangedBy,
    OldScoreHundredths,
    NewScoreHundredths,
    OldMastery,
    NewMastery,
    ChangedAt,
}

#[derive(DeriveIden)]
enum StudentPoScores {
    #[sea_orm(iden = "student_po_scores")]
    Table,
    Id,
    StudentId,
    ProgramOutcomeId,
    ScoreHundredths,
    ComputedAt,
}
