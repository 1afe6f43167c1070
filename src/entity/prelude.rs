//! 预导入模块，方便使用

pub use super::assessment_learning_outcomes::{
    ActiveModel as AssessmentLearningOutcomeActiveModel, Entity as AssessmentLearningOutcomes,
    Model as AssessmentLearningOutcomeModel,
};
pub use super::assessments::{
    ActiveModel as AssessmentActiveModel, Entity as Assessments, Model as AssessmentModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::grade_audits::{
    ActiveModel as GradeAuditActiveModel, Entity as GradeAudits, Model as GradeAuditModel,
};
pub use super::grades::{ActiveModel as GradeActiveModel, Entity as Grades, Model as GradeModel};
pub use super::learning_outcomes::{
    ActiveModel as LearningOutcomeActiveModel, Entity as LearningOutcomes,
    Model as LearningOutcomeModel,
};
pub use super::lo_po_contributions::{
    ActiveModel as LoPoContributionActiveModel, Entity as LoPoContributions,
    Model as LoPoContributionModel,
};
pub use super::program_outcomes::{
    ActiveModel as ProgramOutcomeActiveModel, Entity as ProgramOutcomes,
    Model as ProgramOutcomeModel,
};
pub use super::student_po_scores::{
    ActiveModel as StudentPoScoreActiveModel, Entity as StudentPoScores,
    Model as StudentPoScoreModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
