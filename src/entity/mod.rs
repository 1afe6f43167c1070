//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! 百分比、成绩、学分以百分位整数（`*_hundredths`）存储，
//! 转换为业务实体时还原为定点小数。

pub mod prelude;

pub mod assessment_learning_outcomes;
pub mod assessments;
pub mod courses;
pub mod grade_audits;
pub mod grades;
pub mod learning_outcomes;
pub mod lo_po_contributions;
pub mod program_outcomes;
pub mod student_po_scores;
pub mod students;

use chrono::{DateTime, Utc};

pub(crate) fn timestamp_to_datetime(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}
