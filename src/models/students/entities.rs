use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 学生（由外部系统维护，这里只保留成绩关联所需字段）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "student.ts")]
pub struct Student {
    pub id: i64,
    // 学号 / 用户名，导入时用于匹配
    pub identifier: String,
    pub display_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
