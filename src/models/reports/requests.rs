use rust_decimal::Decimal;
use serde::Deserialize;
use ts_rs::TS;

// LO 得分查询
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct LoScoreQuery {
    pub course_id: i64,
    // 为空时使用配置 engine.treat_missing_as_zero
    pub treat_missing_as_zero: Option<bool>,
}

// PO 得分查询，course_id 为空表示全部课程
#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct PoScoreQuery {
    pub course_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "report.ts")]
pub struct GpaQuery {
    #[ts(type = "string")]
    pub score: Decimal,
}
