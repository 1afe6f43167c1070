pub mod courses;
pub mod grades;
pub mod outcomes;
pub mod reports;
pub mod students;

pub use courses::CourseService;
pub use grades::GradeService;
pub use outcomes::OutcomeService;
pub use reports::ReportService;
pub use students::StudentService;

use std::sync::Arc;

use actix_web::{HttpRequest, web};

use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::storage::Storage;

/// 从应用数据中取出存储实例
pub(crate) fn app_storage(request: &HttpRequest) -> Arc<dyn Storage> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone()
}

/// 缓存是可选的，未注册时报表直接计算
pub(crate) fn app_cache(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|cache| cache.get_ref().clone())
}

/// 成绩变化后清除院系报表缓存，并按配置在后台重算相关学生
pub(crate) async fn after_grade_change(
    request: &HttpRequest,
    storage: Arc<dyn Storage>,
    student_ids: Vec<i64>,
) {
    reports::invalidate_department_report(app_cache(request)).await;
    if AppConfig::get().engine.recompute_on_write {
        reports::schedule_recompute(storage, student_ids);
    }
}

/// 权重、贡献度或目录变化会影响所有学生的 PO 得分
pub(crate) async fn after_catalog_change(request: &HttpRequest, storage: Arc<dyn Storage>) {
    reports::invalidate_department_report(app_cache(request)).await;
    if AppConfig::get().engine.recompute_on_write {
        reports::schedule_recompute_all(storage);
    }
}
