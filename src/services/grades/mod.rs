pub mod audits;
pub mod create;
pub mod delete;
pub mod get;
pub mod import;
pub mod list;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::grades::requests::{
    CreateGradeRequest, GradeAuditQueryParams, GradeQueryParams, UpdateGradeRequest,
};
use crate::storage::Storage;

pub struct GradeService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradeService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::app_storage(request),
        }
    }

    // 录入成绩
    pub async fn create_grade(
        &self,
        req: CreateGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_grade(self, req, request).await
    }

    pub async fn get_grade(&self, grade_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_grade(self, grade_id, request).await
    }

    pub async fn update_grade(
        &self,
        grade_id: i64,
        req: UpdateGradeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_grade(self, grade_id, req, request).await
    }

    pub async fn delete_grade(
        &self,
        grade_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_grade(self, grade_id, request).await
    }

    pub async fn list_grades(
        &self,
        query: GradeQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_grades(self, query, request).await
    }

    // 审计记录
    pub async fn list_audits(
        &self,
        query: GradeAuditQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        audits::list_audits(self, query, request).await
    }

    // 批量导入
    pub async fn import_grades(
        &self,
        course_id: i64,
        payload: Multipart,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        import::import_grades(self, course_id, payload, request).await
    }
}
