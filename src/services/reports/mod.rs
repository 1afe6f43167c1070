//! 成果报表与 PO 得分重算
//!
//! 实时报表按需从成绩账本计算；`student_po_scores` 只由显式重算写入，
//! 成绩写入后由服务层调度重算，而不是在存储层触发。

pub mod course_grade;
pub mod department;
pub mod gpa;
pub mod lo_scores;
pub mod po_scores;
pub mod recompute;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::errors::Result;
use crate::models::reports::requests::{GpaQuery, LoScoreQuery, PoScoreQuery};
use crate::models::reports::responses::RecomputeAllResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::error_response;

pub use department::invalidate_department_report;
pub use recompute::{recompute_student, schedule_recompute, schedule_recompute_all};

pub struct ReportService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReportService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::app_storage(request),
        }
    }

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
        super::app_cache(request)
    }

    pub async fn recompute_all_students(
        storage: Arc<dyn Storage>,
        concurrency: usize,
    ) -> Result<RecomputeAllResponse> {
        recompute::recompute_all_students(storage, concurrency).await
    }

    pub async fn lo_scores(
        &self,
        student_id: i64,
        query: LoScoreQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lo_scores::get_lo_scores(self, student_id, query, request).await
    }

    pub async fn course_grade(
        &self,
        student_id: i64,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        course_grade::get_course_grade(self, student_id, course_id, request).await
    }

    pub async fn po_scores(
        &self,
        student_id: i64,
        query: PoScoreQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        po_scores::get_po_scores(self, student_id, query, request).await
    }

    pub async fn stored_po_scores(
        &self,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        po_scores::get_stored_po_scores(self, student_id, request).await
    }

    pub async fn recompute(&self, student_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        recompute::recompute_one(self, student_id, request).await
    }

    pub async fn recompute_all(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        recompute::recompute_everyone(self, request).await
    }

    pub async fn department_report(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        department::get_department_report(self, request).await
    }

    pub async fn gpa(&self, query: GpaQuery) -> ActixResult<HttpResponse> {
        gpa::get_gpa(query).await
    }
}

/// 学生不存在或查询失败时返回对应响应
pub(crate) async fn check_student(
    storage: &Arc<dyn Storage>,
    student_id: i64,
) -> Option<HttpResponse> {
    match storage.get_student_by_id(student_id).await {
        Ok(Some(_)) => None,
        Ok(None) => Some(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::StudentNotFound,
            "Student not found",
        ))),
        Err(e) => Some(error_response(&e, ErrorCode::StudentNotFound)),
    }
}

pub(crate) async fn check_course(
    storage: &Arc<dyn Storage>,
    course_id: i64,
) -> Option<HttpResponse> {
    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => None,
        Ok(None) => Some(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        ))),
        Err(e) => Some(error_response(&e, ErrorCode::CourseNotFound)),
    }
}
