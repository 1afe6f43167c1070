use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, check_course_fields};
use crate::models::courses::requests::UpdateCourseRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::error_response;

pub async fn update_course(
    service: &CourseService,
    course_id: i64,
    req: UpdateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = check_course_fields(req.code.as_deref(), req.title.as_deref(), req.ects_credit) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);
    // 学分变化会改变 PO 归一化分母
    let ects_changed = req.ects_credit.is_some();

    match storage.update_course(course_id, req).await {
        Ok(Some(course)) => {
            if ects_changed {
                crate::services::after_catalog_change(request, storage).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                course,
                "Course updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::CourseNotFound)),
    }
}
