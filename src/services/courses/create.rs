use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, check_course_fields};
use crate::models::courses::requests::CreateCourseRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::error_response;

pub async fn create_course(
    service: &CourseService,
    req: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = check_course_fields(Some(&req.code), Some(&req.title), Some(req.ects_credit)) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);
    match storage.create_course(req).await {
        Ok(course) => Ok(HttpResponse::Created().json(ApiResponse::success(
            course,
            "Course created successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::CourseNotFound)),
    }
}
