use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{OutcomeService, check_outcome_fields};
use crate::models::outcomes::requests::{
    CreateLearningOutcomeRequest, UpdateLearningOutcomeRequest,
};
use crate::models::outcomes::responses::LearningOutcomeListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::after_catalog_change;
use crate::utils::error_response;

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::LearningOutcomeNotFound,
        "Learning outcome not found",
    ))
}

pub async fn list_learning_outcomes(
    service: &OutcomeService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::CourseNotFound)),
    }

    match storage.list_course_learning_outcomes(course_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            LearningOutcomeListResponse { items },
            "Learning outcomes retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::CourseNotFound)),
    }
}

pub async fn create_learning_outcome(
    service: &OutcomeService,
    course_id: i64,
    req: CreateLearningOutcomeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = check_outcome_fields(Some(&req.code), Some(&req.title)) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);
    match storage.create_learning_outcome(course_id, req).await {
        Ok(outcome) => Ok(HttpResponse::Created().json(ApiResponse::success(
            outcome,
            "Learning outcome created successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::CourseNotFound)),
    }
}

pub async fn get_learning_outcome(
    service: &OutcomeService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_learning_outcome_by_id(id).await {
        Ok(Some(outcome)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            outcome,
            "Learning outcome retrieved successfully",
        ))),
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(error_response(&e, ErrorCode::LearningOutcomeNotFound)),
    }
}

pub async fn update_learning_outcome(
    service: &OutcomeService,
    id: i64,
    req: UpdateLearningOutcomeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = check_outcome_fields(req.code.as_deref(), req.title.as_deref()) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);
    match storage.update_learning_outcome(id, req).await {
        Ok(Some(outcome)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            outcome,
            "Learning outcome updated successfully",
        ))),
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(error_response(&e, ErrorCode::LearningOutcomeNotFound)),
    }
}

/// 删除 LO，关联的贡献度与成绩级联删除
pub async fn delete_learning_outcome(
    service: &OutcomeService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_learning_outcome(id).await {
        Ok(true) => {
            after_catalog_change(request, storage).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Learning outcome deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found()),
        Err(e) => Ok(error_response(&e, ErrorCode::LearningOutcomeNotFound)),
    }
}
