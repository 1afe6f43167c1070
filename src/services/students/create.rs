use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::models::students::requests::CreateStudentRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::error_response;

pub async fn create_student(
    service: &StudentService,
    mut req: CreateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    req.identifier = req.identifier.trim().to_string();
    if req.identifier.is_empty() || req.identifier.chars().count() > 64 {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "Student identifier must be 1-64 characters",
        )));
    }

    let storage = service.get_storage(request);
    match storage.create_student(req).await {
        Ok(student) => Ok(HttpResponse::Created().json(ApiResponse::success(
            student,
            "Student created successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::StudentNotFound)),
    }
}
