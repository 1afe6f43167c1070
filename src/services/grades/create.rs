use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::grades::requests::CreateGradeRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::after_grade_change;
use crate::utils::validate::{validate_mastery, validate_percentage};
use crate::utils::{actor_id, error_response};

pub async fn create_grade(
    service: &GradeService,
    req: CreateGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_percentage(req.score_percentage)
        .and_then(|_| validate_mastery(req.lo_mastery_score))
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);
    match storage.create_grade(req, actor_id(request)).await {
        Ok(grade) => {
            after_grade_change(request, storage, vec![grade.student_id]).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(
                grade,
                "Grade recorded successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::NotFound)),
    }
}
