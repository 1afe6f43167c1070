use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::grades::requests::UpdateGradeRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::after_grade_change;
use crate::utils::actor_id;
use crate::utils::error_response;

pub async fn update_grade(
    service: &GradeService,
    grade_id: i64,
    req: UpdateGradeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if req.score_percentage.is_none() && req.lo_mastery_score.is_none() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "Nothing to update",
        )));
    }

    let storage = service.get_storage(request);
    match storage.update_grade(grade_id, req, actor_id(request)).await {
        Ok(Some(grade)) => {
            after_grade_change(request, storage, vec![grade.student_id]).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                grade,
                "Grade updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::GradeNotFound,
            "Grade not found",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::GradeNotFound)),
    }
}
