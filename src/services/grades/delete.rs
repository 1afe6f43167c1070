use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::after_grade_change;
use crate::utils::actor_id;
use crate::utils::error_response;

pub async fn delete_grade(
    service: &GradeService,
    grade_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_grade(grade_id, actor_id(request)).await {
        Ok(Some(grade)) => {
            after_grade_change(request, storage, vec![grade.student_id]).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Grade deleted successfully")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::GradeNotFound,
            "Grade not found",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::GradeNotFound)),
    }
}
