use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::grades::requests::{GradeAuditListQuery, GradeAuditQueryParams};
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::error_response;

/// 审计记录只读，最新在前
pub async fn list_audits(
    service: &GradeService,
    query: GradeAuditQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_grade_audits(GradeAuditListQuery::from(query))
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Grade audit entries retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::NotFound)),
    }
}
