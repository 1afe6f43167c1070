use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GradeService;
use crate::models::grades::requests::{GradeListQuery, GradeQueryParams};
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::error_response;

pub async fn list_grades(
    service: &GradeService,
    query: GradeQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_grades_with_pagination(GradeListQuery::from(query))
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Grade list retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::NotFound)),
    }
}
