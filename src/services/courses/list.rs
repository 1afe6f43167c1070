use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::courses::requests::{CourseListQuery, CourseQueryParams};
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::error_response;

pub async fn list_courses(
    service: &CourseService,
    query: CourseQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_courses_with_pagination(CourseListQuery::from(query))
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Course list retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::NotFound)),
    }
}
