use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, check_course, check_student};
use crate::config::AppConfig;
use crate::engine::{MissingGradePolicy, compute_lo_scores};
use crate::models::reports::requests::LoScoreQuery;
use crate::models::reports::responses::LoScoresResponse;
use crate::errors::ObeError;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::error_response;

pub async fn get_lo_scores(
    service: &ReportService,
    student_id: i64,
    query: LoScoreQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    if let Some(resp) = check_student(&storage, student_id).await {
        return Ok(resp);
    }
    if let Some(resp) = check_course(&storage, query.course_id).await {
        return Ok(resp);
    }

    let policy = MissingGradePolicy::from_flag(
        query
            .treat_missing_as_zero
            .unwrap_or(AppConfig::get().engine.treat_missing_as_zero),
    );

    let assessments = match storage.list_course_assessments(query.course_id).await {
        Ok(items) => items,
        Err(e) => return Ok(error_response(&e, ErrorCode::CourseNotFound)),
    };
    let learning_outcomes = match storage.list_course_learning_outcomes(query.course_id).await {
        Ok(items) => items,
        Err(e) => return Ok(error_response(&e, ErrorCode::CourseNotFound)),
    };
    let grades = match storage
        .list_student_grades(student_id, Some(query.course_id))
        .await
    {
        Ok(items) => items,
        Err(e) => return Ok(error_response(&e, ErrorCode::StudentNotFound)),
    };

    match compute_lo_scores(student_id, &assessments, &learning_outcomes, &grades, policy) {
        Ok(scores) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            LoScoresResponse {
                student_id,
                course_id: query.course_id,
                scores,
            },
            "Learning outcome scores computed successfully",
        ))),
        Err(e) => Ok(error_response(&ObeError::from(e), ErrorCode::NotFound)),
    }
}
