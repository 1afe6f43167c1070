use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, check_course, check_student};
use crate::engine::{average_po_score, compute_weighted_po_scores};
use crate::models::reports::requests::PoScoreQuery;
use crate::models::reports::responses::{PoScoresResponse, StoredPoScoresResponse};
use crate::errors::ObeError;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::error_response;

/// 实时计算，不写入持久化结果
pub async fn get_po_scores(
    service: &ReportService,
    student_id: i64,
    query: PoScoreQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    if let Some(resp) = check_student(&storage, student_id).await {
        return Ok(resp);
    }
    if let Some(course_id) = query.course_id
        && let Some(resp) = check_course(&storage, course_id).await
    {
        return Ok(resp);
    }

    let snapshot = match storage.load_outcome_snapshot(Some(student_id)).await {
        Ok(snapshot) => snapshot,
        Err(e) => return Ok(error_response(&e, ErrorCode::StudentNotFound)),
    };

    match compute_weighted_po_scores(student_id, &snapshot, query.course_id) {
        Ok(scores) => {
            let average = average_po_score(&scores);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                PoScoresResponse {
                    student_id,
                    course_id: query.course_id,
                    scores,
                    average,
                },
                "Program outcome scores computed successfully",
            )))
        }
        Err(e) => Ok(error_response(&ObeError::from(e), ErrorCode::NotFound)),
    }
}

pub async fn get_stored_po_scores(
    service: &ReportService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    if let Some(resp) = check_student(&storage, student_id).await {
        return Ok(resp);
    }

    match storage.list_student_po_scores(student_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StoredPoScoresResponse { student_id, items },
            "Stored program outcome scores retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::StudentNotFound)),
    }
}
