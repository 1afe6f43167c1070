use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, check_course, check_student};
use crate::engine::{compute_course_grade, score_to_gpa};
use crate::models::reports::responses::CourseGradeResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::error_response;

pub async fn get_course_grade(
    service: &ReportService,
    student_id: i64,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    if let Some(resp) = check_student(&storage, student_id).await {
        return Ok(resp);
    }
    if let Some(resp) = check_course(&storage, course_id).await {
        return Ok(resp);
    }

    let assessments = match storage.list_course_assessments(course_id).await {
        Ok(items) => items,
        Err(e) => return Ok(error_response(&e, ErrorCode::CourseNotFound)),
    };
    let grades = match storage.list_student_grades(student_id, Some(course_id)).await {
        Ok(items) => items,
        Err(e) => return Ok(error_response(&e, ErrorCode::StudentNotFound)),
    };

    let score = compute_course_grade(student_id, &assessments, &grades);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CourseGradeResponse {
            student_id,
            course_id,
            score,
            gpa: score_to_gpa(score),
        },
        "Course grade computed successfully",
    )))
}
