//! 课程考核：列表附带权重汇总，写入时由存储层在事务内校验合计

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::engine::weights::{WeightRow, sum_weights};
use crate::models::courses::entities::Assessment;
use crate::models::courses::requests::{
    BatchAssessmentRequest, CreateAssessmentRequest, SetAssessmentOutcomesRequest,
    UpdateAssessmentRequest,
};
use crate::models::courses::responses::{AssessmentListResponse, WeightSummary};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::after_catalog_change;
use crate::utils::error_response;

fn with_summary(items: Vec<Assessment>) -> AssessmentListResponse {
    let rows: Vec<WeightRow> = items.iter().map(WeightRow::from).collect();
    AssessmentListResponse {
        weight_summary: WeightSummary::from_total(sum_weights(&rows)),
        items,
    }
}

fn assessment_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::AssessmentNotFound,
        "Assessment not found",
    ))
}

pub async fn list_assessments(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::CourseNotFound)),
    }

    match storage.list_course_assessments(course_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            with_summary(items),
            "Assessment list retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::CourseNotFound)),
    }
}

pub async fn create_assessment(
    service: &CourseService,
    course_id: i64,
    req: CreateAssessmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.create_assessment(course_id, req).await {
        Ok(assessment) => Ok(HttpResponse::Created().json(ApiResponse::success(
            assessment,
            "Assessment created successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::CourseNotFound)),
    }
}

/// 整体替换课程考核，返回替换后的列表
pub async fn batch_assessments(
    service: &CourseService,
    course_id: i64,
    req: BatchAssessmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .batch_update_assessments(course_id, req.rows)
        .await
    {
        Ok(items) => {
            after_catalog_change(request, storage).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                with_summary(items),
                "Assessments updated successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::AssessmentNotFound)),
    }
}

pub async fn get_assessment(
    service: &CourseService,
    assessment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_assessment_by_id(assessment_id).await {
        Ok(Some(assessment)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            assessment,
            "Assessment retrieved successfully",
        ))),
        Ok(None) => Ok(assessment_not_found()),
        Err(e) => Ok(error_response(&e, ErrorCode::AssessmentNotFound)),
    }
}

pub async fn update_assessment(
    service: &CourseService,
    assessment_id: i64,
    req: UpdateAssessmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let weight_changed = req.weight_percentage.is_some() || req.clear_weight;

    match storage.update_assessment(assessment_id, req).await {
        Ok(Some(assessment)) => {
            if weight_changed {
                after_catalog_change(request, storage).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                assessment,
                "Assessment updated successfully",
            )))
        }
        Ok(None) => Ok(assessment_not_found()),
        Err(e) => Ok(error_response(&e, ErrorCode::AssessmentNotFound)),
    }
}

pub async fn delete_assessment(
    service: &CourseService,
    assessment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_assessment(assessment_id).await {
        Ok(true) => {
            after_catalog_change(request, storage).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Assessment deleted successfully",
            )))
        }
        Ok(false) => Ok(assessment_not_found()),
        Err(e) => Ok(error_response(&e, ErrorCode::AssessmentNotFound)),
    }
}

/// 整体替换考核关联的 LO，LO 必须属于同一课程
pub async fn set_assessment_outcomes(
    service: &CourseService,
    assessment_id: i64,
    req: SetAssessmentOutcomesRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .set_assessment_outcomes(assessment_id, req.learning_outcome_ids)
        .await
    {
        Ok(Some(assessment)) => {
            after_catalog_change(request, storage).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                assessment,
                "Assessment outcomes updated successfully",
            )))
        }
        Ok(None) => Ok(assessment_not_found()),
        Err(e) => Ok(error_response(&e, ErrorCode::LearningOutcomeNotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summary_ignores_unweighted_assessments() {
        let items = vec![
            fixtures::assessment(1, 1, Some(dec!(40)), &[]),
            fixtures::assessment(2, 1, None, &[]),
            fixtures::assessment(3, 1, Some(dec!(35.5)), &[]),
        ];
        let response = with_summary(items);
        assert_eq!(response.weight_summary.total, dec!(75.5));
        assert_eq!(response.weight_summary.remaining, dec!(24.5));
        assert!(!response.weight_summary.is_complete);
        assert_eq!(response.items.len(), 3);
    }
}
