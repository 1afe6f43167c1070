use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::OutcomeService;
use crate::engine::weights::{WeightRow, sum_weights};
use crate::models::courses::responses::WeightSummary;
use crate::models::outcomes::requests::UpsertContributionRequest;
use crate::models::outcomes::responses::ContributionListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::after_catalog_change;
use crate::utils::error_response;

pub async fn list_contributions(
    service: &OutcomeService,
    learning_outcome_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_learning_outcome_by_id(learning_outcome_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::LearningOutcomeNotFound,
                "Learning outcome not found",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::LearningOutcomeNotFound)),
    }

    match storage.list_lo_contributions(learning_outcome_id).await {
        Ok(items) => {
            let rows: Vec<WeightRow> = items.iter().map(WeightRow::from).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                ContributionListResponse {
                    learning_outcome_id,
                    summary: WeightSummary::from_total(sum_weights(&rows)),
                    items,
                },
                "Contributions retrieved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::LearningOutcomeNotFound)),
    }
}

/// 合计超过 100 时返回 422，原有贡献度不变
pub async fn upsert_contribution(
    service: &OutcomeService,
    learning_outcome_id: i64,
    req: UpsertContributionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.upsert_contribution(learning_outcome_id, req).await {
        Ok(contribution) => {
            after_catalog_change(request, storage).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                contribution,
                "Contribution saved successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::LearningOutcomeNotFound)),
    }
}

pub async fn delete_contribution(
    service: &OutcomeService,
    learning_outcome_id: i64,
    program_outcome_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .delete_contribution(learning_outcome_id, program_outcome_id)
        .await
    {
        Ok(true) => {
            after_catalog_change(request, storage).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Contribution deleted successfully",
            )))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ContributionNotFound,
            "Contribution not found",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ContributionNotFound)),
    }
}
