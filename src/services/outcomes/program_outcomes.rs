use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{OutcomeService, check_outcome_fields};
use crate::models::outcomes::requests::{CreateProgramOutcomeRequest, UpdateProgramOutcomeRequest};
use crate::models::outcomes::responses::ProgramOutcomeListResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::after_catalog_change;
use crate::utils::error_response;

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::ProgramOutcomeNotFound,
        "Program outcome not found",
    ))
}

pub async fn list_program_outcomes(
    service: &OutcomeService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_program_outcomes().await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ProgramOutcomeListResponse { items },
            "Program outcomes retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ProgramOutcomeNotFound)),
    }
}

pub async fn create_program_outcome(
    service: &OutcomeService,
    req: CreateProgramOutcomeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = check_outcome_fields(Some(&req.code), Some(&req.title)) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);
    match storage.create_program_outcome(req).await {
        Ok(outcome) => Ok(HttpResponse::Created().json(ApiResponse::success(
            outcome,
            "Program outcome created successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ProgramOutcomeNotFound)),
    }
}

pub async fn get_program_outcome(
    service: &OutcomeService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_program_outcome_by_id(id).await {
        Ok(Some(outcome)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            outcome,
            "Program outcome retrieved successfully",
        ))),
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(error_response(&e, ErrorCode::ProgramOutcomeNotFound)),
    }
}

pub async fn update_program_outcome(
    service: &OutcomeService,
    id: i64,
    req: UpdateProgramOutcomeRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    if let Err(msg) = check_outcome_fields(req.code.as_deref(), req.title.as_deref()) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let storage = service.get_storage(request);
    // PO 得分以代码为键，改代码后需要重算
    let code_changed = req.code.is_some();

    match storage.update_program_outcome(id, req).await {
        Ok(Some(outcome)) => {
            if code_changed {
                after_catalog_change(request, storage).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                outcome,
                "Program outcome updated successfully",
            )))
        }
        Ok(None) => Ok(not_found()),
        Err(e) => Ok(error_response(&e, ErrorCode::ProgramOutcomeNotFound)),
    }
}

pub async fn delete_program_outcome(
    service: &OutcomeService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_program_outcome(id).await {
        Ok(true) => {
            after_catalog_change(request, storage).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Program outcome deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found()),
        Err(e) => Ok(error_response(&e, ErrorCode::ProgramOutcomeNotFound)),
    }
}
