use std::collections::BTreeMap;
use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::StreamExt;
use futures_util::stream;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::{ReportService, check_student};
use crate::config::AppConfig;
use crate::engine::compute_weighted_po_scores;
use crate::errors::Result;
use crate::models::reports::responses::{
    RecomputeAllResponse, RecomputeFailure, RecomputeResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::storage::locks::KeyedLocks;
use crate::utils::error_response;

// 同一学生的重算串行执行
static STUDENT_LOCKS: Lazy<KeyedLocks<i64>> = Lazy::new(KeyedLocks::new);

/// 按当前成绩账本重算学生的 PO 得分并整体替换持久化结果
pub async fn recompute_student(
    storage: &Arc<dyn Storage>,
    student_id: i64,
) -> Result<BTreeMap<String, Decimal>> {
    let _guard = STUDENT_LOCKS.acquire(student_id).await;

    let snapshot = storage.load_outcome_snapshot(Some(student_id)).await?;
    let scores = compute_weighted_po_scores(student_id, &snapshot, None)?;
    storage
        .replace_student_po_scores(student_id, &scores)
        .await?;

    debug!(
        "Recomputed {} PO scores for student {}",
        scores.len(),
        student_id
    );
    Ok(scores)
}

/// 并发重算所有学生，单个学生失败不影响其他学生
pub async fn recompute_all_students(
    storage: Arc<dyn Storage>,
    concurrency: usize,
) -> Result<RecomputeAllResponse> {
    let student_ids = storage.list_student_ids().await?;
    let total = student_ids.len();

    let outcomes: Vec<(i64, Result<BTreeMap<String, Decimal>>)> = stream::iter(student_ids)
        .map(|student_id| {
            let storage = storage.clone();
            async move { (student_id, recompute_student(&storage, student_id).await) }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut failures = Vec::new();
    for (student_id, outcome) in outcomes {
        if let Err(e) = outcome {
            warn!("PO recompute failed for student {}: {}", student_id, e);
            failures.push(RecomputeFailure {
                student_id,
                message: e.to_string(),
            });
        }
    }
    failures.sort_by_key(|f| f.student_id);

    info!(
        "PO recompute finished for {} students, {} failed",
        total,
        failures.len()
    );
    Ok(RecomputeAllResponse {
        total,
        succeeded: total - failures.len(),
        failed: failures.len(),
        failures,
    })
}

/// 后台重算，不阻塞成绩写入的响应
pub fn schedule_recompute(storage: Arc<dyn Storage>, student_ids: Vec<i64>) {
    if student_ids.is_empty() {
        return;
    }
    tokio::spawn(async move {
        for student_id in student_ids {
            match recompute_student(&storage, student_id).await {
                Ok(scores) => info!(
                    "Background PO recompute for student {} produced {} scores",
                    student_id,
                    scores.len()
                ),
                Err(e) => warn!("Background PO recompute for student {} failed: {}", student_id, e),
            }
        }
    });
}

/// 权重或贡献度变化后后台全量重算
pub fn schedule_recompute_all(storage: Arc<dyn Storage>) {
    let concurrency = AppConfig::get().engine.recompute_concurrency;
    tokio::spawn(async move {
        if let Err(e) = recompute_all_students(storage, concurrency).await {
            warn!("Background PO recompute for all students failed: {}", e);
        }
    });
}

pub async fn recompute_one(
    service: &ReportService,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    if let Some(resp) = check_student(&storage, student_id).await {
        return Ok(resp);
    }

    match recompute_student(&storage, student_id).await {
        Ok(scores) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RecomputeResponse { student_id, scores },
            "PO scores recomputed successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::StudentNotFound)),
    }
}

pub async fn recompute_everyone(
    service: &ReportService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let concurrency = AppConfig::get().engine.recompute_concurrency;

    match recompute_all_students(storage, concurrency).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            summary,
            "PO scores recomputed for all students",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::NotFound)),
    }
}
