use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use super::ReportService;
use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::engine::aggregate_department_report;
use crate::errors::Result;
use crate::models::reports::responses::DepartmentReportResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::error_response;

const DEPARTMENT_REPORT_KEY: &str = "report:department";

// 每个缓存实例的报表代数，失效时递增
static REPORT_GENERATIONS: Lazy<DashMap<usize, u64>> = Lazy::new(DashMap::new);

fn cache_slot(cache: &Arc<dyn ObjectCache>) -> usize {
    Arc::as_ptr(cache).cast::<()>() as usize
}

fn report_generation(cache: &Arc<dyn ObjectCache>) -> u64 {
    REPORT_GENERATIONS
        .get(&cache_slot(cache))
        .map(|generation| *generation)
        .unwrap_or(0)
}

/// 仅当计算期间没有发生失效时写回缓存
async fn store_if_current(
    cache: &Arc<dyn ObjectCache>,
    report: &DepartmentReportResponse,
    generation: u64,
) -> bool {
    if report_generation(cache) != generation {
        debug!("Department report invalidated during computation, not cached");
        return false;
    }
    cache
        .insert_json(
            DEPARTMENT_REPORT_KEY,
            report,
            AppConfig::get().cache.default_ttl,
        )
        .await;
    // 写入与失效交错时撤回
    if report_generation(cache) != generation {
        cache.remove(DEPARTMENT_REPORT_KEY).await;
        return false;
    }
    true
}

/// 基于全部成绩计算院系报表
pub async fn build_department_report(storage: &Arc<dyn Storage>) -> Result<DepartmentReportResponse> {
    let snapshot = storage.load_outcome_snapshot(None).await?;
    let total_system_ects = storage.total_system_ects().await?;
    let data = aggregate_department_report(&snapshot, total_system_ects)?;

    let message = if snapshot.grades.is_empty() {
        Some("No grades recorded yet".to_string())
    } else if total_system_ects.is_zero() {
        Some("No ECTS credits configured".to_string())
    } else if data.is_empty() {
        Some("No learning outcome contributes to any program outcome".to_string())
    } else {
        None
    };

    Ok(DepartmentReportResponse {
        report_available: !data.is_empty(),
        message,
        total_system_ects,
        data,
        generated_at: chrono::Utc::now(),
    })
}

/// 先查缓存，未命中时计算并写回
pub async fn cached_department_report(
    storage: &Arc<dyn Storage>,
    cache: Option<&Arc<dyn ObjectCache>>,
) -> Result<DepartmentReportResponse> {
    if let Some(cache) = cache
        && let CacheResult::Found(report) = cache
            .get_json::<DepartmentReportResponse>(DEPARTMENT_REPORT_KEY)
            .await
    {
        debug!("Department report served from cache");
        return Ok(report);
    }

    let generation = cache.map(report_generation);
    let report = build_department_report(storage).await?;
    if let (Some(cache), Some(generation)) = (cache, generation) {
        store_if_current(cache, &report, generation).await;
    }
    Ok(report)
}

/// 成绩变化后清除院系报表缓存，并使进行中的计算结果不再写回
pub async fn invalidate_department_report(cache: Option<Arc<dyn ObjectCache>>) {
    if let Some(cache) = cache {
        *REPORT_GENERATIONS.entry(cache_slot(&cache)).or_insert(0) += 1;
        cache.remove(DEPARTMENT_REPORT_KEY).await;
    }
}

pub async fn get_department_report(
    service: &ReportService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let cache = service.get_cache(request);

    match cached_department_report(&storage, cache.as_ref()).await {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            report,
            "Department report generated successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::NotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::courses::entities::AssessmentType;
    use crate::models::grades::entities::{GradeKey, GradeValues};
    use crate::storage::sea_orm_storage::test_support;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_empty_ledger_reports_unavailable() {
        let storage: Arc<dyn Storage> = Arc::new(test_support::storage().await);
        let report = build_department_report(&storage).await.unwrap();
        assert!(!report.report_available);
        assert!(report.data.is_empty());
        assert!(report.message.is_some());
    }

    #[tokio::test]
    async fn test_report_counts_students_and_is_cached() {
        let seeded = test_support::storage().await;
        let s1 = test_support::student(&seeded, "s1").await;
        let s2 = test_support::student(&seeded, "s2").await;
        let course = test_support::course(&seeded, "CS101", dec!(5)).await;
        let lo = test_support::learning_outcome(&seeded, course.id, "LO1").await;
        let po = test_support::program_outcome(&seeded, "PO-01").await;
        test_support::contribution(&seeded, lo.id, po.id, dec!(50)).await;
        let assessment = test_support::assessment(
            &seeded,
            course.id,
            AssessmentType::Final,
            Some(dec!(80)),
            vec![lo.id],
        )
        .await;
        let rows = [s1.id, s2.id]
            .into_iter()
            .map(|student_id| GradeValues {
                key: GradeKey {
                    student_id,
                    assessment_id: assessment.id,
                    learning_outcome_id: Some(lo.id),
                },
                score_percentage: dec!(90),
                lo_mastery_score: 5,
            })
            .collect();
        seeded.upsert_grades_impl(rows, None).await.unwrap();

        let storage: Arc<dyn Storage> = Arc::new(seeded);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(16, 60));

        let first = cached_department_report(&storage, Some(&cache)).await.unwrap();
        assert!(first.report_available);
        assert_eq!(first.data["PO-01"].student_count, 2);
        assert_eq!(first.total_system_ects, dec!(5));

        let second = cached_department_report(&storage, Some(&cache)).await.unwrap();
        assert_eq!(second.generated_at, first.generated_at);

        invalidate_department_report(Some(cache.clone())).await;
        assert!(matches!(
            cache
                .get_json::<DepartmentReportResponse>(DEPARTMENT_REPORT_KEY)
                .await,
            CacheResult::NotFound
        ));
    }

    #[tokio::test]
    async fn test_report_computed_before_invalidation_is_not_cached() {
        let storage: Arc<dyn Storage> = Arc::new(test_support::storage().await);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(16, 60));

        let started = report_generation(&cache);
        let stale = build_department_report(&storage).await.unwrap();
        invalidate_department_report(Some(cache.clone())).await;

        assert!(!store_if_current(&cache, &stale, started).await);
        assert!(matches!(
            cache
                .get_json::<DepartmentReportResponse>(DEPARTMENT_REPORT_KEY)
                .await,
            CacheResult::NotFound
        ));

        // 失效之后开始的计算正常写回
        let restarted = report_generation(&cache);
        let fresh = build_department_report(&storage).await.unwrap();
        assert!(store_if_current(&cache, &fresh, restarted).await);
        assert!(matches!(
            cache
                .get_json::<DepartmentReportResponse>(DEPARTMENT_REPORT_KEY)
                .await,
            CacheResult::Found(_)
        ));
    }
}
