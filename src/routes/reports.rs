use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::reports::requests::{GpaQuery, LoScoreQuery, PoScoreQuery};
use crate::services::ReportService;

// 懒加载的全局 ReportService 实例
static REPORT_SERVICE: Lazy<ReportService> = Lazy::new(ReportService::new_lazy);

pub async fn lo_scores(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<LoScoreQuery>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .lo_scores(path.into_inner(), query.into_inner(), &req)
        .await
}

pub async fn course_grade(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (student_id, course_id) = path.into_inner();
    REPORT_SERVICE.course_grade(student_id, course_id, &req).await
}

pub async fn po_scores(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<PoScoreQuery>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .po_scores(path.into_inner(), query.into_inner(), &req)
        .await
}

pub async fn stored_po_scores(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .stored_po_scores(path.into_inner(), &req)
        .await
}

pub async fn recompute_student(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.recompute(path.into_inner(), &req).await
}

pub async fn recompute_all(req: HttpRequest) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.recompute_all(&req).await
}

pub async fn department(req: HttpRequest) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.department_report(&req).await
}

pub async fn gpa(query: web::Query<GpaQuery>) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.gpa(query.into_inner()).await
}

// 配置路由
pub fn configure_report_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reports")
            .route("/students/{id}/lo-scores", web::get().to(lo_scores))
            .route(
                "/students/{id}/courses/{course_id}/grade",
                web::get().to(course_grade),
            )
            .route("/students/{id}/po-scores", web::get().to(po_scores))
            .route(
                "/students/{id}/po-scores/stored",
                web::get().to(stored_po_scores),
            )
            .route(
                "/students/{id}/po-scores/recompute",
                web::post().to(recompute_student),
            )
            .route("/po-scores/recompute", web::post().to(recompute_all))
            .route("/department", web::get().to(department))
            .route("/gpa", web::get().to(gpa)),
    );
}
