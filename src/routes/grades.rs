use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::grades::requests::{
    CreateGradeRequest, GradeAuditQueryParams, GradeQueryParams, UpdateGradeRequest,
};
use crate::services::GradeService;

// 懒加载的全局 GradeService 实例
static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn list_grades(
    req: HttpRequest,
    query: web::Query<GradeQueryParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.list_grades(query.into_inner(), &req).await
}

pub async fn create_grade(
    req: HttpRequest,
    body: web::Json<CreateGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.create_grade(body.into_inner(), &req).await
}

pub async fn get_grade(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.get_grade(path.into_inner(), &req).await
}

pub async fn update_grade(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .update_grade(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_grade(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.delete_grade(path.into_inner(), &req).await
}

pub async fn list_grade_audits(
    req: HttpRequest,
    query: web::Query<GradeAuditQueryParams>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.list_audits(query.into_inner(), &req).await
}

// 挂在课程路由下：/api/v1/courses/{id}/grades/import
pub async fn import_grades(
    req: HttpRequest,
    path: web::Path<i64>,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .import_grades(path.into_inner(), payload, &req)
        .await
}

// 配置路由
pub fn configure_grade_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grades")
            .route("", web::get().to(list_grades))
            .route("", web::post().to(create_grade))
            .route("/{id}", web::get().to(get_grade))
            .route("/{id}", web::put().to(update_grade))
            .route("/{id}", web::delete().to(delete_grade)),
    )
    .service(web::scope("/api/v1/grade-audits").route("", web::get().to(list_grade_audits)));
}
