use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::{grades, outcomes};
use crate::models::courses::requests::{
    BatchAssessmentRequest, CourseQueryParams, CreateAssessmentRequest, CreateCourseRequest,
    SetAssessmentOutcomesRequest, UpdateAssessmentRequest, UpdateCourseRequest,
};
use crate::services::CourseService;

// 懒加载的全局 CourseService 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

// 课程
pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseQueryParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn create_course(
    req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.create_course(body.into_inner(), &req).await
}

pub async fn get_course(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(path.into_inner(), &req).await
}

pub async fn update_course(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_course(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(path.into_inner(), &req).await
}

// 课程考核
pub async fn list_assessments(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_assessments(path.into_inner(), &req).await
}

pub async fn create_assessment(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CreateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_assessment(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn batch_assessments(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<BatchAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .batch_assessments(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn get_assessment(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_assessment(path.into_inner(), &req).await
}

pub async fn update_assessment(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_assessment(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_assessment(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_assessment(path.into_inner(), &req).await
}

pub async fn set_assessment_outcomes(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SetAssessmentOutcomesRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .set_assessment_outcomes(path.into_inner(), body.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .route("", web::get().to(list_courses))
            .route("", web::post().to(create_course))
            .route("/{id}", web::get().to(get_course))
            .route("/{id}", web::put().to(update_course))
            .route("/{id}", web::delete().to(delete_course))
            .route("/{id}/assessments", web::get().to(list_assessments))
            .route("/{id}/assessments", web::post().to(create_assessment))
            .route("/{id}/assessments/batch", web::put().to(batch_assessments))
            .route(
                "/{id}/learning-outcomes",
                web::get().to(outcomes::list_learning_outcomes),
            )
            .route(
                "/{id}/learning-outcomes",
                web::post().to(outcomes::create_learning_outcome),
            )
            .route("/{id}/grades/import", web::post().to(grades::import_grades)),
    )
    .service(
        web::scope("/api/v1/assessments")
            .route("/{id}", web::get().to(get_assessment))
            .route("/{id}", web::put().to(update_assessment))
            .route("/{id}", web::delete().to(delete_assessment))
            .route("/{id}/outcomes", web::put().to(set_assessment_outcomes)),
    );
}
