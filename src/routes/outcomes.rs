use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::outcomes::requests::{
    CreateLearningOutcomeRequest, CreateProgramOutcomeRequest, UpdateLearningOutcomeRequest,
    UpdateProgramOutcomeRequest, UpsertContributionRequest,
};
use crate::services::OutcomeService;

// 懒加载的全局 OutcomeService 实例
static OUTCOME_SERVICE: Lazy<OutcomeService> = Lazy::new(OutcomeService::new_lazy);

// 课程学习成果（课程路由下的列表与创建也使用这里的处理程序）
pub async fn list_learning_outcomes(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .list_learning_outcomes(path.into_inner(), &req)
        .await
}

pub async fn create_learning_outcome(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<CreateLearningOutcomeRequest>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .create_learning_outcome(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn get_learning_outcome(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .get_learning_outcome(path.into_inner(), &req)
        .await
}

pub async fn update_learning_outcome(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateLearningOutcomeRequest>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .update_learning_outcome(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_learning_outcome(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .delete_learning_outcome(path.into_inner(), &req)
        .await
}

// 贡献度
pub async fn list_contributions(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .list_contributions(path.into_inner(), &req)
        .await
}

pub async fn upsert_contribution(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpsertContributionRequest>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .upsert_contribution(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_contribution(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (learning_outcome_id, program_outcome_id) = path.into_inner();
    OUTCOME_SERVICE
        .delete_contribution(learning_outcome_id, program_outcome_id, &req)
        .await
}

// 专业毕业要求
pub async fn list_program_outcomes(req: HttpRequest) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE.list_program_outcomes(&req).await
}

pub async fn create_program_outcome(
    req: HttpRequest,
    body: web::Json<CreateProgramOutcomeRequest>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .create_program_outcome(body.into_inner(), &req)
        .await
}

pub async fn get_program_outcome(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .get_program_outcome(path.into_inner(), &req)
        .await
}

pub async fn update_program_outcome(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateProgramOutcomeRequest>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .update_program_outcome(path.into_inner(), body.into_inner(), &req)
        .await
}

pub async fn delete_program_outcome(
    req: HttpRequest,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    OUTCOME_SERVICE
        .delete_program_outcome(path.into_inner(), &req)
        .await
}

// 配置路由
pub fn configure_outcome_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/learning-outcomes")
            .route("/{id}", web::get().to(get_learning_outcome))
            .route("/{id}", web::put().to(update_learning_outcome))
            .route("/{id}", web::delete().to(delete_learning_outcome))
            .route("/{id}/contributions", web::get().to(list_contributions))
            .route("/{id}/contributions", web::put().to(upsert_contribution))
            .route(
                "/{id}/contributions/{program_outcome_id}",
                web::delete().to(delete_contribution),
            ),
    )
    .service(
        web::scope("/api/v1/program-outcomes")
            .route("", web::get().to(list_program_outcomes))
            .route("", web::post().to(create_program_outcome))
            .route("/{id}", web::get().to(get_program_outcome))
            .route("/{id}", web::put().to(update_program_outcome))
            .route("/{id}", web::delete().to(delete_program_outcome)),
    );
}
