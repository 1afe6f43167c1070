pub mod contributions;
pub mod learning_outcomes;
pub mod program_outcomes;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::outcomes::requests::{
    CreateLearningOutcomeRequest, CreateProgramOutcomeRequest, UpdateLearningOutcomeRequest,
    UpdateProgramOutcomeRequest, UpsertContributionRequest,
};
use crate::storage::Storage;
use crate::utils::validate::{validate_code, validate_title};

pub struct OutcomeService {
    storage: Option<Arc<dyn Storage>>,
}

impl OutcomeService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::app_storage(request),
        }
    }

    // 课程学习成果
    pub async fn list_learning_outcomes(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        learning_outcomes::list_learning_outcomes(self, course_id, request).await
    }

    pub async fn create_learning_outcome(
        &self,
        course_id: i64,
        req: CreateLearningOutcomeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        learning_outcomes::create_learning_outcome(self, course_id, req, request).await
    }

    pub async fn get_learning_outcome(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        learning_outcomes::get_learning_outcome(self, id, request).await
    }

    pub async fn update_learning_outcome(
        &self,
        id: i64,
        req: UpdateLearningOutcomeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        learning_outcomes::update_learning_outcome(self, id, req, request).await
    }

    pub async fn delete_learning_outcome(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        learning_outcomes::delete_learning_outcome(self, id, request).await
    }

    // 专业毕业要求
    pub async fn list_program_outcomes(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        program_outcomes::list_program_outcomes(self, request).await
    }

    pub async fn create_program_outcome(
        &self,
        req: CreateProgramOutcomeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        program_outcomes::create_program_outcome(self, req, request).await
    }

    pub async fn get_program_outcome(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        program_outcomes::get_program_outcome(self, id, request).await
    }

    pub async fn update_program_outcome(
        &self,
        id: i64,
        req: UpdateProgramOutcomeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        program_outcomes::update_program_outcome(self, id, req, request).await
    }

    pub async fn delete_program_outcome(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        program_outcomes::delete_program_outcome(self, id, request).await
    }

    // 贡献度
    pub async fn list_contributions(
        &self,
        learning_outcome_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        contributions::list_contributions(self, learning_outcome_id, request).await
    }

    pub async fn upsert_contribution(
        &self,
        learning_outcome_id: i64,
        req: UpsertContributionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        contributions::upsert_contribution(self, learning_outcome_id, req, request).await
    }

    pub async fn delete_contribution(
        &self,
        learning_outcome_id: i64,
        program_outcome_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        contributions::delete_contribution(self, learning_outcome_id, program_outcome_id, request)
            .await
    }
}

/// LO / PO 共用的代码与标题校验
pub(crate) fn check_outcome_fields(
    code: Option<&str>,
    title: Option<&str>,
) -> Result<(), &'static str> {
    if let Some(code) = code {
        validate_code(code)?;
    }
    if let Some(title) = title {
        validate_title(title)?;
    }
    Ok(())
}
