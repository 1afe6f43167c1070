pub mod assessments;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::models::courses::requests::{
    BatchAssessmentRequest, CourseQueryParams, CreateAssessmentRequest, CreateCourseRequest,
    SetAssessmentOutcomesRequest, UpdateAssessmentRequest, UpdateCourseRequest,
};
use crate::storage::Storage;
use crate::utils::validate::{validate_code, validate_ects, validate_title};

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        match &self.storage {
            Some(storage) => storage.clone(),
            None => super::app_storage(request),
        }
    }

    // 课程
    pub async fn list_courses(
        &self,
        query: CourseQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, query, request).await
    }

    pub async fn create_course(
        &self,
        req: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, req, request).await
    }

    pub async fn get_course(&self, course_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        get::get_course(self, course_id, request).await
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        req: UpdateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_course(self, course_id, req, request).await
    }

    pub async fn delete_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, course_id, request).await
    }

    // 考核
    pub async fn list_assessments(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assessments::list_assessments(self, course_id, request).await
    }

    pub async fn create_assessment(
        &self,
        course_id: i64,
        req: CreateAssessmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assessments::create_assessment(self, course_id, req, request).await
    }

    pub async fn batch_assessments(
        &self,
        course_id: i64,
        req: BatchAssessmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assessments::batch_assessments(self, course_id, req, request).await
    }

    pub async fn get_assessment(
        &self,
        assessment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assessments::get_assessment(self, assessment_id, request).await
    }

    pub async fn update_assessment(
        &self,
        assessment_id: i64,
        req: UpdateAssessmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assessments::update_assessment(self, assessment_id, req, request).await
    }

    pub async fn delete_assessment(
        &self,
        assessment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assessments::delete_assessment(self, assessment_id, request).await
    }

    pub async fn set_assessment_outcomes(
        &self,
        assessment_id: i64,
        req: SetAssessmentOutcomesRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assessments::set_assessment_outcomes(self, assessment_id, req, request).await
    }
}

/// 校验课程字段，未提供的字段跳过
pub(crate) fn check_course_fields(
    code: Option<&str>,
    title: Option<&str>,
    ects_credit: Option<Decimal>,
) -> Result<(), &'static str> {
    if let Some(code) = code {
        validate_code(code)?;
    }
    if let Some(title) = title {
        validate_title(title)?;
    }
    if let Some(ects) = ects_credit {
        validate_ects(ects)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_course_field_checks() {
        assert!(check_course_fields(Some("CS101"), Some("Intro"), Some(dec!(5))).is_ok());
        assert!(check_course_fields(None, None, None).is_ok());
        assert!(check_course_fields(Some("CS 101"), None, None).is_err());
        assert!(check_course_fields(None, Some("  "), None).is_err());
        assert!(check_course_fields(None, None, Some(dec!(-2))).is_err());
    }
}
