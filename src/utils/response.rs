use actix_web::{HttpResponse, HttpResponseBuilder};
use tracing::error;

use crate::errors::ObeError;
use crate::models::{ApiResponse, ErrorCode};

/// 把存储 / 引擎错误转换为统一响应；not_found 指定资源不存在时使用的错误码
pub fn error_response(err: &ObeError, not_found: ErrorCode) -> HttpResponse {
    let code = match err {
        ObeError::NotFound(_) => not_found,
        _ => err.error_code(),
    };
    if err.status_code().is_server_error() {
        error!("{}", err);
    }
    HttpResponseBuilder::new(err.status_code()).json(ApiResponse::error_empty(code, err.message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_status_follows_error_kind() {
        let resp = error_response(&ObeError::not_found("course 3"), ErrorCode::CourseNotFound);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = error_response(&ObeError::weight_exceeded("too much"), ErrorCode::NotFound);
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = error_response(&ObeError::database_operation("boom"), ErrorCode::NotFound);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
