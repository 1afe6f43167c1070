use actix_web::{HttpResponse, Result as ActixResult};

use crate::engine::score_to_gpa;
use crate::models::reports::requests::GpaQuery;
use crate::models::reports::responses::GpaResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::validate_percentage;

pub async fn get_gpa(query: GpaQuery) -> ActixResult<HttpResponse> {
    if let Err(msg) = validate_percentage(query.score) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::InvalidNumeric,
            msg,
        )));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        GpaResponse {
            score: query.score,
            gpa: score_to_gpa(query.score),
        },
        "GPA computed successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use rust_decimal_macros::dec;

    #[actix_web::test]
    async fn test_gpa_endpoint() {
        let resp = get_gpa(GpaQuery { score: dec!(78) }).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["gpa"], "2.90");
    }

    #[actix_web::test]
    async fn test_out_of_range_score_is_rejected() {
        let resp = get_gpa(GpaQuery { score: dec!(101) }).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
