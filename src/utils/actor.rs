use actix_web::HttpRequest;

/// 外部系统通过该请求头传入操作人
pub const ACTOR_HEADER: &str = "X-Actor-Id";

/// 读取操作人 ID，缺失或无法解析时为空
pub fn actor_id(req: &HttpRequest) -> Option<i64> {
    req.headers()
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_actor_header() {
        let req = TestRequest::default()
            .insert_header((ACTOR_HEADER, "42"))
            .to_http_request();
        assert_eq!(actor_id(&req), Some(42));

        let req = TestRequest::default()
            .insert_header((ACTOR_HEADER, "abc"))
            .to_http_request();
        assert_eq!(actor_id(&req), None);

        assert_eq!(actor_id(&TestRequest::default().to_http_request()), None);
    }
}
