//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

use actix_web::http::StatusCode;

use crate::engine::{AggregationError, WeightError};
use crate::models::ErrorCode;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_obe_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum ObeError {
            $($variant(String),)*
        }

        impl ObeError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(ObeError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(ObeError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(ObeError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl ObeError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        ObeError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_obe_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    FileOperation("E004", "File Operation Error"),
    Validation("E005", "Validation Error"),
    NotFound("E006", "Resource Not Found"),
    Serialization("E007", "Serialization Error"),
    WeightExceeded("E008", "Weight Exceeded"),
    InvalidNumeric("E009", "Invalid Numeric Value"),
    DataIntegrity("E010", "Data Integrity Fault"),
    AuditWriteFailed("E011", "Audit Write Failed"),
    Conflict("E012", "Resource Conflict"),
    CacheConnection("E013", "Cache Connection Error"),
    CachePluginNotFound("E014", "Cache Plugin Not Found"),
}

impl ObeError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl ObeError {
    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            ObeError::Validation(_) | ObeError::InvalidNumeric(_) => StatusCode::BAD_REQUEST,
            ObeError::WeightExceeded(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ObeError::NotFound(_) => StatusCode::NOT_FOUND,
            ObeError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 响应信封中的业务错误码
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ObeError::Validation(_) => ErrorCode::ValidationFailed,
            ObeError::InvalidNumeric(_) => ErrorCode::InvalidNumeric,
            ObeError::WeightExceeded(_) => ErrorCode::WeightExceeded,
            ObeError::NotFound(_) => ErrorCode::NotFound,
            ObeError::Conflict(_) => ErrorCode::Conflict,
            ObeError::DataIntegrity(_) => ErrorCode::DataIntegrity,
            _ => ErrorCode::InternalServerError,
        }
    }
}

impl fmt::Display for ObeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ObeError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for ObeError {
    fn from(err: sea_orm::DbErr) -> Self {
        ObeError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for ObeError {
    fn from(err: std::io::Error) -> Self {
        ObeError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for ObeError {
    fn from(err: serde_json::Error) -> Self {
        ObeError::Serialization(err.to_string())
    }
}

impl From<WeightError> for ObeError {
    fn from(err: WeightError) -> Self {
        ObeError::WeightExceeded(err.to_string())
    }
}

impl From<AggregationError> for ObeError {
    fn from(err: AggregationError) -> Self {
        ObeError::DataIntegrity(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ObeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{WeightErrorKind, WeightScope};
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(ObeError::database_config("test").code(), "E001");
        assert_eq!(ObeError::validation("test").code(), "E005");
        assert_eq!(ObeError::weight_exceeded("test").code(), "E008");
        assert_eq!(ObeError::audit_write_failed("test").code(), "E011");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            ObeError::invalid_numeric("test").error_type(),
            "Invalid Numeric Value"
        );
        assert_eq!(ObeError::not_found("test").error_type(), "Resource Not Found");
    }

    #[test]
    fn test_error_message() {
        let err = ObeError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_format_simple() {
        let err = ObeError::data_integrity("grade 7 references missing assessment 3");
        let formatted = err.format_simple();
        assert!(formatted.contains("Data Integrity Fault"));
        assert!(formatted.contains("assessment 3"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ObeError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ObeError::weight_exceeded("x").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ObeError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ObeError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ObeError::data_integrity("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ObeError::data_integrity("x").error_code(), ErrorCode::DataIntegrity);
    }

    #[test]
    fn test_weight_error_conversion() {
        let err: ObeError = WeightError {
            kind: WeightErrorKind::Exceeded,
            scope: WeightScope::Assessment,
            current_total: dec!(80.00),
            attempted_total: dec!(120.00),
        }
        .into();
        assert_eq!(err.code(), "E008");
        assert!(err.message().contains("120.00"));
        assert!(err.message().contains("80.00"));
    }
}
