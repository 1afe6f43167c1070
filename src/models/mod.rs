pub mod common;
pub mod courses;
pub mod grades;
pub mod outcomes;
pub mod reports;
pub mod students;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery};

/// 响应信封中的业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 请求错误
    BadRequest = 1000,
    ValidationFailed = 1001,
    InvalidNumeric = 1002,
    WeightExceeded = 1003,
    PayloadTooLarge = 1004,

    // 资源不存在
    NotFound = 2000,
    CourseNotFound = 2001,
    AssessmentNotFound = 2002,
    LearningOutcomeNotFound = 2003,
    ProgramOutcomeNotFound = 2004,
    ContributionNotFound = 2005,
    StudentNotFound = 2006,
    GradeNotFound = 2007,

    // 冲突
    Conflict = 3000,
    CourseAlreadyExists = 3001,
    GradeAlreadyExists = 3002,

    // 导入
    ImportFileMissing = 4000,
    ImportFileParseFailed = 4001,
    ImportFileMissingColumn = 4002,
    ImportFileTooManyRows = 4003,
    FileTypeNotAllowed = 4004,
    FileSizeExceeded = 4005,

    // 服务端错误
    InternalServerError = 5000,
    DataIntegrity = 5001,
}
