//! 成绩批量导入
//!
//! 支持 CSV / XLSX，表头大小写不敏感并接受别名。
//! 单行错误记录后跳过；有效行按块写入，块失败时逐行重试。

use std::collections::{BTreeSet, HashMap};
use std::io::Cursor;
use std::str::FromStr;
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use calamine::{Reader, Xlsx};
use futures_util::StreamExt;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{info, warn};

use super::GradeService;
use crate::config::AppConfig;
use crate::errors::{ObeError, Result};
use crate::models::courses::entities::{Assessment, AssessmentType};
use crate::models::grades::entities::{GradeKey, GradeValues, GradeWrite};
use crate::models::grades::responses::{GradeImportResponse, ImportRowResult};
use crate::models::outcomes::entities::LearningOutcome;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::after_grade_change;
use crate::storage::Storage;
use crate::utils::validate::{validate_mastery, validate_percentage};
use crate::utils::{actor_id, error_response};

const STUDENT_ALIASES: &[&str] = &["student_identifier", "student_username", "username"];
const ASSESSMENT_ALIASES: &[&str] = &["assessment_identifier", "assessment_id", "assessment"];
const LO_ALIASES: &[&str] = &["lo_code", "learning_outcome", "lo"];
const SCORE_ALIASES: &[&str] = &["score_percentage", "score"];
const MASTERY_ALIASES: &[&str] = &["mastery_score", "lo_mastery_score", "mastery"];

/// 导入解析错误
#[derive(Debug)]
enum ImportParseError {
    MissingColumn(String),
    ParseFailed(String),
    EmptyFile,
}

impl ImportParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingColumn(_) => ErrorCode::ImportFileMissingColumn,
            Self::ParseFailed(_) | Self::EmptyFile => ErrorCode::ImportFileParseFailed,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingColumn(col) => format!("Missing required column: {col}"),
            Self::ParseFailed(msg) => msg.clone(),
            Self::EmptyFile => "The file contains no header row".to_string(),
        }
    }
}

/// 文件中的一行原始数据
#[derive(Debug, Clone, Default)]
pub(crate) struct ImportRow {
    pub row_num: usize,
    pub student: String,
    pub assessment: String,
    pub learning_outcome: String,
    pub score: String,
    pub mastery: String,
    // 无法解码的行，导入时直接记为失败
    pub unreadable: Option<String>,
}

impl ImportRow {
    fn unreadable(row_num: usize, reason: String) -> Self {
        Self {
            row_num,
            unreadable: Some(reason),
            ..Default::default()
        }
    }
}

/// 导入参数
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub chunk_size: usize,
    pub max_rows: usize,
}

impl ImportOptions {
    pub fn from_config() -> Self {
        let import = &AppConfig::get().engine.import;
        Self {
            chunk_size: import.chunk_size.max(1),
            max_rows: import.max_rows,
        }
    }
}

/// 导入结果及受影响的学生
pub struct ImportOutcome {
    pub response: GradeImportResponse,
    pub affected_students: Vec<i64>,
}

/// 各列在表头中的位置
struct ColumnMap {
    student: usize,
    assessment: usize,
    learning_outcome: Option<usize>,
    score: usize,
    mastery: usize,
}

impl ColumnMap {
    fn from_headers<I>(headers: I) -> std::result::Result<Self, ImportParseError>
    where
        I: IntoIterator<Item = String>,
    {
        let header_map: HashMap<String, usize> = headers
            .into_iter()
            .enumerate()
            .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_lowercase(), i))
            .collect();

        let find = |aliases: &[&str]| aliases.iter().find_map(|a| header_map.get(*a).copied());
        let require = |aliases: &[&str]| {
            find(aliases).ok_or_else(|| ImportParseError::MissingColumn(aliases[0].to_string()))
        };

        Ok(Self {
            student: require(STUDENT_ALIASES)?,
            assessment: require(ASSESSMENT_ALIASES)?,
            learning_outcome: find(LO_ALIASES),
            score: require(SCORE_ALIASES)?,
            mastery: require(MASTERY_ALIASES)?,
        })
    }

    fn build_row<F>(&self, row_num: usize, cell: F) -> ImportRow
    where
        F: Fn(usize) -> String,
    {
        ImportRow {
            row_num,
            student: cell(self.student),
            assessment: cell(self.assessment),
            learning_outcome: self.learning_outcome.map(&cell).unwrap_or_default(),
            score: cell(self.score),
            mastery: cell(self.mastery),
            unreadable: None,
        }
    }
}

fn parse_csv(data: &[u8]) -> std::result::Result<Vec<ImportRow>, ImportParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(data));

    let headers = rdr
        .headers()
        .map_err(|e| ImportParseError::ParseFailed(format!("Failed to read header row: {e}")))?;
    if headers.is_empty() {
        return Err(ImportParseError::EmptyFile);
    }
    let columns = ColumnMap::from_headers(headers.iter().map(str::to_string))?;

    // 按字节读取，单行编码或格式错误只影响该行
    let mut rows = Vec::new();
    for (index, result) in rdr.byte_records().enumerate() {
        let row_num = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                rows.push(ImportRow::unreadable(row_num, format!("Failed to parse row: {e}")));
                continue;
            }
        };
        // 跳过空行
        if record
            .iter()
            .all(|field| field.iter().all(u8::is_ascii_whitespace))
        {
            continue;
        }
        let fields: std::result::Result<Vec<&str>, _> =
            record.iter().map(std::str::from_utf8).collect();
        match fields {
            Ok(fields) => rows.push(columns.build_row(row_num, |i| {
                fields.get(i).copied().unwrap_or("").trim().to_string()
            })),
            Err(_) => rows.push(ImportRow::unreadable(
                row_num,
                "Row contains invalid UTF-8 text".to_string(),
            )),
        }
    }

    Ok(rows)
}

fn parse_xlsx(data: &[u8]) -> std::result::Result<Vec<ImportRow>, ImportParseError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))
        .map_err(|e| ImportParseError::ParseFailed(format!("Failed to open XLSX: {e}")))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| ImportParseError::ParseFailed("Workbook has no worksheet".to_string()))?;
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| ImportParseError::ParseFailed(format!("Failed to read worksheet: {e}")))?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter.next().ok_or(ImportParseError::EmptyFile)?;
    let columns = ColumnMap::from_headers(header_row.iter().map(|cell| cell.to_string()))?;

    let mut rows = Vec::new();
    for (index, row) in rows_iter.enumerate() {
        let cell = |i: usize| {
            row.get(i)
                .map(|c| c.to_string().trim().to_string())
                .unwrap_or_default()
        };
        if (0..row.len()).all(|i| cell(i).is_empty()) {
            continue;
        }
        rows.push(columns.build_row(index + 2, cell));
    }

    Ok(rows)
}

async fn read_file_from_multipart(
    payload: &mut Multipart,
    max_size: usize,
) -> std::result::Result<(Vec<u8>, String), String> {
    let mut file_bytes = Vec::new();
    let mut file_name = String::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| format!("Failed to read multipart field: {e}"))?;

        if field.name() == Some("file") {
            if let Some(content_disposition) = field.content_disposition() {
                file_name = content_disposition
                    .get_filename()
                    .unwrap_or("upload.csv")
                    .to_string();
            }

            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|e| format!("Failed to read file data: {e}"))?;
                if file_bytes.len() + data.len() > max_size {
                    return Err(format!("File exceeds the {max_size} byte limit"));
                }
                file_bytes.extend_from_slice(&data);
            }
        }
    }

    if file_bytes.is_empty() {
        return Err("Multipart field 'file' is missing or empty".to_string());
    }

    Ok((file_bytes, file_name))
}

/// 课程内的考核与 LO，用于解析导入行
struct CourseCatalog {
    assessments: Vec<Assessment>,
    learning_outcomes: Vec<LearningOutcome>,
}

impl CourseCatalog {
    /// 数字按考核 ID 解析；否则按类型名解析，要求该类型在课程内唯一
    fn resolve_assessment(&self, identifier: &str) -> Result<i64> {
        if let Ok(id) = identifier.parse::<i64>() {
            return self
                .assessments
                .iter()
                .find(|a| a.id == id)
                .map(|a| a.id)
                .ok_or_else(|| ObeError::not_found(format!("Assessment {id} not found in course")));
        }

        let assessment_type = AssessmentType::from_str(identifier).map_err(ObeError::validation)?;
        let matches: Vec<i64> = self
            .assessments
            .iter()
            .filter(|a| a.assessment_type == assessment_type)
            .map(|a| a.id)
            .collect();
        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(ObeError::not_found(format!(
                "No {assessment_type} assessment in course"
            ))),
            _ => Err(ObeError::validation(format!(
                "Course has {} {assessment_type} assessments, use the assessment id",
                matches.len()
            ))),
        }
    }

    fn resolve_learning_outcome(&self, code: &str) -> Result<Option<i64>> {
        if code.is_empty() {
            return Ok(None);
        }
        self.learning_outcomes
            .iter()
            .find(|lo| lo.code == code)
            .or_else(|| {
                self.learning_outcomes
                    .iter()
                    .find(|lo| lo.code.eq_ignore_ascii_case(code))
            })
            .map(|lo| Some(lo.id))
            .ok_or_else(|| ObeError::not_found(format!("Learning outcome {code} not found in course")))
    }
}

fn parse_score(raw: &str) -> Result<Decimal> {
    let score = Decimal::from_str(raw)
        .map_err(|_| ObeError::invalid_numeric(format!("Score '{raw}' is not a number")))?;
    validate_percentage(score).map_err(ObeError::invalid_numeric)?;
    Ok(score)
}

fn parse_mastery(raw: &str) -> Result<i32> {
    // XLSX 中的整数可能以 "4.0" 形式出现
    let mastery = Decimal::from_str(raw)
        .ok()
        .filter(|d| d.fract().is_zero())
        .and_then(|d| d.to_i32())
        .ok_or_else(|| {
            ObeError::invalid_numeric(format!("Mastery score '{raw}' is not an integer"))
        })?;
    validate_mastery(mastery).map_err(ObeError::invalid_numeric)?;
    Ok(mastery)
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    if value.is_empty() {
        Err(ObeError::validation(format!("Column {field} is empty")))
    } else {
        Ok(value)
    }
}

fn row_failure(row: usize, field: &str, err: ObeError) -> ImportRowResult {
    ImportRowResult::failed(row, Some(field), err.to_string())
}

fn row_success(row: usize, write: &GradeWrite) -> ImportRowResult {
    match write {
        GradeWrite::Created(grade) => {
            ImportRowResult::success(row, format!("Grade {} created", grade.id))
        }
        GradeWrite::Updated { after, .. } => {
            ImportRowResult::success(row, format!("Grade {} updated", after.id))
        }
    }
}

/// 校验并写入已解析的行
pub(crate) async fn import_rows(
    storage: &Arc<dyn Storage>,
    course_id: i64,
    rows: Vec<ImportRow>,
    actor: Option<i64>,
    options: ImportOptions,
) -> Result<ImportOutcome> {
    let catalog = CourseCatalog {
        assessments: storage.list_course_assessments(course_id).await?,
        learning_outcomes: storage.list_course_learning_outcomes(course_id).await?,
    };

    let mut results = Vec::with_capacity(rows.len());
    let mut students: HashMap<String, Option<i64>> = HashMap::new();
    let mut valid: Vec<(usize, GradeValues)> = Vec::new();

    for row in rows {
        if let Some(reason) = row.unreadable {
            results.push(ImportRowResult::failed(
                row.row_num,
                None,
                ObeError::validation(reason).to_string(),
            ));
            continue;
        }
        let student = match required(&row.student, "student_identifier") {
            Ok(identifier) => identifier,
            Err(e) => {
                results.push(row_failure(row.row_num, "student_identifier", e));
                continue;
            }
        };
        let student_id = match students.get(student) {
            Some(found) => *found,
            None => {
                let found = storage
                    .get_student_by_identifier(student)
                    .await?
                    .map(|s| s.id);
                students.insert(student.to_string(), found);
                found
            }
        };
        let Some(student_id) = student_id else {
            results.push(row_failure(
                row.row_num,
                "student_identifier",
                ObeError::not_found(format!("Student {student} not found")),
            ));
            continue;
        };

        let assessment_id = match required(&row.assessment, "assessment_identifier")
            .and_then(|identifier| catalog.resolve_assessment(identifier))
        {
            Ok(id) => id,
            Err(e) => {
                results.push(row_failure(row.row_num, "assessment_identifier", e));
                continue;
            }
        };
        let learning_outcome_id = match catalog.resolve_learning_outcome(&row.learning_outcome) {
            Ok(id) => id,
            Err(e) => {
                results.push(row_failure(row.row_num, "lo_code", e));
                continue;
            }
        };
        let score = match required(&row.score, "score_percentage").and_then(parse_score) {
            Ok(score) => score,
            Err(e) => {
                results.push(row_failure(row.row_num, "score_percentage", e));
                continue;
            }
        };
        let mastery = match required(&row.mastery, "mastery_score").and_then(parse_mastery) {
            Ok(mastery) => mastery,
            Err(e) => {
                results.push(row_failure(row.row_num, "mastery_score", e));
                continue;
            }
        };

        valid.push((
            row.row_num,
            GradeValues {
                key: GradeKey {
                    student_id,
                    assessment_id,
                    learning_outcome_id,
                },
                score_percentage: score,
                lo_mastery_score: mastery,
            },
        ));
    }

    let mut affected = BTreeSet::new();
    for chunk in valid.chunks(options.chunk_size.max(1)) {
        let values: Vec<GradeValues> = chunk.iter().map(|(_, v)| v.clone()).collect();
        match storage.upsert_grades(values, actor).await {
            Ok(writes) => {
                for ((row_num, value), write) in chunk.iter().zip(writes.iter()) {
                    affected.insert(value.key.student_id);
                    results.push(row_success(*row_num, write));
                }
            }
            Err(e) => {
                warn!(
                    "Grade import chunk of {} rows failed, retrying row by row: {}",
                    chunk.len(),
                    e
                );
                for (row_num, value) in chunk {
                    match storage.upsert_grades(vec![value.clone()], actor).await {
                        Ok(writes) => {
                            affected.insert(value.key.student_id);
                            for write in &writes {
                                results.push(row_success(*row_num, write));
                            }
                        }
                        Err(e) => results.push(ImportRowResult::failed(*row_num, None, e.to_string())),
                    }
                }
            }
        }
    }

    Ok(ImportOutcome {
        response: GradeImportResponse::from_rows(results),
        affected_students: affected.into_iter().collect(),
    })
}

/// 上传文件导入课程成绩
pub async fn import_grades(
    service: &GradeService,
    course_id: i64,
    mut payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let upload = &AppConfig::get().upload;
    let options = ImportOptions::from_config();

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => return Ok(error_response(&e, ErrorCode::CourseNotFound)),
    }

    let (file_bytes, file_name) = match read_file_from_multipart(&mut payload, upload.max_size).await
    {
        Ok(result) => result,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ImportFileMissing, e)));
        }
    };

    let file_name = file_name.to_lowercase();
    if !upload
        .allowed_types
        .iter()
        .any(|ext| file_name.ends_with(&ext.to_lowercase()))
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileTypeNotAllowed,
            format!("Allowed file types: {}", upload.allowed_types.join(", ")),
        )));
    }

    let parsed = if file_name.ends_with(".xlsx") {
        parse_xlsx(&file_bytes)
    } else {
        parse_csv(&file_bytes)
    };
    let rows = match parsed {
        Ok(rows) => rows,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(e.error_code(), e.message())));
        }
    };

    if rows.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileParseFailed,
            "The file contains no data rows",
        )));
    }
    if rows.len() > options.max_rows {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileTooManyRows,
            format!("At most {} rows can be imported at once", options.max_rows),
        )));
    }

    match import_rows(&storage, course_id, rows, actor_id(request), options).await {
        Ok(outcome) => {
            info!(
                "Grade import for course {}: {} succeeded, {} failed",
                course_id, outcome.response.success, outcome.response.failed
            );
            if !outcome.affected_students.is_empty() {
                after_grade_change(request, storage, outcome.affected_students).await;
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(outcome.response, "Import completed")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::CourseNotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::requests::{GradeAuditListQuery, GradeListQuery};
    use crate::models::grades::responses::ImportRowStatus;
    use crate::storage::sea_orm_storage::test_support;
    use rust_decimal_macros::dec;

    const OPTIONS: ImportOptions = ImportOptions {
        chunk_size: 2,
        max_rows: 100,
    };

    #[test]
    fn test_csv_header_aliases() {
        let data = "\u{feff}Username,Assessment,LO,Score,Mastery\ns1,FINAL,LO1,90,5\n,,,,\ns2,3,,75.5,4\n";
        let rows = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_num, 2);
        assert_eq!(rows[0].student, "s1");
        assert_eq!(rows[0].learning_outcome, "LO1");
        assert_eq!(rows[1].row_num, 4);
        assert_eq!(rows[1].assessment, "3");
        assert_eq!(rows[1].score, "75.5");
    }

    #[test]
    fn test_missing_required_column() {
        let err = parse_csv(b"student_identifier,assessment,score\ns1,FINAL,90\n").unwrap_err();
        assert!(matches!(err, ImportParseError::MissingColumn(col) if col == "mastery_score"));
    }

    #[test]
    fn test_mastery_accepts_spreadsheet_integers() {
        assert_eq!(parse_mastery("4").unwrap(), 4);
        assert_eq!(parse_mastery("4.0").unwrap(), 4);
        assert!(matches!(parse_mastery("4.5"), Err(ObeError::InvalidNumeric(_))));
        assert!(matches!(parse_mastery("6"), Err(ObeError::InvalidNumeric(_))));
        assert!(matches!(parse_score("abc"), Err(ObeError::InvalidNumeric(_))));
    }

    const CSV_WITH_INVALID_UTF8: &[u8] =
        b"student_identifier,assessment,lo_code,score,mastery\ns1,FINAL,LO1,90,5\ns2,FINAL,LO1,\xff\xfe,4\ns3,FINAL,LO1,70,3\n";

    #[test]
    fn test_invalid_utf8_row_does_not_reject_file() {
        let rows = parse_csv(CSV_WITH_INVALID_UTF8).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].unreadable.is_none());
        assert_eq!(rows[1].row_num, 3);
        assert!(rows[1].unreadable.is_some());
        assert_eq!(rows[2].student, "s3");
        assert!(rows[2].unreadable.is_none());
    }

    fn row(row_num: usize, student: &str, assessment: &str, score: &str, mastery: &str) -> ImportRow {
        ImportRow {
            row_num,
            student: student.to_string(),
            assessment: assessment.to_string(),
            learning_outcome: "LO1".to_string(),
            score: score.to_string(),
            mastery: mastery.to_string(),
            unreadable: None,
        }
    }

    #[tokio::test]
    async fn test_bad_rows_are_reported_and_skipped() {
        let seeded = test_support::storage().await;
        let s1 = test_support::student(&seeded, "s1").await;
        let s2 = test_support::student(&seeded, "s2").await;
        let course = test_support::course(&seeded, "CS101", dec!(5)).await;
        let lo = test_support::learning_outcome(&seeded, course.id, "LO1").await;
        let final_exam = test_support::assessment(
            &seeded,
            course.id,
            AssessmentType::Final,
            Some(dec!(60)),
            vec![lo.id],
        )
        .await;
        let storage: Arc<dyn Storage> = Arc::new(seeded);

        let rows = vec![
            row(2, "s1", "final", "90", "5"),
            row(3, "s2", "FINAL", "abc", "4"),
            row(4, "ghost", "FINAL", "80", "4"),
            row(5, "s2", &final_exam.id.to_string(), "70", "3"),
            row(6, "s1", "MIDTERM", "70", "3"),
        ];
        let outcome = import_rows(&storage, course.id, rows, Some(9), OPTIONS)
            .await
            .unwrap();

        let response = outcome.response;
        assert_eq!(response.total, 5);
        assert_eq!(response.success, 2);
        assert_eq!(response.failed, 3);
        assert_eq!(response.rows[1].status, ImportRowStatus::Failed);
        assert_eq!(response.rows[1].field.as_deref(), Some("score_percentage"));
        assert_eq!(response.rows[2].field.as_deref(), Some("student_identifier"));
        assert_eq!(response.rows[4].field.as_deref(), Some("assessment_identifier"));
        assert_eq!(outcome.affected_students, vec![s1.id, s2.id]);

        let grades = storage
            .list_grades_with_pagination(GradeListQuery {
                course_id: Some(course.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(grades.pagination.total, 2);

        let audits = storage
            .list_grade_audits(GradeAuditListQuery::default())
            .await
            .unwrap();
        assert_eq!(audits.pagination.total, 2);
        assert!(audits.items.iter().all(|a| a.changed_by == Some(9)));
    }

    #[tokio::test]
    async fn test_reimport_overwrites_and_ambiguous_type_fails() {
        let seeded = test_support::storage().await;
        test_support::student(&seeded, "s1").await;
        let course = test_support::course(&seeded, "CS101", dec!(5)).await;
        let lo = test_support::learning_outcome(&seeded, course.id, "LO1").await;
        test_support::assessment(&seeded, course.id, AssessmentType::Quiz, Some(dec!(10)), vec![lo.id])
            .await;
        test_support::assessment(&seeded, course.id, AssessmentType::Quiz, Some(dec!(10)), vec![lo.id])
            .await;
        let project = test_support::assessment(
            &seeded,
            course.id,
            AssessmentType::Project,
            Some(dec!(30)),
            vec![lo.id],
        )
        .await;
        let storage: Arc<dyn Storage> = Arc::new(seeded);

        let first = import_rows(
            &storage,
            course.id,
            vec![row(2, "s1", "PROJECT", "60", "3")],
            None,
            OPTIONS,
        )
        .await
        .unwrap();
        assert_eq!(first.response.success, 1);

        let second = import_rows(
            &storage,
            course.id,
            vec![
                row(2, "s1", "PROJECT", "85", "4"),
                row(3, "s1", "QUIZ", "50", "2"),
            ],
            None,
            OPTIONS,
        )
        .await
        .unwrap();
        assert_eq!(second.response.success, 1);
        assert!(second.response.rows[0].message.contains("updated"));
        assert_eq!(second.response.rows[1].status, ImportRowStatus::Failed);

        let grades = storage.list_student_grades(first.affected_students[0], None).await.unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].assessment_id, project.id);
        assert_eq!(grades[0].score_percentage, dec!(85));
    }

    #[tokio::test]
    async fn test_unreadable_csv_row_is_skipped_and_others_written() {
        let seeded = test_support::storage().await;
        let s1 = test_support::student(&seeded, "s1").await;
        test_support::student(&seeded, "s2").await;
        let s3 = test_support::student(&seeded, "s3").await;
        let course = test_support::course(&seeded, "CS101", dec!(5)).await;
        let lo = test_support::learning_outcome(&seeded, course.id, "LO1").await;
        test_support::assessment(&seeded, course.id, AssessmentType::Final, Some(dec!(50)), vec![lo.id])
            .await;
        let storage: Arc<dyn Storage> = Arc::new(seeded);

        let rows = parse_csv(CSV_WITH_INVALID_UTF8).unwrap();
        let outcome = import_rows(&storage, course.id, rows, None, OPTIONS)
            .await
            .unwrap();

        let response = outcome.response;
        assert_eq!(response.total, 3);
        assert_eq!(response.success, 2);
        assert_eq!(response.failed, 1);
        assert_eq!(response.rows[1].row, 3);
        assert_eq!(response.rows[1].status, ImportRowStatus::Failed);
        assert!(response.rows[1].field.is_none());
        assert_eq!(outcome.affected_students, vec![s1.id, s3.id]);
    }
}
