#![allow(dead_code)]

use renewal_lib::{IngestError, Roster, ingest};
use serde_json::{Value, json};

// Re-export shared test utilities from src/test_utils.rs
// These are the core functions used by most tests
#[allow(unused_imports)]
pub use renewal_lib::test_utils::{
    build_workbook, sample_roster, sample_student_rows, sample_teacher_rows, sample_workbook,
};

/// Build a workbook with the usual two sheet names around the given rows
#[allow(dead_code)]
pub fn two_sheet_workbook(teacher_rows: Value, student_rows: Value) -> Vec<u8> {
    build_workbook(&[("Öğretmenler", teacher_rows), ("Öğrenciler", student_rows)])
}

/// Ingest two sheets of rows in one go
#[allow(dead_code)]
pub fn ingest_rows(teacher_rows: Value, student_rows: Value) -> Result<Roster, IngestError> {
    ingest(&two_sheet_workbook(teacher_rows, student_rows))
}

/// Teachers sheet with the single teacher "Ayşe Yılmaz" (id 101)
#[allow(dead_code)]
pub fn single_teacher_rows() -> Value {
    json!([["Öğretmen ID", "Öğretmen Adı"], [101, "Ayşe Yılmaz"]])
}

/// Students sheet header with the canonical column names
#[allow(dead_code)]
pub fn student_header() -> Value {
    json!(["Öğrenci ID", "Öğrenci Adı", "Sınıf", "Sorumlu Öğretmen", "Kayıt Yeniledi"])
}
