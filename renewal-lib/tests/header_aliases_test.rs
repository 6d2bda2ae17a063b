//! Header alias equivalence and fail-fast behavior of whole uploads

use renewal_lib::ingest::{Field, SheetKind};
use renewal_lib::{IngestError, MemoryStore, RenewalStore, import_workbook};
use serde_json::{Value, json};

mod common;

fn teachers_with_header(id_header: &str, name_header: &str) -> Value {
    json!([[id_header, name_header], [101, "Ayşe Yılmaz"], [102, "Mehmet Demir"]])
}

fn students_with_header(header: [&str; 5]) -> Value {
    json!([
        header,
        [1, "Ali", "Ayşe Yılmaz", "5-A", "Evet"],
        [2, "Elif", "Mehmet Demir", "6", "hayır"]
    ])
}

#[test]
fn test_every_alias_spelling_gives_the_same_roster() {
    let canonical = common::ingest_rows(
        teachers_with_header("Öğretmen ID", "Öğretmen Adı"),
        students_with_header([
            "Öğrenci ID",
            "Öğrenci Adı",
            "Sorumlu Öğretmen",
            "Sınıf",
            "Kayıt Yeniledi",
        ]),
    )
    .unwrap();

    let variants = [
        (
            ("Ogretmen ID", "Ogretmen Adi"),
            ["Ogrenci ID", "Ogrenci Adi", "Sorumlu Ogretmen", "Sinif", "Kayit Yeniledi"],
        ),
        (
            ("Teacher ID", "Teacher Name"),
            ["Student ID", "Student Name", "Teacher Name", "Class", "Renewed"],
        ),
        (
            ("ID", "Ad Soyad"),
            ["ID", "Ad Soyad", "Öğretmen", "Sınıf", "Yeniledi"],
        ),
        (("id", "Name"), ["id", "Name", "Teacher", "Class", "Renewed"]),
    ];

    for ((teacher_id, teacher_name), student_header) in variants {
        let roster = common::ingest_rows(
            teachers_with_header(teacher_id, teacher_name),
            students_with_header(student_header),
        )
        .unwrap_or_else(|e| panic!("{teacher_id}/{teacher_name} failed: {e}"));
        assert_eq!(roster, canonical, "variant {student_header:?}");
    }
}

#[test]
fn test_column_order_does_not_matter() {
    let roster = common::ingest_rows(
        json!([["Öğretmen Adı", "Öğretmen ID"], ["Ayşe Yılmaz", 101]]),
        json!([
            ["Kayıt Yeniledi", "Sınıf", "Sorumlu Öğretmen", "Öğrenci Adı", "Öğrenci ID"],
            ["Evet", "7", "Ayşe Yılmaz", "Ali", 1]
        ]),
    )
    .unwrap();
    assert_eq!(roster.students[0].id, 1);
    assert_eq!(roster.students[0].class_name, "7");
    assert!(roster.students[0].renewed);
}

#[test]
fn test_first_non_blank_alias_wins_per_row() {
    // Both "Öğretmen ID" and "ID" are present. Row 3 only fills the second one.
    let roster = common::ingest_rows(
        json!([
            ["Öğretmen ID", "ID", "Öğretmen Adı"],
            [101, 999, "Ayşe Yılmaz"],
            [null, 102, "Mehmet Demir"]
        ]),
        json!([common::student_header()]),
    )
    .unwrap();
    let ids: Vec<i64> = roster.teachers.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![101, 102]);
}

#[test]
fn test_missing_required_column_reports_first_data_row() {
    let result = common::ingest_rows(
        json!([["Öğretmen ID", "Öğretmen Adı"], [101, "Ayşe Yılmaz"]]),
        json!([
            ["Öğrenci ID", "Öğrenci Adı", "Sınıf"],
            [1, "Ali", "5"]
        ]),
    );
    assert!(matches!(
        result,
        Err(IngestError::MissingField {
            sheet: SheetKind::Students,
            row: 2,
            field: Field::TeacherName,
            ..
        })
    ));
}

#[test]
fn test_optional_columns_may_be_absent() {
    let roster = common::ingest_rows(
        common::single_teacher_rows(),
        json!([
            ["Öğrenci ID", "Öğrenci Adı", "Sorumlu Öğretmen"],
            [1, "Ali", "Ayşe Yılmaz"]
        ]),
    )
    .unwrap();
    assert_eq!(roster.students[0].class_name, "");
    assert!(!roster.students[0].renewed);
}

#[test]
fn test_one_bad_row_rejects_the_whole_upload() {
    let mut rows = vec![common::student_header()];
    for id in 1..=99 {
        rows.push(json!([id, format!("Öğrenci {id}"), "5", "Ayşe Yılmaz", "Evet"]));
    }
    rows.push(json!([100, "Öğrenci 100", "5", "Ahmet", "Evet"]));
    let bytes = common::two_sheet_workbook(common::single_teacher_rows(), Value::Array(rows));

    let mut store = MemoryStore::new(common::sample_roster());
    let error = import_workbook(&mut store, &bytes).unwrap_err();

    assert_eq!(
        error.downcast_ref::<IngestError>(),
        Some(&IngestError::UnknownTeacherReference {
            row: 101,
            teacher_name: "Ahmet".to_string(),
        })
    );
    // Nothing from the rejected upload reached the store
    assert_eq!(store.load_all().unwrap(), common::sample_roster());
}

#[test]
fn test_duplicates_are_reported_with_both_rows() {
    let error = common::ingest_rows(
        common::single_teacher_rows(),
        json!([
            common::student_header(),
            [1, "Ali", "5", "Ayşe Yılmaz", "Evet"],
            [2, "Elif", "5", "Ayşe Yılmaz", "Evet"],
            [1, "Can", "6", "Ayşe Yılmaz", "Hayır"]
        ]),
    )
    .unwrap_err();

    assert_eq!(
        error,
        IngestError::DuplicateStudentId {
            id: 1,
            row: 4,
            first_row: 2,
        }
    );
    let message = error.to_string();
    assert!(message.contains("Row 4"), "{message}");
    assert!(message.contains("row 2"), "{message}");
}
