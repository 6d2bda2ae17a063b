//! Workbook ingestion: bytes in, a validated [`Roster`] or the first error out.
//!
//! The stages run in a fixed order: sheet lookup, teacher rows, student rows,
//! then the cross-sheet checks. Nothing is returned unless every stage passes.

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto_from_rs};
use log::{debug, info};
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

use crate::model::Roster;
use crate::utils::normalize_string;

mod locator;
mod normalize;
mod validate;

pub use locator::{STUDENT_SHEET_KEYWORDS, TEACHER_SHEET_KEYWORDS, locate_sheets};
pub use normalize::{
    RENEWED_VOCABULARY, STUDENT_COLUMNS, TEACHER_COLUMNS, coerce_identifier, interpret_renewed,
    normalize_class,
};

/// The two logical sheets an upload must contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Teachers,
    Students,
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetKind::Teachers => write!(f, "teachers"),
            SheetKind::Students => write!(f, "students"),
        }
    }
}

/// Canonical record fields a sheet column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Name,
    TeacherName,
    ClassName,
    Renewed,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Id => write!(f, "identifier"),
            Field::Name => write!(f, "name"),
            Field::TeacherName => write!(f, "teacher name"),
            Field::ClassName => write!(f, "class"),
            Field::Renewed => write!(f, "renewed"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("The workbook could not be read: {detail}")]
    UnreadableFile { detail: String },

    #[error("No sheet name contains '{keyword}', so the {sheet} sheet could not be located")]
    MissingSheet { sheet: SheetKind, keyword: String },

    #[error("Row {row} of the {sheet} sheet: required {field} ('{column}') is missing or empty")]
    MissingField {
        sheet: SheetKind,
        row: usize,
        field: Field,
        column: String,
    },

    #[error("Row {row} of the {sheet} sheet: identifier in column '{column}' is not a whole number: \"{value}\"")]
    InvalidIdentifier {
        sheet: SheetKind,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row} of the students sheet: teacher \"{teacher_name}\" is not listed in the teachers sheet")]
    UnknownTeacherReference { row: usize, teacher_name: String },

    #[error("Row {row} of the teachers sheet: teacher id {id} is already used on row {first_row}")]
    DuplicateTeacherId { id: i64, row: usize, first_row: usize },

    #[error("Row {row} of the teachers sheet: teacher name \"{name}\" is already used on row {first_row}")]
    DuplicateTeacherName {
        name: String,
        row: usize,
        first_row: usize,
    },

    #[error("Row {row} of the students sheet: student id {id} is already used on row {first_row}")]
    DuplicateStudentId { id: i64, row: usize, first_row: usize },
}

/// One data row with its 1-based row number, the header row being row 1
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub row_number: usize,
    pub cells: Vec<Data>,
}

static EMPTY_CELL: Data = Data::Empty;

impl SheetRow {
    /// Cell at `column`, or an empty cell when the row is shorter than the header
    pub fn cell(&self, column: usize) -> &Data {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }
}

/// A sheet split into normalized headers and its non-empty data rows
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl SheetTable {
    /// Build a table from a calamine range. The first non-blank row is the header and
    /// counts as row 1, data rows are numbered from there on.
    pub fn from_range(name: &str, range: &Range<Data>) -> Self {
        let mut rows_iter = range
            .rows()
            .enumerate()
            .skip_while(|(_, row)| row.iter().all(is_blank));

        let Some((header_index, header_row)) = rows_iter.next() else {
            return SheetTable {
                name: name.to_string(),
                headers: Vec::new(),
                rows: Vec::new(),
            };
        };
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| normalize_string(&cell.to_string()))
            .collect();

        let rows: Vec<SheetRow> = rows_iter
            // Skip empty rows
            .filter(|(_, row)| !row.iter().all(is_blank))
            .map(|(row_index, row)| SheetRow {
                row_number: row_index - header_index + 1,
                cells: row.to_vec(),
            })
            .collect();

        SheetTable {
            name: name.to_string(),
            headers,
            rows,
        }
    }
}

pub(crate) fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        Data::Error(_) => true,
        _ => false,
    }
}

/// An opened spreadsheet container (xlsx, xlsm, xlsb, xls or ods)
pub struct Workbook {
    sheets: Sheets<Cursor<Vec<u8>>>,
}

impl Workbook {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IngestError> {
        let sheets = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| {
            IngestError::UnreadableFile {
                detail: e.to_string(),
            }
        })?;
        Ok(Workbook { sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    pub fn read_table(&mut self, sheet_name: &str) -> Result<SheetTable, IngestError> {
        let range = self.sheets.worksheet_range(sheet_name).map_err(|e| {
            IngestError::UnreadableFile {
                detail: format!("error reading sheet '{sheet_name}': {e}"),
            }
        })?;
        Ok(SheetTable::from_range(sheet_name, &range))
    }
}

/// Parse and validate a workbook held in memory
pub fn ingest(bytes: &[u8]) -> Result<Roster, IngestError> {
    let mut workbook = Workbook::from_bytes(bytes)?;
    let (teacher_sheet, student_sheet) = locate_sheets(&workbook.sheet_names())?;
    debug!("Teachers sheet: '{teacher_sheet}', students sheet: '{student_sheet}'");

    let teachers = workbook.read_table(&teacher_sheet)?;
    let students = workbook.read_table(&student_sheet)?;
    ingest_sheets(&teachers, &students)
}

/// Read a workbook file and ingest it
pub fn ingest_file(path: impl AsRef<Path>) -> Result<Roster, IngestError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| IngestError::UnreadableFile {
        detail: format!("{}: {e}", path.display()),
    })?;
    ingest(&bytes)
}

/// Normalize both sheets and run the cross-sheet checks
pub fn ingest_sheets(teachers: &SheetTable, students: &SheetTable) -> Result<Roster, IngestError> {
    let teacher_rows = normalize::normalize_teachers(teachers)?;
    let student_rows = normalize::normalize_students(students)?;
    let roster = validate::validate_roster(teacher_rows, student_rows)?;

    info!(
        "Ingested {} teachers and {} students",
        roster.teachers.len(),
        roster.students.len()
    );
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sheet_table;
    use serde_json::json;

    #[test]
    fn test_sheet_table_skips_blank_rows_and_keeps_row_numbers() {
        let mut range: Range<Data> = Range::new((0, 0), (3, 1));
        range.set_value((0, 0), Data::String("Öğretmen ID".to_string()));
        range.set_value((0, 1), Data::String(" Öğretmen\nAdı ".to_string()));
        range.set_value((1, 0), Data::Float(101.0));
        range.set_value((1, 1), Data::String("Ayşe Yılmaz".to_string()));
        range.set_value((2, 1), Data::String("   ".to_string()));
        range.set_value((3, 0), Data::Float(102.0));
        range.set_value((3, 1), Data::String("Mehmet Demir".to_string()));

        let table = SheetTable::from_range("Öğretmenler", &range);

        assert_eq!(table.headers, vec!["Öğretmen ID", "Öğretmen Adı"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].row_number, 2);
        assert_eq!(table.rows[1].row_number, 4);
    }

    #[test]
    fn test_rows_are_numbered_from_the_header() {
        // Header on the third sheet row, below two blank rows
        let mut range: Range<Data> = Range::new((0, 0), (5, 1));
        range.set_value((1, 0), Data::String("  ".to_string()));
        range.set_value((2, 0), Data::String("Öğretmen ID".to_string()));
        range.set_value((2, 1), Data::String("Öğretmen Adı".to_string()));
        range.set_value((3, 0), Data::Float(101.0));
        range.set_value((3, 1), Data::String("Ayşe Yılmaz".to_string()));
        range.set_value((5, 0), Data::Float(102.0));
        range.set_value((5, 1), Data::String("Mehmet Demir".to_string()));

        let table = SheetTable::from_range("Öğretmenler", &range);

        assert_eq!(table.headers, vec!["Öğretmen ID", "Öğretmen Adı"]);
        let numbers: Vec<usize> = table.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_range_that_does_not_start_at_a1() {
        let mut range: Range<Data> = Range::new((4, 2), (5, 3));
        range.set_value((4, 2), Data::String("Öğretmen ID".to_string()));
        range.set_value((4, 3), Data::String("Öğretmen Adı".to_string()));
        range.set_value((5, 2), Data::Float(101.0));
        range.set_value((5, 3), Data::String("Ayşe Yılmaz".to_string()));

        let table = SheetTable::from_range("Öğretmenler", &range);
        assert_eq!(table.rows[0].row_number, 2);
    }

    #[test]
    fn test_blank_sheet_has_no_headers() {
        let range: Range<Data> = Range::new((0, 0), (1, 1));
        let table = SheetTable::from_range("Öğretmenler", &range);
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_sheet_row_cell_out_of_range_is_empty() {
        let row = SheetRow {
            row_number: 2,
            cells: vec![Data::Int(1)],
        };
        assert_eq!(row.cell(0), &Data::Int(1));
        assert_eq!(row.cell(5), &Data::Empty);
    }

    #[test]
    fn test_ingest_sheets_scenario() {
        let teachers = sheet_table(
            "Öğretmenler",
            json!([["Öğretmen ID", "Öğretmen Adı"], [101, "Ayşe Yılmaz"]]),
        );
        let students = sheet_table(
            "Öğrenciler",
            json!([
                ["Öğrenci ID", "Öğrenci Adı", "Sınıf", "Sorumlu Öğretmen", "Kayıt Yeniledi"],
                [1, "Ali", "5-A", "Ayşe Yılmaz", "Evet"]
            ]),
        );

        let roster = ingest_sheets(&teachers, &students).unwrap();
        assert_eq!(roster.teachers.len(), 1);
        assert_eq!(roster.teachers[0].id, 101);
        assert_eq!(roster.students[0].class_name, "5");
        assert_eq!(roster.students[0].teacher_id, 101);
        assert!(roster.students[0].renewed);
    }

    #[test]
    fn test_ingest_rejects_bytes_that_are_not_a_workbook() {
        let result = ingest(b"definitely not a spreadsheet");
        assert!(matches!(result, Err(IngestError::UnreadableFile { .. })));
    }

    #[test]
    fn test_error_messages_cite_row_and_value() {
        let error = IngestError::InvalidIdentifier {
            sheet: SheetKind::Teachers,
            row: 3,
            column: "Öğretmen ID".to_string(),
            value: "abc".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("Row 3"));
        assert!(message.contains("teachers sheet"));
        assert!(message.contains("\"abc\""));
    }
}
