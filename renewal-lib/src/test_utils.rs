// Test utilities available to both unit and integration tests
// Only compiled when testing

use calamine::{Data, Range};
use rust_xlsxwriter::Workbook;
use serde_json::{Value, json};

use crate::ingest::SheetTable;
use crate::model::{Roster, Student, Teacher};

/// Convert a JSON fixture value into the cell calamine would read back from an xlsx file.
/// Numbers become floats because that is how xlsx stores them.
pub fn json_to_cell(value: &Value) -> Data {
    match value {
        Value::Null => Data::Empty,
        Value::Bool(b) => Data::Bool(*b),
        Value::Number(n) => Data::Float(n.as_f64().unwrap_or_default()),
        Value::String(s) => Data::String(s.clone()),
        other => Data::String(other.to_string()),
    }
}

/// Build a [`SheetTable`] from a JSON array of rows, the first row being the headers
pub fn sheet_table(name: &str, rows: Value) -> SheetTable {
    let rows = rows.as_array().cloned().unwrap_or_default();
    let height = rows.len() as u32;
    let width = rows
        .iter()
        .map(|row| row.as_array().map(|cells| cells.len()).unwrap_or(0))
        .max()
        .unwrap_or(0) as u32;

    if height == 0 || width == 0 {
        return SheetTable {
            name: name.to_string(),
            headers: Vec::new(),
            rows: Vec::new(),
        };
    }

    let mut range: Range<Data> = Range::new((0, 0), (height - 1, width - 1));
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.as_array().into_iter().flatten().enumerate() {
            range.set_value((r as u32, c as u32), json_to_cell(cell));
        }
    }
    SheetTable::from_range(name, &range)
}

/// Write an in-memory xlsx workbook. Each sheet is a JSON array of rows; `null` leaves a cell empty.
pub fn build_workbook(sheets: &[(&str, Value)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.as_array().into_iter().flatten().enumerate() {
            for (c, cell) in row.as_array().into_iter().flatten().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Value::Null => {}
                    Value::Bool(b) => {
                        worksheet.write_boolean(r, c, *b).unwrap();
                    }
                    Value::Number(n) => {
                        worksheet
                            .write_number(r, c, n.as_f64().unwrap_or_default())
                            .unwrap();
                    }
                    Value::String(s) => {
                        worksheet.write_string(r, c, s.as_str()).unwrap();
                    }
                    other => {
                        worksheet.write_string(r, c, &other.to_string()).unwrap();
                    }
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

pub fn sample_teacher_rows() -> Value {
    json!([
        ["Öğretmen ID", "Öğretmen Adı"],
        [101, "Ayşe Yılmaz"],
        [102, "Mehmet Demir"],
        [103, "Zeynep Kaya"]
    ])
}

pub fn sample_student_rows() -> Value {
    json!([
        ["Öğrenci ID", "Öğrenci Adı", "Sorumlu Öğretmen", "Sınıf", "Kayıt Yeniledi"],
        [1, "Ali", "Ayşe Yılmaz", "5-A", "Evet"],
        [2, "Elif", "Ayşe Yılmaz", "5-B", "Hayır"],
        [3, "Can", "Mehmet Demir", 6, null],
        [4, "Deniz", "Mehmet Demir", "Hazırlık", "X"]
    ])
}

/// Three teachers (one without students) and four students across classes 5, 6 and unspecified
pub fn sample_workbook() -> Vec<u8> {
    build_workbook(&[
        ("Öğretmenler", sample_teacher_rows()),
        ("Öğrenciler", sample_student_rows()),
    ])
}

/// The roster [`sample_workbook`] ingests to
pub fn sample_roster() -> Roster {
    let teacher = |id: i64, name: &str| Teacher {
        id,
        name: name.to_string(),
    };
    let student = |id: i64, name: &str, teacher_id: i64, teacher_name: &str, class_name: &str, renewed: bool| {
        Student {
            id,
            name: name.to_string(),
            teacher_id,
            teacher_name: teacher_name.to_string(),
            class_name: class_name.to_string(),
            renewed,
        }
    };

    Roster::new(
        vec![
            teacher(101, "Ayşe Yılmaz"),
            teacher(102, "Mehmet Demir"),
            teacher(103, "Zeynep Kaya"),
        ],
        vec![
            student(1, "Ali", 101, "Ayşe Yılmaz", "5", true),
            student(2, "Elif", 101, "Ayşe Yılmaz", "5", false),
            student(3, "Can", 102, "Mehmet Demir", "6", false),
            student(4, "Deniz", 102, "Mehmet Demir", "", true),
        ],
    )
}
