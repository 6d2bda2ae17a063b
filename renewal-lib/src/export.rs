use anyhow::Result;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

use crate::model::{Roster, Student};
use crate::stats::not_renewed_by_class;

pub const TEACHER_SHEET_NAME: &str = "Öğretmenler";
pub const STUDENT_SHEET_NAME: &str = "Öğrenciler";

/// Headers written on export. Each one is the first alias the importer looks for.
pub const TEACHER_HEADERS: [&str; 2] = ["Öğretmen ID", "Öğretmen Adı"];
pub const STUDENT_HEADERS: [&str; 5] = [
    "Öğrenci ID",
    "Öğrenci Adı",
    "Sorumlu Öğretmen",
    "Sınıf",
    "Kayıt Yeniledi",
];

const RENEWED_TEXT: &str = "Evet";
const NOT_RENEWED_TEXT: &str = "Hayır";

/// Serialize a roster into a two-sheet workbook that the importer accepts unchanged
pub fn roster_to_xlsx(roster: &Roster) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let teachers = workbook.add_worksheet();
    write_headers(teachers, TEACHER_SHEET_NAME, &TEACHER_HEADERS, &header_format)?;
    for (index, teacher) in roster.teachers.iter().enumerate() {
        let row = index as u32 + 1;
        teachers.write_number(row, 0, teacher.id as f64)?;
        teachers.write_string(row, 1, &teacher.name)?;
    }

    let students = workbook.add_worksheet();
    write_headers(students, STUDENT_SHEET_NAME, &STUDENT_HEADERS, &header_format)?;
    for (index, student) in roster.students.iter().enumerate() {
        let row = index as u32 + 1;
        students.write_number(row, 0, student.id as f64)?;
        students.write_string(row, 1, &student.name)?;
        students.write_string(row, 2, &student.teacher_name)?;
        if !student.class_name.is_empty() {
            students.write_string(row, 3, &student.class_name)?;
        }
        let renewed = if student.renewed {
            RENEWED_TEXT
        } else {
            NOT_RENEWED_TEXT
        };
        students.write_string(row, 4, renewed)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Blank upload template: both sheets with headers only
pub fn template_xlsx() -> Result<Vec<u8>> {
    roster_to_xlsx(&Roster::default())
}

fn write_headers(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    headers: &[&str],
    format: &Format,
) -> Result<(), XlsxError> {
    worksheet.set_name(sheet_name)?;
    for (column, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column as u16, *header, format)?;
        worksheet.set_column_width(column as u16, 22.0)?;
    }
    Ok(())
}

/// Write the students who have not renewed to CSV, grouped by class
pub fn write_not_renewed_csv(students: &[Student], csv_path: impl AsRef<Path>) -> Result<usize> {
    // Configure CSV writer to quote fields when necessary (e.g., when they contain commas)
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_path(csv_path)?;

    wtr.write_record(["Öğrenci ID", "Öğrenci Adı", "Sorumlu Öğretmen", "Sınıf"])?;

    let mut written = 0;
    for (_, members) in not_renewed_by_class(students) {
        for student in members {
            let id = student.id.to_string();
            wtr.write_record([
                id.as_str(),
                student.name.as_str(),
                student.teacher_name.as_str(),
                student.class_name.as_str(),
            ])?;
            written += 1;
        }
    }

    wtr.flush()?;
    Ok(written)
}
