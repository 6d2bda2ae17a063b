use super::{IngestError, SheetKind};
use crate::utils::contains_folded;

/// Keywords searched for in sheet names, the first one is reported when nothing matches
pub const TEACHER_SHEET_KEYWORDS: &[&str] = &["öğretmen", "ogretmen"];
pub const STUDENT_SHEET_KEYWORDS: &[&str] = &["öğrenci", "ogrenci"];

/// Find the teachers and students sheets by case-insensitive substring match on their names.
/// The first matching sheet in workbook order wins.
///
/// Returns `(teachers_sheet_name, students_sheet_name)`.
pub fn locate_sheets(sheet_names: &[String]) -> Result<(String, String), IngestError> {
    let teachers = find_sheet(sheet_names, SheetKind::Teachers)?;
    let students = find_sheet(sheet_names, SheetKind::Students)?;
    Ok((teachers, students))
}

fn find_sheet(sheet_names: &[String], kind: SheetKind) -> Result<String, IngestError> {
    let keywords = match kind {
        SheetKind::Teachers => TEACHER_SHEET_KEYWORDS,
        SheetKind::Students => STUDENT_SHEET_KEYWORDS,
    };

    sheet_names
        .iter()
        .find(|name| {
            keywords
                .iter()
                .any(|keyword| contains_folded(name, keyword))
        })
        .cloned()
        .ok_or_else(|| IngestError::MissingSheet {
            sheet: kind,
            keyword: keywords[0].to_string(),
        })
}
