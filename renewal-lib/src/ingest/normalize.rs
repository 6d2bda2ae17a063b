use calamine::Data;

use super::{Field, IngestError, SheetKind, SheetRow, SheetTable, is_blank};
use crate::model::Teacher;
use crate::utils::{fold_case, turkish_lowercase};

/// Header aliases per field for the teachers sheet, in priority order
pub const TEACHER_COLUMNS: &[(Field, &[&str])] = &[
    (
        Field::Id,
        &["Öğretmen ID", "Ogretmen ID", "Teacher ID", "ID", "id"],
    ),
    (
        Field::Name,
        &["Öğretmen Adı", "Ogretmen Adi", "Teacher Name", "Ad Soyad", "Name"],
    ),
];

/// Header aliases per field for the students sheet, in priority order
pub const STUDENT_COLUMNS: &[(Field, &[&str])] = &[
    (
        Field::Id,
        &["Öğrenci ID", "Ogrenci ID", "Student ID", "ID", "id"],
    ),
    (
        Field::Name,
        &["Öğrenci Adı", "Ogrenci Adi", "Student Name", "Ad Soyad", "Name"],
    ),
    (
        Field::TeacherName,
        &[
            "Sorumlu Öğretmen",
            "Sorumlu Ogretmen",
            "Öğretmen Adı",
            "Ogretmen Adi",
            "Öğretmen",
            "Teacher Name",
            "Teacher",
        ],
    ),
    (Field::ClassName, &["Sınıf", "Sinif", "Class"]),
    (
        Field::Renewed,
        &["Kayıt Yeniledi", "Kayit Yeniledi", "Yeniledi", "Renewed"],
    ),
];

/// Cell values that mean "renewed". Anything else, including an empty cell, means not renewed.
pub const RENEWED_VOCABULARY: &[&str] = &[
    "true",
    "evet",
    "yeniledi",
    "1",
    "yes",
    "x",
    "✓",
    "yapıldı",
    "tamamlandı",
    "ok",
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedTeacher {
    pub row_number: usize,
    pub teacher: Teacher,
}

/// A student row before its teacher name is resolved to an id
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedStudent {
    pub row_number: usize,
    pub id: i64,
    pub name: String,
    pub teacher_name: String,
    pub class_name: String,
    pub renewed: bool,
}

/// Candidate column indices per field, resolved once per sheet from its headers
#[derive(Debug, Clone)]
pub(crate) struct ColumnMap {
    sheet: SheetKind,
    headers: Vec<String>,
    columns: Vec<(Field, Vec<usize>)>,
}

impl ColumnMap {
    pub fn resolve(sheet: SheetKind, headers: &[String], aliases: &[(Field, &[&str])]) -> Self {
        let folded_headers: Vec<String> = headers.iter().map(|h| fold_case(h)).collect();

        let columns = aliases
            .iter()
            .map(|(field, names)| {
                let mut indices: Vec<usize> = Vec::new();
                for name in names.iter() {
                    let folded_alias = fold_case(name);
                    // Only the first column carrying a header counts, later duplicates are ignored
                    if let Some(index) = folded_headers.iter().position(|h| *h == folded_alias) {
                        if !indices.contains(&index) {
                            indices.push(index);
                        }
                    }
                }
                (*field, indices)
            })
            .collect();

        ColumnMap {
            sheet,
            headers: headers.to_vec(),
            columns,
        }
    }

    fn candidates(&self, field: Field) -> &[usize] {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, indices)| indices.as_slice())
            .unwrap_or(&[])
    }

    /// First non-blank cell among the field's candidate columns, with its column index
    pub fn lookup<'a>(&self, field: Field, row: &'a SheetRow) -> Option<(usize, &'a Data)> {
        self.candidates(field)
            .iter()
            .map(|&column| (column, row.cell(column)))
            .find(|(_, cell)| !is_blank(cell))
    }

    fn canonical_header(&self, field: Field) -> String {
        let aliases = match self.sheet {
            SheetKind::Teachers => TEACHER_COLUMNS,
            SheetKind::Students => STUDENT_COLUMNS,
        };
        aliases
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, names)| names.first())
            .map(|name| name.to_string())
            .unwrap_or_else(|| field.to_string())
    }

    fn missing(&self, field: Field, row: &SheetRow) -> IngestError {
        IngestError::MissingField {
            sheet: self.sheet,
            row: row.row_number,
            field,
            column: self.canonical_header(field),
        }
    }

    fn required_text(&self, field: Field, row: &SheetRow) -> Result<String, IngestError> {
        let text = self
            .lookup(field, row)
            .map(|(_, cell)| cell_text(cell).trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(self.missing(field, row));
        }
        Ok(text)
    }

    fn required_identifier(&self, row: &SheetRow) -> Result<i64, IngestError> {
        let (column, cell) = self
            .lookup(Field::Id, row)
            .ok_or_else(|| self.missing(Field::Id, row))?;

        coerce_identifier(cell).map_err(|value| IngestError::InvalidIdentifier {
            sheet: self.sheet,
            row: row.row_number,
            column: self.headers[column].clone(),
            value,
        })
    }
}

pub(crate) fn normalize_teachers(table: &SheetTable) -> Result<Vec<NormalizedTeacher>, IngestError> {
    let columns = ColumnMap::resolve(SheetKind::Teachers, &table.headers, TEACHER_COLUMNS);

    table
        .rows
        .iter()
        .map(|row| {
            // Presence of every required field is checked before the identifier is parsed
            if columns.lookup(Field::Id, row).is_none() {
                return Err(columns.missing(Field::Id, row));
            }
            let name = columns.required_text(Field::Name, row)?;
            let id = columns.required_identifier(row)?;

            Ok(NormalizedTeacher {
                row_number: row.row_number,
                teacher: Teacher { id, name },
            })
        })
        .collect()
}

pub(crate) fn normalize_students(table: &SheetTable) -> Result<Vec<NormalizedStudent>, IngestError> {
    let columns = ColumnMap::resolve(SheetKind::Students, &table.headers, STUDENT_COLUMNS);

    table
        .rows
        .iter()
        .map(|row| {
            if columns.lookup(Field::Id, row).is_none() {
                return Err(columns.missing(Field::Id, row));
            }
            let name = columns.required_text(Field::Name, row)?;
            let teacher_name = columns.required_text(Field::TeacherName, row)?;
            let id = columns.required_identifier(row)?;

            let class_name = normalize_class(columns.lookup(Field::ClassName, row).map(|(_, c)| c));
            let renewed = interpret_renewed(columns.lookup(Field::Renewed, row).map(|(_, c)| c));

            Ok(NormalizedStudent {
                row_number: row.row_number,
                id,
                name,
                teacher_name,
                class_name,
                renewed,
            })
        })
        .collect()
}

/// Render a cell the way it reads in the sheet. Whole floats lose their `.0`.
pub(crate) fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if is_whole(*f) {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

fn is_whole(f: f64) -> bool {
    f.is_finite() && f.fract().abs() < f64::EPSILON && f >= i64::MIN as f64 && f <= i64::MAX as f64
}

/// Coerce an identifier cell to an integer. On failure the raw cell text is returned.
pub fn coerce_identifier(cell: &Data) -> Result<i64, String> {
    match cell {
        Data::Int(i) => Ok(*i),
        Data::Float(f) if is_whole(*f) => Ok(*f as i64),
        Data::String(s) => {
            let trimmed = s.trim();
            if let Ok(int_val) = trimmed.parse::<i64>() {
                return Ok(int_val);
            }
            // Try parsing as float and converting to int
            match trimmed.parse::<f64>() {
                Ok(float_val) if is_whole(float_val) => Ok(float_val as i64),
                _ => Err(s.clone()),
            }
        }
        other => Err(cell_text(other)),
    }
}

/// Leading run of decimal digits of the trimmed cell text, or an empty string
pub fn normalize_class(cell: Option<&Data>) -> String {
    let text = cell.map(cell_text).unwrap_or_default();
    text.trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect()
}

/// `true` only when the trimmed cell text, lowercased, is exactly a word of
/// [`RENEWED_VOCABULARY`]. Both the plain and the Turkish lowercase forms are tried,
/// so `TRUE` and `YAPILDI` match while `yapildi` does not.
pub fn interpret_renewed(cell: Option<&Data>) -> bool {
    let Some(cell) = cell else {
        return false;
    };
    let text = cell_text(cell);
    let text = text.trim();
    let spellings = [text.to_lowercase(), turkish_lowercase(text)];

    RENEWED_VOCABULARY
        .iter()
        .any(|token| spellings.iter().any(|spelling| spelling == token))
}
