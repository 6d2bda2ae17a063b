use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use super::IngestError;
use super::normalize::{NormalizedStudent, NormalizedTeacher};
use crate::model::{Roster, Student, Teacher};

/// Cross-sheet checks, in order: teacher references, teacher ids, teacher names, student ids.
/// The first violation aborts the whole batch.
pub(crate) fn validate_roster(
    teachers: Vec<NormalizedTeacher>,
    students: Vec<NormalizedStudent>,
) -> Result<Roster, IngestError> {
    let teacher_names: HashSet<&str> = teachers
        .iter()
        .map(|t| t.teacher.name.as_str())
        .collect();

    if let Some(student) = students
        .iter()
        .find(|s| !teacher_names.contains(s.teacher_name.as_str()))
    {
        return Err(IngestError::UnknownTeacherReference {
            row: student.row_number,
            teacher_name: student.teacher_name.clone(),
        });
    }

    if let Some((id, first_row, row)) =
        first_duplicate(teachers.iter().map(|t| (t.teacher.id, t.row_number)))
    {
        return Err(IngestError::DuplicateTeacherId { id, row, first_row });
    }

    if let Some((name, first_row, row)) = first_duplicate(
        teachers
            .iter()
            .map(|t| (t.teacher.name.clone(), t.row_number)),
    ) {
        return Err(IngestError::DuplicateTeacherName {
            name,
            row,
            first_row,
        });
    }

    if let Some((id, first_row, row)) = first_duplicate(students.iter().map(|s| (s.id, s.row_number)))
    {
        return Err(IngestError::DuplicateStudentId { id, row, first_row });
    }

    // Names are unique from here on, so each one resolves to exactly one id
    let teacher_ids: HashMap<String, i64> = teachers
        .iter()
        .map(|t| (t.teacher.name.clone(), t.teacher.id))
        .collect();

    let students: Vec<Student> = students
        .into_iter()
        .map(|s| Student {
            id: s.id,
            teacher_id: teacher_ids[&s.teacher_name],
            name: s.name,
            teacher_name: s.teacher_name,
            class_name: s.class_name,
            renewed: s.renewed,
        })
        .collect();
    let teachers: Vec<Teacher> = teachers.into_iter().map(|t| t.teacher).collect();

    Ok(Roster::new(teachers, students))
}

/// First key seen twice, as `(key, first_row, duplicate_row)`
fn first_duplicate<K: Hash + Eq>(items: impl IntoIterator<Item = (K, usize)>) -> Option<(K, usize, usize)> {
    let mut seen: HashMap<K, usize> = HashMap::new();
    for (key, row) in items {
        if let Some(&first_row) = seen.get(&key) {
            return Some((key, first_row, row));
        }
        seen.insert(key, row);
    }
    None
}
