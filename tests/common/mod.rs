//! Common test utilities for the renewal-tracker binary crate tests

#![allow(dead_code)]

use renewal_lib::{Roster, Student, Teacher};

pub use renewal_lib::test_utils::{sample_roster, sample_workbook};

/// Roster where every student of the first teacher has renewed
pub fn fully_renewed_teacher_roster() -> Roster {
    let mut roster = sample_roster();
    for student in roster.students.iter_mut().filter(|s| s.teacher_id == 101) {
        student.renewed = true;
    }
    roster
}

pub fn teacher(id: i64, name: &str) -> Teacher {
    Teacher {
        id,
        name: name.to_string(),
    }
}

pub fn student(id: i64, teacher: &Teacher, class_name: &str, renewed: bool) -> Student {
    Student {
        id,
        name: format!("Öğrenci {id}"),
        teacher_id: teacher.id,
        teacher_name: teacher.name.clone(),
        class_name: class_name.to_string(),
        renewed,
    }
}
