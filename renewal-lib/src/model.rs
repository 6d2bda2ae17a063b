use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    /// Durable join key, resolved from `teacher_name` at ingestion time
    pub teacher_id: i64,
    /// Display name of the responsible teacher as written in the upload
    pub teacher_name: String,
    /// Leading digits of the class cell ("5-A" -> "5"), empty when unspecified
    pub class_name: String,
    pub renewed: bool,
}

/// Teachers and students of one upload, always replaced as a pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub teachers: Vec<Teacher>,
    pub students: Vec<Student>,
}

impl Roster {
    pub fn new(teachers: Vec<Teacher>, students: Vec<Student>) -> Self {
        Roster { teachers, students }
    }

    pub fn is_empty(&self) -> bool {
        self.teachers.is_empty() && self.students.is_empty()
    }

    pub fn teacher(&self, teacher_id: i64) -> Option<&Teacher> {
        self.teachers.iter().find(|teacher| teacher.id == teacher_id)
    }

    /// Look a teacher up by exact name first, then by case-insensitive name
    pub fn teacher_by_name(&self, name: &str) -> Option<&Teacher> {
        let name = name.trim();
        self.teachers
            .iter()
            .find(|teacher| teacher.name == name)
            .or_else(|| {
                let folded = crate::utils::fold_case(name);
                self.teachers
                    .iter()
                    .find(|teacher| crate::utils::fold_case(&teacher.name) == folded)
            })
    }

    pub fn student(&self, student_id: i64) -> Option<&Student> {
        self.students.iter().find(|student| student.id == student_id)
    }

    pub fn student_mut(&mut self, student_id: i64) -> Option<&mut Student> {
        self.students
            .iter_mut()
            .find(|student| student.id == student_id)
    }
}
