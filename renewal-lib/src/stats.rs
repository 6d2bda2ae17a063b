//! Renewal statistics over a roster: school progress, teacher leaderboard and class breakdown.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{Roster, Student};
use crate::utils::fold_case;

/// Rounded share of renewed students, `0` for an empty group
pub fn renewal_percentage(renewed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percentage = (renewed as f64 * 100.0 / total as f64).round();
    percentage.clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressBand {
    Low,
    Medium,
    High,
}

impl ProgressBand {
    pub fn of(percentage: u8) -> Self {
        match percentage {
            67.. => ProgressBand::High,
            34..=66 => ProgressBand::Medium,
            _ => ProgressBand::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolProgress {
    pub total: usize,
    pub renewed: usize,
    pub not_renewed: usize,
    pub percentage: u8,
}

impl SchoolProgress {
    pub fn band(&self) -> ProgressBand {
        ProgressBand::of(self.percentage)
    }
}

pub fn school_progress(students: &[Student]) -> SchoolProgress {
    let total = students.len();
    let renewed = students.iter().filter(|s| s.renewed).count();
    SchoolProgress {
        total,
        renewed,
        not_renewed: total - renewed,
        percentage: renewal_percentage(renewed, total),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherStanding {
    pub teacher_id: i64,
    pub name: String,
    pub student_count: usize,
    pub renewed_count: usize,
    pub percentage: u8,
}

/// Every teacher with their renewal share, best first. Ties keep teacher sheet order.
pub fn teacher_leaderboard(roster: &Roster) -> Vec<TeacherStanding> {
    let mut counts: HashMap<i64, (usize, usize)> = HashMap::new();
    for student in &roster.students {
        let entry = counts.entry(student.teacher_id).or_default();
        entry.0 += 1;
        if student.renewed {
            entry.1 += 1;
        }
    }

    let mut standings: Vec<TeacherStanding> = roster
        .teachers
        .iter()
        .map(|teacher| {
            let (student_count, renewed_count) =
                counts.get(&teacher.id).copied().unwrap_or_default();
            TeacherStanding {
                teacher_id: teacher.id,
                name: teacher.name.clone(),
                student_count,
                renewed_count,
                percentage: renewal_percentage(renewed_count, student_count),
            }
        })
        .collect();

    // sort_by is stable
    standings.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    standings
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassRenewal {
    /// Normalized class, empty for students without one
    pub class_name: String,
    pub renewed: usize,
    pub not_renewed: usize,
}

impl ClassRenewal {
    pub fn total(&self) -> usize {
        self.renewed + self.not_renewed
    }

    pub fn percentage(&self) -> u8 {
        renewal_percentage(self.renewed, self.total())
    }
}

/// Class ordering: numeric classes ascending, other names alphabetically, unspecified last
pub fn compare_classes(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

pub fn class_breakdown(students: &[Student]) -> Vec<ClassRenewal> {
    let mut by_class: HashMap<&str, ClassRenewal> = HashMap::new();
    for student in students {
        let entry = by_class
            .entry(student.class_name.as_str())
            .or_insert_with(|| ClassRenewal {
                class_name: student.class_name.clone(),
                renewed: 0,
                not_renewed: 0,
            });
        if student.renewed {
            entry.renewed += 1;
        } else {
            entry.not_renewed += 1;
        }
    }

    let mut breakdown: Vec<ClassRenewal> = by_class.into_values().collect();
    breakdown.sort_by(|a, b| compare_classes(&a.class_name, &b.class_name));
    breakdown
}

/// Students who have not renewed, grouped by class in class order
pub fn not_renewed_by_class(students: &[Student]) -> Vec<(String, Vec<&Student>)> {
    let mut groups: Vec<(String, Vec<&Student>)> = Vec::new();
    for student in students.iter().filter(|s| !s.renewed) {
        match groups
            .iter_mut()
            .find(|(class_name, _)| *class_name == student.class_name)
        {
            Some((_, members)) => members.push(student),
            None => groups.push((student.class_name.clone(), vec![student])),
        }
    }
    groups.sort_by(|(a, _), (b, _)| compare_classes(a, b));
    groups
}

/// A teacher's students, optionally narrowed by a case-insensitive name search
pub fn teacher_students<'a>(
    roster: &'a Roster,
    teacher_id: i64,
    search: Option<&str>,
) -> Vec<&'a Student> {
    let needle = search
        .map(|s| fold_case(s.trim()))
        .filter(|s| !s.is_empty());

    roster
        .students
        .iter()
        .filter(|student| student.teacher_id == teacher_id)
        .filter(|student| match &needle {
            Some(needle) => fold_case(&student.name).contains(needle.as_str()),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Teacher;

    fn student(id: i64, teacher_id: i64, class_name: &str, renewed: bool) -> Student {
        Student {
            id,
            name: format!("Öğrenci {id}"),
            teacher_id,
            teacher_name: format!("Teacher {teacher_id}"),
            class_name: class_name.to_string(),
            renewed,
        }
    }

    #[test]
    fn test_renewal_percentage_rounding() {
        assert_eq!(renewal_percentage(0, 0), 0);
        assert_eq!(renewal_percentage(1, 3), 33);
        assert_eq!(renewal_percentage(2, 3), 67);
        assert_eq!(renewal_percentage(1, 8), 13);
        assert_eq!(renewal_percentage(5, 5), 100);
    }

    #[test]
    fn test_progress_band_thresholds() {
        assert_eq!(ProgressBand::of(0), ProgressBand::Low);
        assert_eq!(ProgressBand::of(33), ProgressBand::Low);
        assert_eq!(ProgressBand::of(34), ProgressBand::Medium);
        assert_eq!(ProgressBand::of(66), ProgressBand::Medium);
        assert_eq!(ProgressBand::of(67), ProgressBand::High);
        assert_eq!(ProgressBand::of(100), ProgressBand::High);
    }

    #[test]
    fn test_compare_classes() {
        let mut classes = vec!["", "10", "9", "Hazırlık", "5"];
        classes.sort_by(|a, b| compare_classes(a, b));
        assert_eq!(classes, vec!["5", "9", "10", "Hazırlık", ""]);
    }

    #[test]
    fn test_teacher_students_search() {
        let roster = Roster::new(
            vec![Teacher {
                id: 1,
                name: "Ayşe".to_string(),
            }],
            vec![student(1, 1, "5", true), student(2, 1, "5", false), student(3, 2, "6", false)],
        );
        assert_eq!(teacher_students(&roster, 1, None).len(), 2);
        let found = teacher_students(&roster, 1, Some("  ÖĞRENCİ 2 "));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
        assert_eq!(teacher_students(&roster, 1, Some("")).len(), 2);
    }
}
