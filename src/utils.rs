use std::fmt::Write;

use renewal_lib::{Roster, Student};
use renewal_lib::stats::{
    ClassRenewal, ProgressBand, SchoolProgress, TeacherStanding, class_breakdown,
    not_renewed_by_class, school_progress, teacher_leaderboard,
};
use renewal_lib::utils::{filename_timestamp, normalize_string};

pub fn generate_unique_filename(prefix: &str, extension: &str) -> String {
    let timestamp = filename_timestamp();
    let prefix = normalize_string(prefix).replace(' ', "-");
    let filename = format!("{prefix}_{timestamp}.{extension}");
    return filename.to_lowercase();
}

fn band_marker(band: ProgressBand) -> &'static str {
    match band {
        ProgressBand::High => "🟢",
        ProgressBand::Medium => "🟡",
        ProgressBand::Low => "🔴",
    }
}

fn progress_bar(percentage: u8) -> String {
    let filled = usize::from(percentage) / 5;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled))
}

fn class_label(class_name: &str) -> String {
    if class_name.is_empty() {
        "Unspecified".to_string()
    } else {
        format!("Class {class_name}")
    }
}

pub fn render_progress(progress: &SchoolProgress) -> String {
    format!(
        "{} {} {}% renewed ({} of {}, {} remaining)\n",
        band_marker(progress.band()),
        progress_bar(progress.percentage),
        progress.percentage,
        progress.renewed,
        progress.total,
        progress.not_renewed
    )
}

pub fn render_leaderboard(standings: &[TeacherStanding]) -> String {
    let mut out = String::new();
    for (rank, standing) in standings.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} {:<30} {:>3}%  {}/{}",
            rank + 1,
            band_marker(ProgressBand::of(standing.percentage)),
            standing.name,
            standing.percentage,
            standing.renewed_count,
            standing.student_count
        );
    }
    out
}

pub fn render_classes(classes: &[ClassRenewal]) -> String {
    let mut out = String::new();
    for class in classes {
        let _ = writeln!(
            out,
            "{:<14} {:>3}%  renewed {:>4}  not renewed {:>4}",
            class_label(&class.class_name),
            class.percentage(),
            class.renewed,
            class.not_renewed
        );
    }
    out
}

pub fn render_summary(roster: &Roster) -> String {
    let mut out = String::new();
    out.push_str("School progress\n");
    out.push_str(&render_progress(&school_progress(&roster.students)));
    out.push_str("\nTeachers\n");
    out.push_str(&render_leaderboard(&teacher_leaderboard(roster)));
    out.push_str("\nClasses\n");
    out.push_str(&render_classes(&class_breakdown(&roster.students)));
    out
}

pub fn render_students(students: &[&Student]) -> String {
    let mut out = String::new();
    for student in students {
        let mark = if student.renewed { "✅" } else { "❌" };
        let _ = writeln!(
            out,
            "{mark} {:>6}  {:<30} {}",
            student.id,
            student.name,
            class_label(&student.class_name)
        );
    }
    out
}

pub fn render_not_renewed(students: &[Student]) -> String {
    let mut out = String::new();
    for (class_name, members) in not_renewed_by_class(students) {
        let _ = writeln!(out, "{} ({})", class_label(&class_name), members.len());
        for student in members {
            let _ = writeln!(
                out,
                "  {:>6}  {:<30} {}",
                student.id, student.name, student.teacher_name
            );
        }
    }
    out
}
