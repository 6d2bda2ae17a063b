//! Persistence of the roster between runs.
//!
//! The importer never writes anything itself. [`import_workbook`] only hands a roster
//! to the store once ingestion has fully succeeded, so a rejected upload leaves the
//! previously stored data as it was.

use anyhow::{Result, anyhow};
use log::info;

use crate::ingest::ingest;
use crate::model::Roster;

mod json_file;

pub use json_file::{JsonFileStore, snapshot_schema};

pub trait RenewalStore {
    /// Current teachers and students, empty when nothing has been stored yet
    fn load_all(&self) -> Result<Roster>;

    /// Drop everything stored and keep `roster` instead
    fn replace_all(&mut self, roster: &Roster) -> Result<()>;

    /// Fails when `student_id` is not stored
    fn set_renewed(&mut self, student_id: i64, renewed: bool) -> Result<()>;

    /// Fails without changing anything when any id is not stored
    fn set_renewed_bulk(&mut self, student_ids: &[i64], renewed: bool) -> Result<()>;
}

/// Roster kept in memory only
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    roster: Roster,
}

impl MemoryStore {
    pub fn new(roster: Roster) -> Self {
        MemoryStore { roster }
    }
}

impl RenewalStore for MemoryStore {
    fn load_all(&self) -> Result<Roster> {
        Ok(self.roster.clone())
    }

    fn replace_all(&mut self, roster: &Roster) -> Result<()> {
        self.roster = roster.clone();
        Ok(())
    }

    fn set_renewed(&mut self, student_id: i64, renewed: bool) -> Result<()> {
        apply_renewed(&mut self.roster, &[student_id], renewed)
    }

    fn set_renewed_bulk(&mut self, student_ids: &[i64], renewed: bool) -> Result<()> {
        apply_renewed(&mut self.roster, student_ids, renewed)
    }
}

/// Set the renewed flag of every listed student, or of none if one id is unknown
pub(crate) fn apply_renewed(roster: &mut Roster, student_ids: &[i64], renewed: bool) -> Result<()> {
    let missing: Vec<String> = student_ids
        .iter()
        .filter(|id| roster.student(**id).is_none())
        .map(|id| id.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!("Unknown student id(s): {}", missing.join(", ")));
    }

    for student in roster
        .students
        .iter_mut()
        .filter(|student| student_ids.contains(&student.id))
    {
        student.renewed = renewed;
    }
    Ok(())
}

/// Ingest a workbook and, only if that succeeds, replace the stored roster with it
pub fn import_workbook<S: RenewalStore + ?Sized>(store: &mut S, bytes: &[u8]) -> Result<Roster> {
    let roster = ingest(bytes)?;
    store.replace_all(&roster)?;
    info!(
        "Stored {} teachers and {} students",
        roster.teachers.len(),
        roster.students.len()
    );
    Ok(roster)
}

/// Flip one student's renewed flag and return the new value
pub fn toggle_renewed<S: RenewalStore + ?Sized>(store: &mut S, student_id: i64) -> Result<bool> {
    let roster = store.load_all()?;
    let student = roster
        .student(student_id)
        .ok_or_else(|| anyhow!("Unknown student id(s): {student_id}"))?;
    let renewed = !student.renewed;
    store.set_renewed(student_id, renewed)?;
    Ok(renewed)
}
