use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

use super::{RenewalStore, apply_renewed};
use crate::model::Roster;

/// JSON Schema every snapshot file must satisfy before it is deserialized
pub fn snapshot_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "teachers": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "name": { "type": "string", "minLength": 1 }
                    },
                    "required": ["id", "name"]
                }
            },
            "students": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "name": { "type": "string", "minLength": 1 },
                        "teacherId": { "type": "integer" },
                        "teacherName": { "type": "string", "minLength": 1 },
                        "className": { "type": "string" },
                        "renewed": { "type": "boolean" }
                    },
                    "required": ["id", "name", "teacherId", "teacherName", "className", "renewed"]
                }
            }
        },
        "required": ["teachers", "students"]
    })
}

/// Roster snapshot in a single JSON file: `{ "teachers": [...], "students": [...] }`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn validate_snapshot(&self, snapshot: &Value) -> Result<()> {
        let validator = jsonschema::validator_for(&snapshot_schema())
            .map_err(|e| anyhow!("Invalid snapshot schema: {}", e))?;

        let problems: Vec<String> = validator
            .iter_errors(snapshot)
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    format!("  - {}", error)
                } else {
                    format!("  - {}: {}", path, error)
                }
            })
            .collect();

        if problems.is_empty() {
            return Ok(());
        }
        Err(anyhow!(
            "Data file {} is corrupt:\n{}",
            self.path.display(),
            problems.join("\n")
        ))
    }

    fn write_snapshot(&self, roster: &Roster) -> Result<()> {
        let content = serde_json::to_string_pretty(roster)?;

        // Write next to the target and rename, so a crash never leaves half a file behind
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write data file {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace data file {}", self.path.display()))?;

        debug!(
            "Saved {} teachers and {} students to {}",
            roster.teachers.len(),
            roster.students.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl RenewalStore for JsonFileStore {
    fn load_all(&self) -> Result<Roster> {
        let path = &self.path;
        debug!("Loading roster from {}", path.display());

        if !path.exists() {
            info!("Data file {} does not exist yet, starting empty", path.display());
            return Ok(Roster::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file {}", path.display()))?;
        let snapshot: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file {}", path.display()))?;
        self.validate_snapshot(&snapshot)?;

        let roster: Roster = serde_json::from_value(snapshot)
            .with_context(|| format!("Failed to decode data file {}", path.display()))?;
        Ok(roster)
    }

    fn replace_all(&mut self, roster: &Roster) -> Result<()> {
        self.write_snapshot(roster)
    }

    fn set_renewed(&mut self, student_id: i64, renewed: bool) -> Result<()> {
        self.set_renewed_bulk(&[student_id], renewed)
    }

    fn set_renewed_bulk(&mut self, student_ids: &[i64], renewed: bool) -> Result<()> {
        let mut roster = self.load_all()?;
        apply_renewed(&mut roster, student_ids, renewed)?;
        self.write_snapshot(&roster)
    }
}
