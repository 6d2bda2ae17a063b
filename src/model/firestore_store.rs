// Firestore REST API: https://firestore.googleapis.com/v1/projects/{project}/databases/{database}/documents

use anyhow::{Context, anyhow};
use log::{debug, info};
use renewal_lib::{RenewalStore, Roster, Student, Teacher};
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{Map, Value, json};

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";
pub const TEACHERS_COLLECTION: &str = "teachers";
pub const STUDENTS_COLLECTION: &str = "students";

const PAGE_SIZE: &str = "300";

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    /// Sent as the `key` query parameter
    pub api_key: Option<String>,
    /// Sent as a bearer token
    pub access_token: Option<String>,
}

impl FirestoreConfig {
    pub fn new(project_id: &str) -> Self {
        FirestoreConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            api_key: None,
            access_token: None,
        }
    }

    /// Resource name of the documents root, as used inside request bodies
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    pub fn document_name(&self, collection: &str, id: i64) -> String {
        format!("{}/{collection}/{id}", self.documents_root())
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/{}/{collection}",
            self.base_url.trim_end_matches('/'),
            self.documents_root()
        )
    }

    fn commit_url(&self) -> String {
        format!(
            "{}/{}:commit",
            self.base_url.trim_end_matches('/'),
            self.documents_root()
        )
    }
}

/// Roster kept in the `teachers` and `students` collections of a Firestore database
pub struct FirestoreStore {
    client: Client,
    config: FirestoreConfig,
}

impl FirestoreStore {
    pub fn new(client: Client, config: FirestoreConfig) -> Self {
        FirestoreStore { client, config }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.config.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        };
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Every document of a collection, following `nextPageToken` until the last page
    fn list_documents(&self, collection: &str) -> Result<Vec<Value>, anyhow::Error> {
        let url = self.config.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = self.authorize(request).send()?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text()?;
                return Err(anyhow!(
                    "Failed to list {collection} ({status}): {error_text}"
                ));
            }

            let page: Value = response.json()?;
            if let Some(batch) = page["documents"].as_array() {
                documents.extend(batch.iter().cloned());
            }
            match page["nextPageToken"].as_str() {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!("Listed {} documents from {collection}", documents.len());
        Ok(documents)
    }

    fn commit(&self, writes: Vec<Value>) -> Result<(), anyhow::Error> {
        if writes.is_empty() {
            return Ok(());
        }
        let count = writes.len();
        let response = self
            .authorize(self.client.post(self.config.commit_url()))
            .json(&json!({ "writes": writes }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text()?;
            return Err(anyhow!("Firestore commit failed ({status}): {error_text}"));
        }
        debug!("Committed {count} writes");
        Ok(())
    }

    fn renewed_writes(&self, student_ids: &[i64], renewed: bool) -> Vec<Value> {
        student_ids
            .iter()
            .map(|id| {
                json!({
                    "update": {
                        "name": self.config.document_name(STUDENTS_COLLECTION, *id),
                        "fields": { "renewed": { "booleanValue": renewed } }
                    },
                    "updateMask": { "fieldPaths": ["renewed"] },
                    "currentDocument": { "exists": true }
                })
            })
            .collect()
    }
}

impl RenewalStore for FirestoreStore {
    fn load_all(&self) -> Result<Roster, anyhow::Error> {
        let teachers = self
            .list_documents(TEACHERS_COLLECTION)?
            .iter()
            .map(decode_teacher)
            .collect::<Result<Vec<Teacher>, _>>()?;
        let students = self
            .list_documents(STUDENTS_COLLECTION)?
            .iter()
            .map(|document| decode_student(document, &teachers))
            .collect::<Result<Vec<Student>, _>>()?;

        Ok(Roster::new(teachers, students))
    }

    fn replace_all(&mut self, roster: &Roster) -> Result<(), anyhow::Error> {
        // Both listings must succeed before anything is written
        let mut stale = self.list_documents(TEACHERS_COLLECTION)?;
        stale.extend(self.list_documents(STUDENTS_COLLECTION)?);

        let mut writes: Vec<Value> = stale
            .iter()
            .filter_map(|document| document["name"].as_str())
            .map(|name| json!({ "delete": name }))
            .collect();
        writes.extend(roster.teachers.iter().map(|teacher| {
            json!({
                "update": {
                    "name": self.config.document_name(TEACHERS_COLLECTION, teacher.id),
                    "fields": encode_teacher(teacher)
                }
            })
        }));
        writes.extend(roster.students.iter().map(|student| {
            json!({
                "update": {
                    "name": self.config.document_name(STUDENTS_COLLECTION, student.id),
                    "fields": encode_student(student)
                }
            })
        }));

        self.commit(writes)
            .context("Failed to replace the roster in Firestore")?;
        info!(
            "Replaced Firestore roster with {} teachers and {} students",
            roster.teachers.len(),
            roster.students.len()
        );
        Ok(())
    }

    fn set_renewed(&mut self, student_id: i64, renewed: bool) -> Result<(), anyhow::Error> {
        self.commit(self.renewed_writes(&[student_id], renewed))
            .with_context(|| format!("Failed to update student {student_id}"))
    }

    fn set_renewed_bulk(&mut self, student_ids: &[i64], renewed: bool) -> Result<(), anyhow::Error> {
        self.commit(self.renewed_writes(student_ids, renewed))
            .with_context(|| format!("Failed to update {} students", student_ids.len()))
    }
}

pub fn encode_teacher(teacher: &Teacher) -> Value {
    json!({
        "id": { "integerValue": teacher.id.to_string() },
        "name": { "stringValue": teacher.name },
    })
}

pub fn encode_student(student: &Student) -> Value {
    json!({
        "id": { "integerValue": student.id.to_string() },
        "name": { "stringValue": student.name },
        "teacherId": { "integerValue": student.teacher_id.to_string() },
        "teacherName": { "stringValue": student.teacher_name },
        "className": { "stringValue": student.class_name },
        "renewed": { "booleanValue": student.renewed },
    })
}

pub fn decode_teacher(document: &Value) -> Result<Teacher, anyhow::Error> {
    let fields = document_fields(document)?;
    Ok(Teacher {
        id: integer_field(fields, "id")?,
        name: string_field(fields, "name")?,
    })
}

/// Documents written before `teacherId` existed are resolved through the teacher's name
pub fn decode_student(document: &Value, teachers: &[Teacher]) -> Result<Student, anyhow::Error> {
    let fields = document_fields(document)?;
    let teacher_name = string_field(fields, "teacherName")?;
    let teacher_id = match fields.get("teacherId") {
        Some(_) => integer_field(fields, "teacherId")?,
        None => teachers
            .iter()
            .find(|teacher| teacher.name == teacher_name)
            .map(|teacher| teacher.id)
            .ok_or_else(|| {
                anyhow!(
                    "Document {} refers to unknown teacher \"{teacher_name}\"",
                    document_name(document)
                )
            })?,
    };

    Ok(Student {
        id: integer_field(fields, "id")?,
        name: string_field(fields, "name")?,
        teacher_id,
        teacher_name,
        class_name: fields
            .get("className")
            .and_then(|value| value["stringValue"].as_str())
            .unwrap_or_default()
            .to_string(),
        renewed: fields
            .get("renewed")
            .and_then(|value| value["booleanValue"].as_bool())
            .unwrap_or(false),
    })
}

fn document_name(document: &Value) -> &str {
    document["name"].as_str().unwrap_or("<unnamed>")
}

fn document_fields(document: &Value) -> Result<&Map<String, Value>, anyhow::Error> {
    document["fields"]
        .as_object()
        .ok_or_else(|| anyhow!("Document {} has no fields", document_name(document)))
}

fn integer_field(fields: &Map<String, Value>, key: &str) -> Result<i64, anyhow::Error> {
    let value = fields
        .get(key)
        .ok_or_else(|| anyhow!("Field '{key}' is missing"))?;
    // integerValue is a decimal string on the wire, doubleValue shows up for numbers written by JS clients
    if let Some(text) = value["integerValue"].as_str() {
        return text
            .parse::<i64>()
            .with_context(|| format!("Field '{key}' is not an integer: {text}"));
    }
    match value["doubleValue"].as_f64() {
        Some(f) if f.fract() == 0.0 => Ok(f as i64),
        _ => Err(anyhow!("Field '{key}' is not an integer: {value}")),
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Result<String, anyhow::Error> {
    fields
        .get(key)
        .and_then(|value| value["stringValue"].as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("Field '{key}' is missing or not a string"))
}
