//! The `Todo` entity, payload validation and record normalization.
//!
//! Incoming payloads are kept as an untyped JSON object ([`TodoInput`]) so
//! that a wrong type is reported as a field-level validation message rather
//! than a deserialization failure. [`validate`] and [`normalize`] are
//! independent passes: callers must validate untrusted input before
//! normalizing or persisting it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::{Timestamp, TodoId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a title in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a description in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Entity name used in not-found errors.
pub const ENTITY_NAME: &str = "Todo";

/// Earliest and latest accepted due-date years.
pub const MIN_DUE_YEAR: i32 = 1;
pub const MAX_DUE_YEAR: i32 = 9999;

pub const FIELD_TITLE: &str = "title";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_PRIORITY: &str = "priority";
pub const FIELD_DUE_DATE: &str = "dueDate";

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Todo priority. Serialized in lowercase.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// All priorities in declaration order.
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Comma-separated list of accepted values, for error messages.
    pub fn options() -> String {
        Self::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(vec![format!(
                    "priority must be one of: {}",
                    Self::options()
                )])
            })
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A persisted todo item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A normalized record that the store has not assigned an id to yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NewTodo {
    /// Attach a store-assigned id.
    pub fn with_id(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Raw create/update payload: `{title, description?, priority?, dueDate?}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TodoInput(Map<String, Value>);

impl TodoInput {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build an input from an arbitrary JSON value.
    ///
    /// Fails when the value is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(CoreError::Validation(vec![
                "request body must be a JSON object".to_string(),
            ])),
        }
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Outcome of [`validate`]: valid when no field errors were collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Convert into a `Result`, carrying all field messages on failure.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.errors))
        }
    }
}

/// Check presence, type and length of every field in a payload.
///
/// An explicit `null` counts as present and fails its field's type check,
/// so `"dueDate": null` is rejected rather than read as the Unix epoch.
pub fn validate(input: &TodoInput) -> ValidationReport {
    let mut errors = Vec::new();

    match input.field(FIELD_TITLE) {
        Some(Value::String(title)) => {
            if title.trim().is_empty() {
                errors.push("title must not be empty".to_string());
            } else if title.chars().count() > MAX_TITLE_LENGTH {
                errors.push(format!(
                    "title must be at most {MAX_TITLE_LENGTH} characters"
                ));
            }
        }
        _ => errors.push("title is required and must be a string".to_string()),
    }

    if let Some(description) = input.field(FIELD_DESCRIPTION) {
        match description {
            Value::String(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => {
                errors.push(format!(
                    "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
                ));
            }
            Value::String(_) => {}
            _ => errors.push("description must be a string".to_string()),
        }
    }

    if let Some(priority) = input.field(FIELD_PRIORITY) {
        let known = priority
            .as_str()
            .is_some_and(|p| p.parse::<Priority>().is_ok());
        if !known {
            errors.push(format!(
                "priority must be one of: {}",
                Priority::options()
            ));
        }
    }

    if let Some(due_date) = input.field(FIELD_DUE_DATE) {
        if parse_due_date(due_date).is_none() {
            errors.push("dueDate must be a valid date".to_string());
        }
    }

    ValidationReport { errors }
}

/// Parse a due date value.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC),
/// plain `YYYY-MM-DD` dates (midnight UTC) and integer milliseconds since
/// the Unix epoch. The result must fall in years 1 through 9999 (UTC), the
/// range that serializes back to a plain RFC 3339 string.
pub fn parse_due_date(value: &Value) -> Option<Timestamp> {
    let parsed = match value {
        Value::String(raw) => parse_date_str(raw.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    parsed.filter(|ts| (MIN_DUE_YEAR..=MAX_DUE_YEAR).contains(&ts.year()))
}

fn parse_date_str(raw: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a path segment into a [`TodoId`].
pub fn parse_todo_id(raw: &str) -> Result<TodoId, CoreError> {
    TodoId::parse_str(raw).map_err(|_| CoreError::InvalidId(format!("'{raw}' is not a valid todo id")))
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Trim strings, apply the default priority, parse the due date and stamp
/// both timestamps with `now`.
///
/// Malformed fields are dropped, so the result is only meaningful for input
/// that passed [`validate`].
pub fn normalize(input: &TodoInput, now: Timestamp) -> NewTodo {
    NewTodo {
        title: input
            .str_field(FIELD_TITLE)
            .map(|t| t.trim().to_string())
            .unwrap_or_default(),
        description: input
            .str_field(FIELD_DESCRIPTION)
            .map(|d| d.trim().to_string()),
        priority: input
            .str_field(FIELD_PRIORITY)
            .and_then(|p| p.parse().ok())
            .unwrap_or_default(),
        due_date: input.field(FIELD_DUE_DATE).and_then(parse_due_date),
        created_at: now,
        updated_at: now,
    }
}

/// Build a fresh record for insertion.
pub fn create_record(input: &TodoInput, now: Timestamp) -> NewTodo {
    NewTodo {
        created_at: now,
        updated_at: now,
        ..normalize(input, now)
    }
}

/// Merge a normalized payload over an existing record.
///
/// `title` and `priority` are always replaced (an absent priority resets to
/// the default); `description` and `dueDate` are replaced only when present.
/// `id` and `created_at` are preserved and `updated_at` never moves backwards.
pub fn update_record(existing: &Todo, input: &TodoInput, now: Timestamp) -> Todo {
    let patch = normalize(input, now);

    Todo {
        id: existing.id,
        title: patch.title,
        description: patch.description.or_else(|| existing.description.clone()),
        priority: patch.priority,
        due_date: patch.due_date.or(existing.due_date),
        created_at: existing.created_at,
        updated_at: now.max(existing.updated_at),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
