//! BigQuery REST wire types.
//!
//! Covers the subset of `jobs.query` / `jobs.getQueryResults` responses the
//! client reads, plus decoding of the `{"f": [{"v": ...}]}` row encoding into
//! JSON objects keyed by column name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::Row;

/// Identifies a query job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl JobReference {
    pub fn new(project_id: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            job_id: job_id.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Response body shared by `jobs.query` and `jobs.getQueryResults`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub schema: Option<TableSchema>,
    #[serde(default)]
    pub job_reference: Option<JobReference>,
    /// int64 values arrive as strings.
    #[serde(default)]
    pub total_rows: Option<String>,
    #[serde(default)]
    pub page_token: Option<String>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
    #[serde(default)]
    pub job_complete: Option<bool>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

impl QueryResponse {
    /// A missing `jobComplete` means the results are ready.
    pub fn is_complete(&self) -> bool {
        self.job_complete.unwrap_or(true)
    }

    /// Decodes the page's rows against its schema.
    pub fn decode_rows(&self) -> Vec<Row> {
        match &self.schema {
            Some(schema) => self
                .rows
                .iter()
                .map(|row| decode_record(&schema.fields, &row.f))
                .collect(),
            None => self
                .rows
                .iter()
                .map(|row| Value::Array(row.f.iter().map(|cell| cell.v.clone()).collect()))
                .collect(),
        }
    }

    /// Joins the messages of any job errors, if there are some.
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let messages: Vec<&str> = self
            .errors
            .iter()
            .map(|e| e.message.as_deref().unwrap_or("unknown error"))
            .collect();
        Some(messages.join("; "))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableFieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub mode: Option<String>,
    /// Sub-fields of a RECORD column.
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

impl TableFieldSchema {
    fn is_repeated(&self) -> bool {
        self.mode
            .as_deref()
            .is_some_and(|mode| mode.eq_ignore_ascii_case("REPEATED"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub f: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub v: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorProto {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<u16>,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

fn decode_record(fields: &[TableFieldSchema], cells: &[TableCell]) -> Value {
    let mut object = Map::with_capacity(fields.len());
    for (field, cell) in fields.iter().zip(cells) {
        object.insert(field.name.clone(), decode_field(field, &cell.v));
    }
    Value::Object(object)
}

fn decode_field(field: &TableFieldSchema, raw: &Value) -> Value {
    if raw.is_null() {
        return Value::Null;
    }

    if field.is_repeated() {
        let items = match raw {
            Value::Array(items) => items,
            _ => return raw.clone(),
        };
        return Value::Array(
            items
                .iter()
                .map(|item| decode_scalar(field, item.get("v").unwrap_or(&Value::Null)))
                .collect(),
        );
    }

    decode_scalar(field, raw)
}

fn decode_scalar(field: &TableFieldSchema, raw: &Value) -> Value {
    if raw.is_null() {
        return Value::Null;
    }

    match field.field_type.to_ascii_uppercase().as_str() {
        "RECORD" | "STRUCT" => {
            let cells: Vec<TableCell> = raw
                .get("f")
                .and_then(|f| serde_json::from_value(f.clone()).ok())
                .unwrap_or_default();
            decode_record(&field.fields, &cells)
        }
        "INTEGER" | "INT64" => raw
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| raw.clone()),
        "FLOAT" | "FLOAT64" => raw
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| raw.clone()),
        "BOOLEAN" | "BOOL" => match raw.as_str() {
            Some("true") => Value::Bool(true),
            Some("false") => Value::Bool(false),
            _ => raw.clone(),
        },
        _ => raw.clone(),
    }
}
