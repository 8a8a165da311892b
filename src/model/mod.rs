use std::collections::BTreeMap;
use std::fmt;

use calamine::DataType;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Nested mapping `class name → subject name → subject data`.
///
/// Both levels are ordered so repeated runs over the same tree serialise to
/// identical bytes.
pub type AggregateResult = BTreeMap<String, BTreeMap<String, SubjectData>>;

/// Loosely typed content of a single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank cell, cell outside the used range, or an Excel error value.
    Empty,
    /// Plain text.
    Text(String),
    /// Numeric cell, integer or floating point.
    Number(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Boolean cell.
    Bool(bool),
}

impl CellValue {
    /// Returns true for blank cells and empty strings.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Converts the cell into the JSON value emitted for raw header values.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Empty => serde_json::Value::Null,
            CellValue::Text(value) => serde_json::Value::String(value.clone()),
            CellValue::Number(value) => match as_integer(*value) {
                Some(int) => serde_json::Value::from(int),
                None => serde_json::Number::from_f64(*value)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            },
            CellValue::Date(date) => serde_json::Value::String(iso_date(date)),
            CellValue::Bool(value) => serde_json::Value::Bool(*value),
        }
    }

    /// Renders the cell as text, or `None` when the cell is blank.
    pub fn to_optional_string(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, "None"),
            CellValue::Text(value) => write!(f, "{value}"),
            CellValue::Number(value) => match as_integer(*value) {
                Some(int) => write!(f, "{int}"),
                None => write!(f, "{value}"),
            },
            CellValue::Date(date) => write!(f, "{}", iso_date(date)),
            CellValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&DataType> for CellValue {
    fn from(cell: &DataType) -> Self {
        match cell {
            DataType::Empty | DataType::Error(_) => CellValue::Empty,
            DataType::String(value) => CellValue::Text(value.clone()),
            DataType::Float(value) => CellValue::Number(*value),
            DataType::Int(value) => CellValue::Number(*value as f64),
            DataType::Bool(value) => CellValue::Bool(*value),
            DataType::DateTime(serial) => serial_to_date(*serial)
                .map(CellValue::Date)
                .unwrap_or(CellValue::Number(*serial)),
            DataType::DateTimeIso(value) => value
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::Text(value.clone())),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<Option<&DataType>> for CellValue {
    fn from(cell: Option<&DataType>) -> Self {
        cell.map(CellValue::from).unwrap_or(CellValue::Empty)
    }
}

/// Converts a 1900-system spreadsheet serial into a calendar date.
///
/// Serials below 60 predate the phantom 1900-02-29 and are shifted by a day.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.floor() as u64;
    let epoch = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_days(Days::new(days))
}

/// Formats a date as `YYYY-MM-DD`.
pub fn iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn as_integer(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// One student's result for a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    /// `None` when the student was absent or the mark could not be read.
    pub marks: Option<f64>,
    pub comments: Option<String>,
}

/// One graded assessment, backed by a single worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Worksheet name.
    pub topic_name: String,
    /// ISO date when the header held a calendar date, raw text otherwise.
    pub date: String,
    /// Header value, kept as found.
    pub total_marks: serde_json::Value,
    pub students: Vec<StudentRecord>,
}

/// All topics of one subject, backed by a single workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectData {
    pub subject_name: String,
    pub class_name: String,
    pub topics: Vec<Topic>,
}

impl SubjectData {
    pub fn new(subject_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            subject_name: subject_name.into(),
            class_name: class_name.into(),
            topics: Vec::new(),
        }
    }
}
