//! Per-topic analytics derived from the extracted marks.
//!
//! None of these values are written to the extract document; they back the
//! per-student report.

use serde::Serialize;

use crate::model::{StudentRecord, Topic};

/// Percentage of `total` scored, rounded to one decimal place.
///
/// Absent students and topics without a positive total have no percentage.
pub fn percentage(marks: Option<f64>, total: Option<f64>) -> Option<f64> {
    let marks = marks?;
    let total = total.filter(|total| *total > 0.0)?;
    Some(round_one_decimal(marks / total * 100.0))
}

/// Competition ranks (1, 2, 2, 4) by marks, highest first, in input order.
pub fn ranks(students: &[StudentRecord]) -> Vec<Option<u32>> {
    let mut present: Vec<f64> = students.iter().filter_map(|s| s.marks).collect();
    present.sort_by(|lhs, rhs| rhs.total_cmp(lhs));

    students
        .iter()
        .map(|student| {
            let marks = student.marks?;
            let above = present.iter().take_while(|other| **other > marks).count();
            Some(above as u32 + 1)
        })
        .collect()
}

/// Mean of the marks of students who sat, rounded to one decimal place.
pub fn class_average(students: &[StudentRecord]) -> f64 {
    let present: Vec<f64> = students.iter().filter_map(|s| s.marks).collect();
    if present.is_empty() {
        return 0.0;
    }
    round_one_decimal(present.iter().sum::<f64>() / present.len() as f64)
}

/// Highest mark in the topic, 0 when nobody sat.
pub fn topper_marks(students: &[StudentRecord]) -> f64 {
    students
        .iter()
        .filter_map(|s| s.marks)
        .reduce(f64::max)
        .unwrap_or(0.0)
}

/// Reads a topic's total marks as a number, accepting numeric text.
pub fn total_marks(topic: &Topic) -> Option<f64> {
    match &topic.total_marks {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Derived figures for one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub class_average: f64,
    pub topper_marks: f64,
    /// Parallel to the topic's students.
    pub percentages: Vec<Option<f64>>,
    /// Parallel to the topic's students.
    pub ranks: Vec<Option<u32>>,
}

impl TopicSummary {
    pub fn from_topic(topic: &Topic) -> Self {
        let total = total_marks(topic);
        Self {
            class_average: class_average(&topic.students),
            topper_marks: topper_marks(&topic.students),
            percentages: topic
                .students
                .iter()
                .map(|student| percentage(student.marks, total))
                .collect(),
            ranks: ranks(&topic.students),
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
