use serde::Serialize;

use crate::metrics::TopicSummary;
use crate::model::AggregateResult;

/// One topic result for a single student, with the topic's class figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEntry {
    pub class_name: String,
    pub subject: String,
    pub topic: String,
    pub date: String,
    pub total_marks: serde_json::Value,
    pub marks: Option<f64>,
    pub comments: Option<String>,
    pub percentage: Option<f64>,
    pub rank: Option<u32>,
    pub class_average: f64,
    pub topper_marks: f64,
}

/// Collects every topic result recorded under `name`, oldest first.
pub fn student_history(aggregate: &AggregateResult, name: &str) -> Vec<PerformanceEntry> {
    let mut entries = Vec::new();

    for subjects in aggregate.values() {
        for subject in subjects.values() {
            for topic in &subject.topics {
                let Some(position) = topic.students.iter().position(|s| s.name == name) else {
                    continue;
                };
                let summary = TopicSummary::from_topic(topic);
                let student = &topic.students[position];
                entries.push(PerformanceEntry {
                    class_name: subject.class_name.clone(),
                    subject: subject.subject_name.clone(),
                    topic: topic.topic_name.clone(),
                    date: topic.date.clone(),
                    total_marks: topic.total_marks.clone(),
                    marks: student.marks,
                    comments: student.comments.clone(),
                    percentage: summary.percentages[position],
                    rank: summary.ranks[position],
                    class_average: summary.class_average,
                    topper_marks: summary.topper_marks,
                });
            }
        }
    }

    entries.sort_by(|lhs, rhs| {
        lhs.date
            .cmp(&rhs.date)
            .then_with(|| lhs.subject.cmp(&rhs.subject))
            .then_with(|| lhs.topic.cmp(&rhs.topic))
    });
    entries
}
