use tracing::debug;

use crate::model::{AggregateResult, SubjectData};

/// Collects subjects into the `class → subject` mapping written at the end of a run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Aggregator {
    classes: AggregateResult,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a subject under its class and subject names.
    ///
    /// A later subject with the same pair of names replaces the earlier one.
    pub fn insert(&mut self, subject: SubjectData) {
        let class_name = subject.class_name.clone();
        let subject_name = subject.subject_name.clone();
        let class = self.classes.entry(class_name.clone()).or_default();
        if class.insert(subject_name.clone(), subject).is_some() {
            debug!(class = %class_name, subject = %subject_name, "replaced duplicate subject");
        }
    }

    pub fn subject_count(&self) -> usize {
        self.classes.values().map(|subjects| subjects.len()).sum()
    }

    pub fn as_result(&self) -> &AggregateResult {
        &self.classes
    }

    pub fn into_result(self) -> AggregateResult {
        self.classes
    }
}
