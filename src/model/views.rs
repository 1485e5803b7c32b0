//! Immutable page payloads. The assemblers build these and the endpoints only serialize them.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{
    answer_set::AnswerSet,
    person::Person,
    question_set::{QuestionSet, QuestionSetSummary},
};

/// Frontend path a student follows to answer a pending set.
pub fn submission_path(qset_id: &str, student_id: &str) -> String {
    format!("/student/submitpaper/{qset_id}?studentId={student_id}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSet {
    #[serde(flatten)]
    pub set: QuestionSetSummary,
    pub submit_path: String,
}

/// The three-way split of a teacher's question sets relative to one student.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buckets {
    pub pending: BTreeMap<String, PendingSet>,
    pub evaluated: BTreeMap<String, QuestionSetSummary>,
    pub not_evaluated: BTreeMap<String, QuestionSetSummary>,
}

impl Buckets {
    /// A set without a submission from the student is pending; a submitted one goes to
    /// `evaluated` or `not_evaluated` according to its flag. Every set lands in exactly one bucket.
    pub fn partition(student_id: &str, sets: &[QuestionSet], answers: &[AnswerSet]) -> Self {
        let submitted = answers
            .iter()
            .filter(|a| a.student_id == student_id)
            .map(|a| a.qset_id.as_str())
            .collect::<HashSet<&str>>();

        let mut buckets = Buckets::default();
        for set in sets {
            let summary = QuestionSetSummary::from(set);
            if !submitted.contains(set.id.as_str()) {
                buckets.pending.insert(
                    set.id.clone(),
                    PendingSet {
                        set: summary,
                        submit_path: submission_path(&set.id, student_id),
                    },
                );
            } else if set.evaluated {
                buckets.evaluated.insert(set.id.clone(), summary);
            } else {
                buckets.not_evaluated.insert(set.id.clone(), summary);
            }
        }
        buckets
    }
}

#[cfg(test)]
impl Buckets {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.evaluated.is_empty() && self.not_evaluated.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentView {
    pub student_id: String,
    /// The teacher whose sets are shown, if the student has linked any.
    pub teacher_email: Option<String>,
    #[serde(flatten)]
    pub buckets: Buckets,
}

impl StudentView {
    pub fn empty(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            teacher_email: None,
            buckets: Buckets::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherView {
    pub teacher: Option<Person>,
    pub question_sets: Vec<QuestionSetSummary>,
}

impl TeacherView {
    pub fn empty() -> Self {
        Self {
            teacher: None,
            question_sets: vec![],
        }
    }
}
