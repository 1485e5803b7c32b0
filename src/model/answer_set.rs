use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet {
    #[serde(default)]
    pub id: String,
    pub qset_id: String,
    pub student_id: String,
    /// Keyed by qid.
    #[serde(default)]
    pub answers: BTreeMap<u32, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionObject {
    pub answers: BTreeMap<u32, String>,
}
