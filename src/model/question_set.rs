use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub qid: u32,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Email of the owning teacher.
    #[serde(rename = "t_email")]
    pub teacher_email: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub evaluated: bool,
}

/// What dashboards show for a question set. Teacher answers are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSetSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub question_count: usize,
    pub evaluated: bool,
}

impl From<&QuestionSet> for QuestionSetSummary {
    fn from(set: &QuestionSet) -> Self {
        Self {
            id: set.id.clone(),
            title: set.title.clone(),
            description: set.description.clone(),
            question_count: set.questions.len(),
            evaluated: set.evaluated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestionSet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperQuestion {
    pub qid: u32,
    pub question: String,
}

/// A question set as handed to a student for answering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<PaperQuestion>,
}

impl From<QuestionSet> for Paper {
    fn from(set: QuestionSet) -> Self {
        Self {
            id: set.id,
            title: set.title,
            description: set.description,
            questions: set
                .questions
                .into_iter()
                .map(|q| PaperQuestion {
                    qid: q.qid,
                    question: q.question,
                })
                .collect(),
        }
    }
}
