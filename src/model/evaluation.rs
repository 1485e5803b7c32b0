use serde::{Deserialize, Serialize};

use crate::model::{answer_set::AnswerSet, question_set::QuestionSet};

/// One question as the scoring service expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationItem {
    pub qid: u32,
    pub question: String,
    pub teacher_answer: String,
    pub student_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub question_set: Vec<EvaluationItem>,
}

impl EvaluationRequest {
    /// Pairs every question with the student's answer, in question order.
    /// Unanswered questions are sent with an empty answer.
    pub fn package(set: &QuestionSet, answers: &AnswerSet) -> Self {
        let question_set = set
            .questions
            .iter()
            .map(|q| EvaluationItem {
                qid: q.qid,
                question: q.question.clone(),
                teacher_answer: q.answer.clone(),
                student_answer: answers.answers.get(&q.qid).cloned().unwrap_or_default(),
            })
            .collect();

        Self { question_set }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationOutcome {
    pub qset_id: String,
    /// Whatever the scoring service answered with.
    pub evaluation: serde_json::Value,
}
