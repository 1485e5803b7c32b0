//! Teacher-facing reads and writes: the dashboard, question set creation and evaluation.

use serde_json::Value;

use crate::{
    database::{
        Collection, DocumentStore, Fields, encode, find, get,
        operations::{Appended, append_unique},
    },
    error::AppError,
    model::{
        answer_set::AnswerSet,
        evaluation::{EvaluationOutcome, EvaluationRequest},
        person::Teacher,
        question_set::{NewQuestionSet, Question, QuestionSet, QuestionSetSummary},
        views::TeacherView,
    },
    scoring::Scorer,
};

pub async fn get_teacher(store: &dyn DocumentStore, teacher_id: &str) -> Result<Teacher, AppError> {
    get(store, Collection::Teachers, teacher_id)
        .await?
        .ok_or_else(|| AppError::not_found("Teacher"))
}

pub async fn get_question_set(store: &dyn DocumentStore, qset_id: &str) -> Result<QuestionSet, AppError> {
    get(store, Collection::QuestionSets, qset_id)
        .await?
        .ok_or_else(|| AppError::not_found("Question set"))
}

pub async fn teacher_view(store: &dyn DocumentStore, teacher_id: &str) -> Result<TeacherView, AppError> {
    let teacher = get_teacher(store, teacher_id).await?;

    let sets: Vec<QuestionSet> = find(
        store,
        Collection::QuestionSets,
        "t_email",
        teacher.person.email.as_str(),
    )
    .await?;

    Ok(TeacherView {
        question_sets: sets.iter().map(QuestionSetSummary::from).collect(),
        teacher: Some(teacher.person),
    })
}

/// Stores a new question set for the teacher and records its id on the teacher.
pub async fn create_question_set(
    store: &dyn DocumentStore,
    teacher_id: &str,
    new_set: NewQuestionSet,
) -> Result<String, AppError> {
    let title = new_set.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("A question set needs a title."));
    }
    if new_set.questions.is_empty() {
        return Err(AppError::validation("A question set needs at least one question."));
    }

    let teacher = get_teacher(store, teacher_id).await?;

    let questions = new_set
        .questions
        .into_iter()
        .zip(1..)
        .map(|(q, qid)| Question {
            qid,
            question: q.question,
            answer: q.answer,
        })
        .collect();

    let set = QuestionSet {
        id: String::new(),
        title: title.to_owned(),
        description: new_set.description,
        teacher_email: teacher.person.email,
        questions,
        evaluated: false,
    };
    let qset_id = store
        .insert(Collection::QuestionSets, encode(&set)?)
        .await?;

    match append_unique(store, Collection::Teachers, teacher_id, "qset_id", &qset_id).await? {
        Some(Appended::Added(_)) | Some(Appended::AlreadyPresent) => {}
        None => tracing::warn!("Teacher {teacher_id} vanished before {qset_id} was linked"),
    }

    tracing::info!("Teacher {teacher_id} created question set {qset_id}");
    Ok(qset_id)
}

/// Sends the submission for `qset_id` to the scorer and marks the set evaluated.
///
/// Only the first submission found is scored. The flag is written only after the scorer
/// succeeded, so a failed attempt can simply be repeated. Two evaluations running at the
/// same time both reach the scorer.
pub async fn evaluate(
    store: &dyn DocumentStore,
    scorer: &dyn Scorer,
    qset_id: &str,
) -> Result<EvaluationOutcome, AppError> {
    let set = get_question_set(store, qset_id).await?;

    let submissions: Vec<AnswerSet> =
        find(store, Collection::AnswerSets, "qset_id", qset_id).await?;
    let Some(answers) = submissions.first() else {
        return Err(AppError::not_found("Submission"));
    };

    let request = EvaluationRequest::package(&set, answers);
    let evaluation = scorer.evaluate(&request).await?;

    let mut fields = Fields::new();
    fields.insert("evaluated".into(), Value::Bool(true));
    if !store
        .update_fields(Collection::QuestionSets, qset_id, fields)
        .await?
    {
        return Err(AppError::not_found("Question set"));
    }

    tracing::info!("Evaluated question set {qset_id}");
    Ok(EvaluationOutcome {
        qset_id: qset_id.to_owned(),
        evaluation,
    })
}
