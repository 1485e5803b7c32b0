//! Student-facing reads and writes: the dashboard, teacher linking and paper submission.

use std::collections::BTreeMap;

use crate::{
    database::{
        Collection, DocumentStore, encode, find, get,
        operations::{Appended, append_unique},
    },
    error::AppError,
    model::{
        answer_set::AnswerSet,
        question_set::{Paper, QuestionSet},
        views::{Buckets, StudentView},
        person::Student,
    },
};

const ALREADY_SUBMITTED: &str = "This paper has already been submitted.";

pub async fn get_student(store: &dyn DocumentStore, student_id: &str) -> Result<Student, AppError> {
    get(store, Collection::Students, student_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student"))
}

/// Splits the question sets of the student's first teacher into pending, evaluated and
/// not-evaluated.
pub async fn student_view(store: &dyn DocumentStore, student_id: &str) -> Result<StudentView, AppError> {
    let student = get_student(store, student_id).await?;

    let Some(teacher_email) = student.teachers.first().cloned() else {
        return Ok(StudentView::empty(student_id));
    };

    let sets: Vec<QuestionSet> =
        find(store, Collection::QuestionSets, "t_email", teacher_email.as_str()).await?;
    if sets.is_empty() {
        tracing::info!("No question sets found for teacher: {teacher_email}");
    }

    let answers: Vec<AnswerSet> =
        find(store, Collection::AnswerSets, "student_id", student_id).await?;

    Ok(StudentView {
        student_id: student_id.to_owned(),
        buckets: Buckets::partition(student_id, &sets, &answers),
        teacher_email: Some(teacher_email),
    })
}

/// Links a teacher to the student. Returns the student's teacher list after the append.
pub async fn add_teacher(
    store: &dyn DocumentStore,
    student_id: &str,
    teacher_email: &str,
) -> Result<Vec<String>, AppError> {
    let teacher_email = teacher_email.trim();
    if teacher_email.is_empty() {
        return Err(AppError::validation("Please enter a valid email."));
    }

    match append_unique(
        store,
        Collection::Students,
        student_id,
        "teachers",
        teacher_email,
    )
    .await?
    {
        Some(Appended::Added(teachers)) => {
            tracing::info!("Student {student_id} added teacher {teacher_email}");
            Ok(teachers)
        }
        Some(Appended::AlreadyPresent) => {
            Err(AppError::validation("This teacher is already added."))
        }
        None => Err(AppError::not_found("Student")),
    }
}

/// The question set behind a paper, if the student has linked its teacher.
async fn linked_set(
    store: &dyn DocumentStore,
    qset_id: &str,
    student_id: &str,
) -> Result<QuestionSet, AppError> {
    let student = get_student(store, student_id).await?;
    let set: QuestionSet = get(store, Collection::QuestionSets, qset_id)
        .await?
        .ok_or_else(|| AppError::not_found("Question set"))?;

    if !student.teachers.contains(&set.teacher_email) {
        return Err(AppError::validation(
            "This paper belongs to a teacher you have not added.",
        ));
    }
    Ok(set)
}

pub async fn get_paper(
    store: &dyn DocumentStore,
    qset_id: &str,
    student_id: &str,
) -> Result<Paper, AppError> {
    Ok(linked_set(store, qset_id, student_id).await?.into())
}

/// Records a student's answers to a question set. A student submits each set once.
///
/// The record id is derived from the student and the set, so of two racing submissions only
/// one is stored.
pub async fn submit_answers(
    store: &dyn DocumentStore,
    qset_id: &str,
    student_id: &str,
    answers: BTreeMap<u32, String>,
) -> Result<String, AppError> {
    let set = linked_set(store, qset_id, student_id).await?;

    let previous: Vec<AnswerSet> =
        find(store, Collection::AnswerSets, "student_id", student_id).await?;
    if previous.iter().any(|a| a.qset_id == qset_id) {
        return Err(AppError::validation(ALREADY_SUBMITTED));
    }

    let answers = answers
        .into_iter()
        .filter(|(qid, _)| set.questions.iter().any(|q| q.qid == *qid))
        .collect();

    let answer_set = AnswerSet {
        id: String::new(),
        qset_id: qset_id.to_owned(),
        student_id: student_id.to_owned(),
        answers,
    };
    let id = format!("{student_id}-{qset_id}");
    if !store
        .insert_new(Collection::AnswerSets, &id, encode(&answer_set)?)
        .await?
    {
        return Err(AppError::validation(ALREADY_SUBMITTED));
    }

    tracing::info!("Student {student_id} submitted {qset_id}");
    Ok(id)
}
