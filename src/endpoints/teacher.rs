use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    database::{self, auth::SessionClaims},
    endpoints::{AppState, degrade},
    error::AppError,
    model::{
        evaluation::EvaluationOutcome, person::Role, question_set::NewQuestionSet,
        views::TeacherView,
    },
    security::authorize,
};

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(teacher_id): Path<String>,
) -> Result<Json<TeacherView>, AppError> {
    let store = state.store.as_ref();
    let view = async {
        authorize(store, &claims, Role::Teacher, &teacher_id).await?;
        database::teacher::teacher_view(store, &teacher_id).await
    }
    .await;

    degrade(view, TeacherView::empty()).map(Json)
}

pub async fn create_question_set(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(teacher_id): Path<String>,
    Json(new_set): Json<NewQuestionSet>,
) -> Result<Json<Value>, AppError> {
    let store = state.store.as_ref();
    authorize(store, &claims, Role::Teacher, &teacher_id).await?;

    let id = database::teacher::create_question_set(store, &teacher_id, new_set).await?;
    Ok(Json(json!({ "id": id })))
}

/// Scores the submission for one of the teacher's question sets.
pub async fn evaluate(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path((teacher_id, qset_id)): Path<(String, String)>,
) -> Result<Json<EvaluationOutcome>, AppError> {
    let store = state.store.as_ref();
    authorize(store, &claims, Role::Teacher, &teacher_id).await?;

    // Sets of other teachers are treated as absent
    let set = database::teacher::get_question_set(store, &qset_id).await?;
    if set.teacher_email != claims.email {
        return Err(AppError::not_found("Question set"));
    }

    let outcome = database::teacher::evaluate(store, state.scorer.as_ref(), &qset_id).await?;
    Ok(Json(outcome))
}
