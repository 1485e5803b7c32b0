//! Contains all endpoint-associated functions, grouped by who may call them.
//!
//! The public endpoints (login and signup) are here; the session-protected ones live in the
//! `student` and `teacher` submodules. [`router`] wires them together.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header::CONTENT_TYPE},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::{
    OK_JSON,
    database::{self, DocumentStore, auth::AuthService},
    error::AppError,
    model::{
        person::Role,
        request::{LoginObject, NewUserObject},
    },
    scoring::Scorer,
    security,
};

pub mod student;
pub mod teacher;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthService>,
    pub scorer: Arc<dyn Scorer>,
}

pub fn router(state: AppState) -> Router {
    // Every route in this layer requires a live session
    let protected = Router::new()
        .route("/api/logout", post(logout))
        .route("/api/student/{student_id}", get(student::dashboard))
        .route(
            "/api/student/{student_id}/add_teacher",
            put(student::add_teacher),
        )
        .route(
            "/api/submitpaper/{qset_id}",
            get(student::get_paper).post(student::submit_paper),
        )
        .route("/api/teacher/{teacher_id}", get(teacher::dashboard))
        .route(
            "/api/teacher/{teacher_id}/question_sets",
            post(teacher::create_question_set),
        )
        .route(
            "/api/teacher/{teacher_id}/evaluate/{qset_id}",
            post(teacher::evaluate),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            security::handle_session_auth,
        ));

    Router::new()
        .route("/api/login", post(login))
        .route("/api/signup", post(signup))
        .merge(protected)
        .with_state(state)
}

/// Page loads show "not found" as such; any other failure is logged and the page renders empty.
pub(crate) fn degrade<T>(result: Result<T, AppError>, empty: T) -> Result<T, AppError> {
    match result {
        Err(e @ (AppError::NotFound(_) | AppError::Forbidden | AppError::Auth(_))) => Err(e),
        Err(e) => {
            tracing::error!("Error fetching data: {e}");
            Ok(empty)
        }
        ok => ok,
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session_token: String,
    pub id: String,
    pub role: Role,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: String,
    pub role: Role,
    pub redirect: String,
}

/// Checks the credentials, finds the person of the requested role, then opens a session.
///
/// Returns a session token and the page to land on.
pub async fn login(
    State(state): State<AppState>,
    Json(login): Json<LoginObject>,
) -> Result<Json<LoginResponse>, AppError> {
    state.auth.verify(&login.email, &login.password).await?;

    // Earlier sessions stay open unless the person exists in the requested role
    let identity = database::user::find_identity(state.store.as_ref(), &login.email, login.role)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    let session = state.auth.open_session(&login.email).await?;

    Ok(Json(LoginResponse {
        redirect: identity.landing_path(),
        session_token: session.session_token,
        id: identity.id,
        role: identity.role,
    }))
}

/// Signs up a new user and creates their student or teacher record.
pub async fn signup(
    State(state): State<AppState>,
    Json(signup): Json<NewUserObject>,
) -> Result<Json<SignupResponse>, AppError> {
    let identity = database::user::register_user(
        state.store.as_ref(),
        state.auth.as_ref(),
        &signup.email,
        &signup.password,
        signup.role,
    )
    .await?;

    Ok(Json(SignupResponse {
        id: identity.id,
        role: identity.role,
        redirect: "/login".into(),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = security::session_token(&headers) {
        state.auth.sign_out(&token).await?;
    }
    Ok(([(CONTENT_TYPE, "application/json")], OK_JSON))
}
