use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde_json::{Value, json};

use crate::{
    database::{self, auth::SessionClaims},
    endpoints::{AppState, degrade},
    error::AppError,
    model::{
        answer_set::SubmissionObject,
        person::Role,
        question_set::Paper,
        request::{AddTeacherObject, PaperQuery},
        views::StudentView,
    },
    security::authorize,
};

/// The student's dashboard: pending, evaluated and not-evaluated question sets.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentView>, AppError> {
    let store = state.store.as_ref();
    let view = async {
        authorize(store, &claims, Role::Student, &student_id).await?;
        database::student::student_view(store, &student_id).await
    }
    .await;

    degrade(view, StudentView::empty(student_id.as_str())).map(Json)
}

/// Links a teacher by email. Returns the updated teacher list.
pub async fn add_teacher(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(student_id): Path<String>,
    Json(req): Json<AddTeacherObject>,
) -> Result<Json<Value>, AppError> {
    let store = state.store.as_ref();
    authorize(store, &claims, Role::Student, &student_id).await?;

    let teachers = database::student::add_teacher(store, &student_id, &req.email).await?;
    Ok(Json(json!({ "teachers": teachers })))
}

/// The questions of a set from one of the student's teachers, without the teacher's answers.
pub async fn get_paper(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(qset_id): Path<String>,
    Query(query): Query<PaperQuery>,
) -> Result<Json<Paper>, AppError> {
    let store = state.store.as_ref();
    authorize(store, &claims, Role::Student, &query.student_id).await?;

    let paper = database::student::get_paper(store, &qset_id, &query.student_id).await?;
    Ok(Json(paper))
}

pub async fn submit_paper(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(qset_id): Path<String>,
    Query(query): Query<PaperQuery>,
    Json(submission): Json<SubmissionObject>,
) -> Result<Json<Value>, AppError> {
    let store = state.store.as_ref();
    authorize(store, &claims, Role::Student, &query.student_id).await?;

    let id = database::student::submit_answers(
        store,
        &qset_id,
        &query.student_id,
        submission.answers,
    )
    .await?;
    Ok(Json(json!({ "id": id })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::database::{
        auth::{AuthService, StoreAuth},
        memory::MemoryStore,
        student::tests::{put_set, put_student},
        teacher::tests::RecordingScorer,
        testing::FaultyStore,
    };
    use crate::endpoints::router;
    use crate::endpoints::tests::{app, call, json_body, register};

    #[tokio::test]
    async fn student_flow_from_linking_to_submission() {
        let (app, store) = app();
        let (id, token) = register(&app, "kid@x.com", "student").await;
        put_set(&store, "Q1", "t@x.com", false).await;

        let response = call(
            &app,
            Method::PUT,
            &format!("/api/student/{id}/add_teacher"),
            Some(&token),
            Some(json!({"email": "t@x.com"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["teachers"], json!(["t@x.com"]));

        let dashboard = call(&app, Method::GET, &format!("/api/student/{id}"), Some(&token), None).await;
        let view = json_body(dashboard).await;
        assert_eq!(view["teacher_email"], "t@x.com");
        assert_eq!(
            view["pending"]["Q1"]["submit_path"],
            format!("/student/submitpaper/Q1?studentId={id}")
        );

        let paper = call(
            &app,
            Method::GET,
            &format!("/api/submitpaper/Q1?studentId={id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(paper.status(), StatusCode::OK);
        assert_eq!(json_body(paper).await["questions"][1]["qid"], 2);

        let submitted = call(
            &app,
            Method::POST,
            &format!("/api/submitpaper/Q1?studentId={id}"),
            Some(&token),
            Some(json!({"answers": {"1": "4"}})),
        )
        .await;
        assert_eq!(submitted.status(), StatusCode::OK);

        let dashboard = call(&app, Method::GET, &format!("/api/student/{id}"), Some(&token), None).await;
        let view = json_body(dashboard).await;
        assert_eq!(view["pending"], json!({}));
        assert_eq!(view["not_evaluated"]["Q1"]["title"], "Set Q1");
    }

    #[tokio::test]
    async fn duplicate_teacher_is_a_bad_request() {
        let (app, _) = app();
        let (id, token) = register(&app, "kid@x.com", "student").await;
        let uri = format!("/api/student/{id}/add_teacher");

        call(&app, Method::PUT, &uri, Some(&token), Some(json!({"email": "t@x.com"}))).await;
        let again = call(&app, Method::PUT, &uri, Some(&token), Some(json!({"email": "t@x.com"}))).await;

        assert_eq!(again.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn students_cannot_open_each_others_dashboards() {
        let (app, _) = app();
        let (_, token) = register(&app, "kid@x.com", "student").await;
        let (other, _) = register(&app, "other@x.com", "student").await;

        let response = call(&app, Method::GET, &format!("/api/student/{other}"), Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let (app, _) = app();
        let (_, token) = register(&app, "kid@x.com", "student").await;

        let response = call(&app, Method::GET, "/api/student/nobody", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unlinked_papers_are_a_bad_request() {
        let (app, store) = app();
        let (id, token) = register(&app, "kid@x.com", "student").await;
        put_set(&store, "Q1", "t@x.com", false).await;

        let response = call(
            &app,
            Method::GET,
            &format!("/api/submitpaper/Q1?studentId={id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn dashboard_renders_empty_when_the_store_fails() {
        let store = Arc::new(FaultyStore {
            fail_queries: true,
            ..FaultyStore::default()
        });
        put_student(&store.inner, "S1", &["t@x.com"]).await;

        let auth = StoreAuth::new(Arc::new(MemoryStore::new()), 1);
        auth.sign_up("S1@school.org", "hunter22").await.unwrap();
        let token = auth.sign_in("S1@school.org", "hunter22").await.unwrap().session_token;

        let app = router(AppState {
            store,
            auth: Arc::new(auth),
            scorer: Arc::new(RecordingScorer::default()),
        });

        let response = call(&app, Method::GET, "/api/student/S1", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let view: StudentView = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(view, StudentView::empty("S1"));
    }
}
