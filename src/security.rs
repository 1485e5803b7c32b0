//! Session middleware, plus the check that a session only reaches its own person's pages.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    database::{self, DocumentStore, auth::SessionClaims},
    endpoints::AppState,
    error::AppError,
    model::person::{Person, Role},
};

/// The session token from the Authorization header. A `Bearer ` prefix is optional.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_owned())
    }
}

/// Rejects requests without a live session and hands the session's claims to the handler.
pub async fn handle_session_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(request.headers()) else {
        return (StatusCode::UNAUTHORIZED, "Not Authorized.").into_response();
    };

    match state.auth.session(&token).await {
        Ok(Some(claims)) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Ok(None) => (StatusCode::UNAUTHORIZED, "Not Authorized.").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Succeeds if the `role` record `id` belongs to the session's owner.
pub async fn authorize(
    store: &dyn DocumentStore,
    claims: &SessionClaims,
    role: Role,
    id: &str,
) -> Result<(), AppError> {
    let person: Option<Person> = database::get(store, role.collection(), id).await?;

    match person {
        Some(person) if person.email == claims.email => Ok(()),
        Some(_) => Err(AppError::Forbidden),
        None => Err(AppError::not_found(match role {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
        })),
    }
}
