use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::Answer;
use super::flow::FlowError;
use super::repository::{RepositoryError, SessionId, SessionRepository};
use super::service::{QuestionnaireService, QuestionnaireServiceError};

/// Router exposing questionnaire sessions over HTTP.
pub fn questionnaire_router<R>(service: Arc<QuestionnaireService<R>>) -> Router
where
    R: SessionRepository + 'static,
{
    Router::new()
        .route("/api/v1/questionnaire/sessions", post(start_handler::<R>))
        .route(
            "/api/v1/questionnaire/sessions/:session_id",
            get(session_handler::<R>),
        )
        .route(
            "/api/v1/questionnaire/sessions/:session_id/answers",
            post(answer_handler::<R>),
        )
        .route(
            "/api/v1/questionnaire/sessions/:session_id/back",
            post(back_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn start_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.start() {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let Some(id) = parse_id(&session_id) else {
        return unknown_session(&session_id);
    };

    match service.get(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(QuestionnaireServiceError::Repository(RepositoryError::NotFound)) => {
            unknown_session(&session_id)
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn answer_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
    Path(session_id): Path<String>,
    axum::Json(answer): axum::Json<Answer>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let Some(id) = parse_id(&session_id) else {
        return unknown_session(&session_id);
    };

    match service.submit(&id, answer) {
        Ok(view) if view.verdict.is_invalid() => {
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(view)).into_response()
        }
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(QuestionnaireServiceError::Repository(RepositoryError::NotFound)) => {
            unknown_session(&session_id)
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn back_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    let Some(id) = parse_id(&session_id) else {
        return unknown_session(&session_id);
    };

    match service.back(&id) {
        Ok((_, view)) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(QuestionnaireServiceError::Repository(RepositoryError::NotFound)) => {
            unknown_session(&session_id)
        }
        Err(error) => error_response(error),
    }
}

fn parse_id(raw: &str) -> Option<SessionId> {
    raw.parse().ok()
}

fn unknown_session(raw: &str) -> Response {
    let payload = json!({
        "error": "session not found",
        "session_id": raw,
    });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

fn error_response(error: QuestionnaireServiceError) -> Response {
    let status = match &error {
        QuestionnaireServiceError::Flow(
            FlowError::AtEntry | FlowError::Finished(_) | FlowError::StepMismatch { .. },
        ) => StatusCode::CONFLICT,
        QuestionnaireServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        QuestionnaireServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        QuestionnaireServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
