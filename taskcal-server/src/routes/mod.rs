pub mod events;
pub mod tasks;

use axum::{
    Json, Router,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use taskcal_core::protocol::ErrorResponse;
use taskcal_core::{TaskCalError, ValidationError};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(tasks::router())
        .merge(events::router())
        .with_state(state)
        .layer(cors)
}

/// JSON request body whose decode failures go through `AppError` as a 400.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Convert anyhow errors to HTTP responses
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<ValidationError>().is_some()
            || self.0.downcast_ref::<JsonRejection>().is_some()
        {
            return StatusCode::BAD_REQUEST;
        }
        match self.0.downcast_ref::<TaskCalError>() {
            Some(TaskCalError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(TaskCalError::TaskNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
