use super::state::ApiState;
use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use corral_derive::api_model;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

/// Message returned for any unhandled failure when the profile is not in
/// debug mode.
pub const GENERIC_ERROR_MESSAGE: &str = "Internal Server Error";

#[api_model]
/// Body of the catch-all 500 response.
pub struct ErrorBody {
    /// Always the generic message.
    pub message: String,
    /// The formatted failure in debug profiles, the generic message
    /// otherwise.
    pub reason: String,
}

/// Catch-all exception layer.
///
/// Panics escaping any route handler are logged with the request URI and
/// converted into a 500 response. The panic payload is only exposed in the
/// body when the profile runs in debug mode.
pub async fn handle_panics(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    let uri = req.uri().clone();

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let detail = panic_detail(panic.as_ref());
            tracing::error!(%uri, "Unhandled exception while serving request: {detail}");

            let reason = if state.profile.app.debug {
                detail
            } else {
                GENERIC_ERROR_MESSAGE.to_owned()
            };
            let body = ErrorBody { message: GENERIC_ERROR_MESSAGE.to_owned(), reason };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_owned()
    }
}
