use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::ClientMessage;
use crate::interface_adapters::state::AppState;
use crate::use_cases::ControlEvent;

use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Latest serialized frame, for renderers that poll instead of streaming.
pub async fn snapshot_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let latest = state.frame_latest_tx.borrow().clone();
    if latest.is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("no frame produced yet")),
        )
            .into_response();
    }

    (
        [(header::CONTENT_TYPE, "application/json")],
        latest.as_str().to_owned(),
    )
        .into_response()
}

/// Queues one control command for the world task.
pub async fn control_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ClientMessage>, JsonRejection>,
) -> impl IntoResponse {
    let Json(msg) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            debug!(error = %rejection, "invalid control payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(rejection.body_text())),
            )
                .into_response();
        }
    };

    match state.control_tx.try_send(ControlEvent::from(msg)) {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(TrySendError::Full(_)) => {
            warn!("control channel full; rejecting command");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("control queue full")),
            )
                .into_response()
        }
        Err(TrySendError::Closed(_)) => {
            warn!("control channel closed; world task is gone");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new("simulation unavailable")),
            )
                .into_response()
        }
    }
}
