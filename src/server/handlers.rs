use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, info};
use serde_json::json;

use super::stream::{stream_body, BOUNDARY};
use super::AppState;
use crate::encoder::FrameEncoder;
use crate::input::{Dispatch, InputEvent};

/// Exact-match token check; a missing token counts as empty, not absent.
pub(crate) fn authorized(params: &HashMap<String, String>, expected: &str) -> bool {
    params.get("token").map(String::as_str).unwrap_or("") == expected
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

/// `GET /video` — the never-terminating multipart frame stream.
pub async fn video_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&params, &state.config.token) {
        return unauthorized();
    }

    info!(
        "Viewer connected: {} fps, scale {}, quality {}",
        state.config.fps.max(1),
        state.config.scale,
        state.config.quality
    );

    let encoder = FrameEncoder::new(state.config.scale, state.config.quality);
    let body = stream_body(
        state.capture_factory.clone(),
        encoder,
        state.config.frame_interval(),
    );

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            format!("multipart/x-mixed-replace; boundary={}", BOUNDARY),
        )],
        body,
    )
        .into_response()
}

/// `POST /input` — executes one input event and always answers with a
/// structured JSON body. The token is checked before the body is even
/// deserialized, so a bad token yields 401 no matter what was posted.
pub async fn input_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    if !authorized(&params, &state.config.token) {
        return unauthorized();
    }

    let event: InputEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            debug!("Rejecting malformed input event: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "error": format!("invalid input event: {}", e),
                })),
            )
                .into_response();
        }
    };

    debug!("Dispatching input event: {:?}", event);

    // Enigo calls and the type-text delay block, so they stay off the
    // async workers
    let dispatcher = state.dispatcher.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut dispatcher = dispatcher.lock().unwrap();
        dispatcher.dispatch(event)
    })
    .await
    .unwrap_or_else(|e| Err(format!("input task failed: {}", e)));

    let body = match result {
        Ok(Dispatch::Done) => json!({ "status": "ok" }),
        Ok(Dispatch::Ignored(note)) => json!({ "status": "ok", "note": note }),
        Err(error) => {
            debug!("Input event failed: {}", error);
            json!({ "status": "error", "error": error })
        }
    };

    Json(body).into_response()
}
