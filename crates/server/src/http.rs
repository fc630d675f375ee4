use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use blinkwatch_core::detection::domain::detection_state::DetectionState;

use crate::state::{encode_blocking, AppState};
use crate::stream::{mjpeg_body, MJPEG_CONTENT_TYPE};

#[derive(Serialize)]
struct FrameResponse {
    frame: String,
    timestamp: f64,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/video_feed", get(video_feed))
        .route("/frame", get(frame))
        .route("/detection_state", get(detection_state))
        .layer(cors)
        .with_state(state)
}

async fn video_feed(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, MJPEG_CONTENT_TYPE)],
        mjpeg_body(state),
    )
        .into_response()
}

async fn frame(State(state): State<AppState>) -> Response {
    let Some(latest) = state.session.latest_frame() else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No frame available"})),
        )
            .into_response();
    };

    let (index, timestamp) = (latest.frame.index(), latest.timestamp_secs());
    let content_type = state.snapshot_encoder.content_type();
    match encode_blocking(state.snapshot_encoder.clone(), latest).await {
        Ok(bytes) => Json(FrameResponse {
            frame: format!(
                "data:{content_type};base64,{}",
                general_purpose::STANDARD.encode(bytes)
            ),
            timestamp,
        })
        .into_response(),
        Err(e) => {
            log::error!("Failed to encode frame {index}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to encode frame"})),
            )
                .into_response()
        }
    }
}

async fn detection_state(State(state): State<AppState>) -> Json<DetectionState> {
    Json(state.session.snapshot())
}
