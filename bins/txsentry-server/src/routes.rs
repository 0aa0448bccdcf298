//! Axum router and HTTP handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use txsentry_core::constants::LIVENESS_MESSAGE;
use txsentry_core::{PredictError, PredictionResult};

use crate::AppState;

// ── Error helper ─────────────────────────────────────────────────────────────

struct ApiError(PredictError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self { ApiError(e) }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ── Router ───────────────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ── GET / ────────────────────────────────────────────────────────────────────

async fn home() -> Json<Value> {
    Json(json!({ "message": LIVENESS_MESSAGE }))
}

// ── POST /predict ────────────────────────────────────────────────────────────

// The body is taken raw so a missing or wrong content type still reaches
// validation instead of being rejected by the extractor.
async fn predict(State(s): State<AppState>, body: Bytes) -> ApiResult<PredictionResult> {
    Ok(Json(s.service.predict_body(&body)?))
}

// ── Panics ───────────────────────────────────────────────────────────────────

fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "internal error".to_string()
    };
    error!(panic = %detail, "Prediction handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": detail }))).into_response()
}
