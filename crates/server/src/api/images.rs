//! Image intake and lookup endpoints.
//!
//! Intake responses are plain text: a header line, then one line per
//! submitted path. Once the body decodes and the batch is non-empty the
//! status is always 200; per-item failures are reported in the body.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use receiver_core::ImageRecord;
use receiver_storage::StoreError;

use crate::ingest::ItemOutcome;
use crate::state::AppState;

use super::{bad_request, error_response, internal_error, ApiResult};

/// A single image path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathRequest {
    #[serde(default)]
    pub path: String,
}

/// A batch of image paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsRequest {
    #[serde(default)]
    pub paths: Vec<PathRequest>,
}

fn render(outcomes: &[ItemOutcome]) -> String {
    let mut body = format!("got {} path(s)\n", outcomes.len());
    for outcome in outcomes {
        let _ = writeln!(body, "{outcome}");
    }
    body
}

/// `POST /image/post`: submit one path.
pub async fn post_image(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<String> {
    let req: PathRequest = serde_json::from_slice(&body).map_err(|e| {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("got error while decoding body: {e}"),
        )
    })?;

    if req.path.is_empty() {
        return Err(bad_request("path cannot be an empty string"));
    }

    debug!(path = %req.path, "post image");
    let outcome = state.ingest.submit_one(req.path).await;
    Ok(render(std::slice::from_ref(&outcome)))
}

/// `POST /images/post`: submit a batch of paths.
pub async fn post_images(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<String> {
    let req: PathsRequest = serde_json::from_slice(&body)
        .map_err(|e| bad_request(format!("got error while decoding request body: {e}")))?;

    if req.paths.is_empty() {
        return Err(bad_request("paths cannot be empty"));
    }

    debug!(count = req.paths.len(), "post images");
    let paths = req.paths.into_iter().map(|p| p.path).collect();
    let outcomes = state.ingest.submit_batch(paths).await;
    Ok(render(&outcomes))
}

/// `GET /image/{id}`: load a stored record.
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ImageRecord>> {
    let loaded = tokio::time::timeout(state.request_timeout, state.store.read(id))
        .await
        .map_err(|_| {
            error_response(
                StatusCode::GATEWAY_TIMEOUT,
                format!("timed out loading image after {:?}", state.request_timeout),
            )
        })?;

    match loaded {
        Ok(image) => Ok(Json(image)),
        Err(e @ StoreError::NotFound(_)) => Err(error_response(StatusCode::NOT_FOUND, e.to_string())),
        Err(e) => Err(internal_error(e)),
    }
}
