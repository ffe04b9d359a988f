//! The tracking API: the only writer of `sit_presence`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/tracking/presence` | Body: [`NewPresence`]; returns 201 + stored presence |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sit_core::situation::NewPresence;

use crate::{AppState, Backend, error::ApiError};

/// `POST /tracking/presence`
pub async fn record<S: Backend>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewPresence>,
) -> Result<impl IntoResponse, ApiError> {
  let presence = state
    .store
    .record_presence(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(presence)))
}
