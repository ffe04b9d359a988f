//! Handlers addressing concrete records by table and id.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records/:table/:record_id/components/:component` | Component rows; 404 unless `component` is one of `table`'s |
//! | `GET`  | `/records/:table/:record_id/location` | `{"location": "<represented>"}` |
//!
//! The concrete tables themselves are owned elsewhere; only what the
//! super-entities give them is served here.

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use sit_core::situation::{
  PRESENCE_TABLE, Presence, TRACKABLE_ENTITY, TrackableType, sit_location,
};
use uuid::Uuid;

use crate::{AppState, Backend, error::ApiError};

fn trackable_type(table: &str) -> Result<TrackableType, ApiError> {
  TrackableType::from_table(table)
    .map_err(|_| ApiError::NotFound(format!("{table} is not trackable")))
}

// ─── Components ──────────────────────────────────────────────────────────────

/// `GET /records/:table/:record_id/components/:component`
///
/// On the `sit_trackable` root itself `record_id` is the `track_id`.
pub async fn component<S: Backend>(
  State(state): State<AppState<S>>,
  Path((table, record_id, component)): Path<(String, Uuid, String)>,
) -> Result<Json<Vec<Presence>>, ApiError> {
  let spec = state.schema.component(&table, &component).ok_or_else(|| {
    ApiError::NotFound(format!("{component} is not a component of {table}"))
  })?;

  if spec.name != PRESENCE_TABLE {
    return Err(ApiError::NotFound(format!(
      "no listing for component {component}"
    )));
  }

  let track_id = if table == TRACKABLE_ENTITY {
    Some(record_id)
  } else {
    state
      .store
      .find_trackable(trackable_type(&table)?, record_id)
      .await
      .map_err(ApiError::from_store)?
      .map(|t| t.track_id)
  };

  // An unregistered record simply has no presence rows.
  let Some(track_id) = track_id else {
    return Ok(Json(Vec::new()));
  };

  let history = state
    .store
    .presence_history(track_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(history))
}

// ─── Location ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LocationBody {
  pub location: String,
}

/// `GET /records/:table/:record_id/location`: the `sit_location` virtual
/// field.
pub async fn location<S: Backend>(
  State(state): State<AppState<S>>,
  Path((table, record_id)): Path<(String, Uuid)>,
) -> Result<Json<LocationBody>, ApiError> {
  let instance_type = trackable_type(&table)?;
  let location = sit_location(
    state.store.as_ref(),
    state.represent.as_ref(),
    instance_type,
    record_id,
  )
  .await
  .map_err(ApiError::internal)?;

  tracing::debug!(%table, %record_id, %location, "resolved sit_location");
  Ok(Json(LocationBody { location }))
}
