//! Handlers for `/situations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/situations` | Optional `?instance_type=irs_incident\|rms_req\|pr_presence` |
//! | `GET`  | `/situations/:id` | 404 if not found |
//! | `POST`/`PUT`/`DELETE` | `/situations[/:id]` | Refused by table configuration |
//!
//! Situation rows are only ever written by the modules owning the concrete
//! rows, never through this surface.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use sit_core::{
  schema::{CrudMethod, Schema},
  situation::{SITUATION_ENTITY, Situation, SituationType},
};
use uuid::Uuid;

use crate::{AppState, Backend, error::ApiError};

/// The registry's refusal of `method` on `table`, or 405 where the
/// configuration would allow a write this API does not serve.
pub(crate) fn refuse(
  schema: &Schema,
  table: &str,
  method: CrudMethod,
) -> ApiError {
  match schema.permits(table, method) {
    Err(e) => e.into(),
    Ok(()) => ApiError::MethodNotAllowed(format!(
      "{method} on {table} is not served by this API"
    )),
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub instance_type: Option<SituationType>,
}

/// `GET /situations[?instance_type=<table>]`
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Situation>>, ApiError> {
  let situations = state
    .store
    .list_situations(params.instance_type)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(situations))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /situations/:id`
pub async fn get_one<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Situation>, ApiError> {
  let situation = state
    .store
    .get_situation(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("situation {id} not found")))?;
  Ok(Json(situation))
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// `POST /situations`
pub async fn create<S: Backend>(State(state): State<AppState<S>>) -> ApiError {
  refuse(state.schema, SITUATION_ENTITY, CrudMethod::Create)
}

/// `PUT /situations/:id`
pub async fn update<S: Backend>(
  State(state): State<AppState<S>>,
  Path(_id): Path<Uuid>,
) -> ApiError {
  refuse(state.schema, SITUATION_ENTITY, CrudMethod::Update)
}

/// `DELETE /situations/:id`
pub async fn delete<S: Backend>(
  State(state): State<AppState<S>>,
  Path(_id): Path<Uuid>,
) -> ApiError {
  refuse(state.schema, SITUATION_ENTITY, CrudMethod::Delete)
}
