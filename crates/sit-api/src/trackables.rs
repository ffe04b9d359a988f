//! Handlers for `/trackables` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/trackables` | Optional `?instance_type=<table>` |
//! | `GET`  | `/trackables/:id` | 404 if not found |
//! | `POST`/`PUT`/`DELETE` | `/trackables[/:id]` | Refused by table configuration |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use sit_core::{
  schema::CrudMethod,
  situation::{TRACKABLE_ENTITY, Trackable, TrackableType},
};
use uuid::Uuid;

use crate::{AppState, Backend, error::ApiError, situations::refuse};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub instance_type: Option<TrackableType>,
}

/// `GET /trackables[?instance_type=<table>]`
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Trackable>>, ApiError> {
  let trackables = state
    .store
    .list_trackables(params.instance_type)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(trackables))
}

/// `GET /trackables/:id`
pub async fn get_one<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Trackable>, ApiError> {
  let trackable = state
    .store
    .get_trackable(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("trackable {id} not found")))?;
  Ok(Json(trackable))
}

/// `POST /trackables`
pub async fn create<S: Backend>(State(state): State<AppState<S>>) -> ApiError {
  refuse(state.schema, TRACKABLE_ENTITY, CrudMethod::Create)
}

/// `PUT /trackables/:id`
pub async fn update<S: Backend>(
  State(state): State<AppState<S>>,
  Path(_id): Path<Uuid>,
) -> ApiError {
  refuse(state.schema, TRACKABLE_ENTITY, CrudMethod::Update)
}

/// `DELETE /trackables/:id`
pub async fn delete<S: Backend>(
  State(state): State<AppState<S>>,
  Path(_id): Path<Uuid>,
) -> ApiError {
  refuse(state.schema, TRACKABLE_ENTITY, CrudMethod::Delete)
}
