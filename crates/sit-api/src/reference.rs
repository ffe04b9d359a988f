//! Handlers for the reference data the models point at.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/locations` | Sorted by name |
//! | `POST` | `/locations` | Body: `{"name":"...","lat":0.0,"lon":0.0}` |
//! | `GET`  | `/locations/:id` | 404 if not found |
//! | `GET`  | `/organisations` | Sorted by name |
//! | `POST` | `/organisations` | Body: `{"name":"..."}` |
//! | `GET`  | `/organisations/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use sit_core::{
  location::{Location, NewLocation},
  reference::{NewOrganisation, Organisation},
};
use uuid::Uuid;

use crate::{AppState, Backend, error::ApiError};

// ─── Locations ───────────────────────────────────────────────────────────────

/// `GET /locations`
pub async fn list_locations<S: Backend>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Location>>, ApiError> {
  let locations = state
    .store
    .list_locations()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(locations))
}

/// `POST /locations`
pub async fn create_location<S: Backend>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewLocation>,
) -> Result<impl IntoResponse, ApiError> {
  let location = state
    .store
    .add_location(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(location)))
}

/// `GET /locations/:id`
pub async fn get_location<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Location>, ApiError> {
  let location = state
    .store
    .get_location(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("location {id} not found")))?;
  Ok(Json(location))
}

// ─── Organisations ───────────────────────────────────────────────────────────

/// `GET /organisations`
pub async fn list_organisations<S: Backend>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Organisation>>, ApiError> {
  let organisations = state
    .store
    .list_organisations()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(organisations))
}

/// `POST /organisations`
pub async fn create_organisation<S: Backend>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewOrganisation>,
) -> Result<impl IntoResponse, ApiError> {
  let organisation = state
    .store
    .add_organisation(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(organisation)))
}

/// `GET /organisations/:id`
pub async fn get_organisation<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Organisation>, ApiError> {
  let organisation = state
    .store
    .get_organisation(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("organisation {id} not found")))?;
  Ok(Json(organisation))
}
