//! Handlers for `/reports` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports` | Creation order |
//! | `POST` | `/reports` | Body: [`NewSituationReport`]; returns 201 |
//! | `GET`  | `/reports/:id` | 404 if not found |
//! | `PUT`  | `/reports/:id` | Replaces every editable field |
//! | `DELETE` | `/reports/:id` | 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use sit_core::{
  schema::CrudMethod,
  sitrep::{NewSituationReport, REPORT_TABLE, SituationReport},
};
use uuid::Uuid;

use crate::{AppState, Backend, error::ApiError};

// ─── Read ────────────────────────────────────────────────────────────────────

/// `GET /reports`
pub async fn list<S: Backend>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<SituationReport>>, ApiError> {
  let reports = state
    .store
    .list_reports()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(reports))
}

/// `GET /reports/:id`
pub async fn get_one<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SituationReport>, ApiError> {
  let report = state
    .store
    .get_report(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("situation report {id} not found")))?;
  Ok(Json(report))
}

// ─── Write ───────────────────────────────────────────────────────────────────

/// `POST /reports`
pub async fn create<S: Backend>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewSituationReport>,
) -> Result<impl IntoResponse, ApiError> {
  state.schema.permits(REPORT_TABLE, CrudMethod::Create)?;
  let report = state
    .store
    .create_report(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(report)))
}

/// `PUT /reports/:id`
pub async fn update<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewSituationReport>,
) -> Result<Json<SituationReport>, ApiError> {
  state.schema.permits(REPORT_TABLE, CrudMethod::Update)?;
  let report = state
    .store
    .update_report(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(report))
}

/// `DELETE /reports/:id`
pub async fn delete<S: Backend>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  state.schema.permits(REPORT_TABLE, CrudMethod::Delete)?;
  state
    .store
    .delete_report(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
