//! Handlers for `/schema` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/schema/tables` | Table names, sorted |
//! | `GET`  | `/schema/tables/:name` | Fields, config, components, CRUD strings |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use sit_core::{
  crud::CrudStrings,
  schema::{ComponentSpec, SuperEntitySpec, TableSpec},
};

use crate::{AppState, Backend, error::ApiError};

/// `GET /schema/tables`
pub async fn list_tables<S: Backend>(
  State(state): State<AppState<S>>,
) -> Json<Vec<&'static str>> {
  Json(state.schema.tables().map(|t| t.name).collect())
}

/// Everything registered about one table.
#[derive(Debug, Serialize)]
pub struct TableView {
  #[serde(flatten)]
  pub table:          &'static TableSpec,
  /// Own and inherited components.
  pub all_components: Vec<&'static ComponentSpec>,
  /// Present when the table is a super-entity root.
  pub super_entity:   Option<&'static SuperEntitySpec>,
  pub crud_strings:   Option<&'static CrudStrings>,
}

/// `GET /schema/tables/:name`
pub async fn get_table<S: Backend>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
) -> Result<Json<TableView>, ApiError> {
  let schema = state.schema;
  let table = schema
    .table(&name)
    .ok_or_else(|| ApiError::NotFound(format!("table {name} not found")))?;

  Ok(Json(TableView {
    table,
    all_components: schema.components(table.name),
    super_entity: schema.super_entity(table.name),
    crud_strings: schema.crud_strings(table.name),
  }))
}
