//! JSON REST API for the situation model.
//!
//! Exposes an axum [`Router`] backed by any store that implements both
//! [`SituationStore`] and [`Tracker`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", sit_api::api_router(AppState::new(store, schema)))
//! ```

pub mod error;
pub mod records;
pub mod reference;
pub mod reports;
pub mod schema;
pub mod situations;
pub mod trackables;
pub mod tracking;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use sit_core::{
  location::{GisLocationRepresent, LocationRepresent},
  schema::Schema,
  store::SituationStore,
  tracker::Tracker,
};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// A store the API can serve: records plus location history.
pub trait Backend: SituationStore + Tracker + Clone + 'static {}

impl<T> Backend for T where T: SituationStore + Tracker + Clone + 'static {}

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct AppState<S: Backend> {
  pub store:     Arc<S>,
  pub schema:    &'static Schema,
  /// Formats `sit_location`.
  pub represent: Arc<dyn LocationRepresent>,
}

impl<S: Backend> AppState<S> {
  pub fn new(store: Arc<S>, schema: &'static Schema) -> Self {
    Self {
      store,
      schema,
      represent: Arc::new(GisLocationRepresent::default()),
    }
  }

  pub fn with_represent(mut self, represent: impl LocationRepresent + 'static) -> Self {
    self.represent = Arc::new(represent);
    self
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S: Backend>(state: AppState<S>) -> Router<()> {
  Router::new()
    // Schema
    .route("/schema/tables", get(schema::list_tables::<S>))
    .route("/schema/tables/{name}", get(schema::get_table::<S>))
    // Super-entities
    .route(
      "/situations",
      get(situations::list::<S>).post(situations::create::<S>),
    )
    .route(
      "/situations/{id}",
      get(situations::get_one::<S>)
        .put(situations::update::<S>)
        .delete(situations::delete::<S>),
    )
    .route(
      "/trackables",
      get(trackables::list::<S>).post(trackables::create::<S>),
    )
    .route(
      "/trackables/{id}",
      get(trackables::get_one::<S>)
        .put(trackables::update::<S>)
        .delete(trackables::delete::<S>),
    )
    // Concrete records
    .route(
      "/records/{table}/{record_id}/components/{component}",
      get(records::component::<S>),
    )
    .route("/records/{table}/{record_id}/location", get(records::location::<S>))
    // Tracking API
    .route("/tracking/presence", post(tracking::record::<S>))
    // Situation reports
    .route("/reports", get(reports::list::<S>).post(reports::create::<S>))
    .route(
      "/reports/{id}",
      get(reports::get_one::<S>)
        .put(reports::update::<S>)
        .delete(reports::delete::<S>),
    )
    // Reference data
    .route(
      "/locations",
      get(reference::list_locations::<S>).post(reference::create_location::<S>),
    )
    .route("/locations/{id}", get(reference::get_location::<S>))
    .route(
      "/organisations",
      get(reference::list_organisations::<S>)
        .post(reference::create_organisation::<S>),
    )
    .route("/organisations/{id}", get(reference::get_organisation::<S>))
    .with_state(state)
}
