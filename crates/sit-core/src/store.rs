//! The `SituationStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `sit-store-sqlite`).
//! Higher layers (`sit-api`, `sit-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Classify,
  location::{Location, NewLocation},
  reference::{NewOrganisation, Organisation},
  situation::{
    NewPresence, NewSituation, Presence, Situation, SituationType, Trackable,
    TrackableType,
  },
  sitrep::{NewSituationReport, SituationReport},
};

/// Abstraction over a situation-model storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SituationStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Reference data ────────────────────────────────────────────────────

  fn add_location(
    &self,
    input: NewLocation,
  ) -> impl Future<Output = Result<Location, Self::Error>> + Send + '_;

  fn get_location(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send + '_;

  fn list_locations(
    &self,
  ) -> impl Future<Output = Result<Vec<Location>, Self::Error>> + Send + '_;

  fn add_organisation(
    &self,
    input: NewOrganisation,
  ) -> impl Future<Output = Result<Organisation, Self::Error>> + Send + '_;

  fn get_organisation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Organisation>, Self::Error>> + Send + '_;

  fn list_organisations(
    &self,
  ) -> impl Future<Output = Result<Vec<Organisation>, Self::Error>> + Send + '_;

  // ── Situation super-entity ────────────────────────────────────────────

  /// Create the `sit_situation` row for a freshly created concrete row.
  ///
  /// Fails if the concrete row is already registered.
  fn register_situation(
    &self,
    input: NewSituation,
  ) -> impl Future<Output = Result<Situation, Self::Error>> + Send + '_;

  fn get_situation(
    &self,
    sit_id: Uuid,
  ) -> impl Future<Output = Result<Option<Situation>, Self::Error>> + Send + '_;

  /// Look a situation up by its concrete row.
  fn find_situation(
    &self,
    instance_type: SituationType,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Option<Situation>, Self::Error>> + Send + '_;

  fn list_situations(
    &self,
    instance_type: Option<SituationType>,
  ) -> impl Future<Output = Result<Vec<Situation>, Self::Error>> + Send + '_;

  /// Remove the `sit_situation` row of a deleted concrete row.
  fn unregister_situation(
    &self,
    sit_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Trackable super-entity ────────────────────────────────────────────

  /// Create the `sit_trackable` row for a freshly created concrete row.
  fn register_trackable(
    &self,
    instance_type: TrackableType,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Trackable, Self::Error>> + Send + '_;

  fn get_trackable(
    &self,
    track_id: Uuid,
  ) -> impl Future<Output = Result<Option<Trackable>, Self::Error>> + Send + '_;

  fn find_trackable(
    &self,
    instance_type: TrackableType,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Option<Trackable>, Self::Error>> + Send + '_;

  fn list_trackables(
    &self,
    instance_type: Option<TrackableType>,
  ) -> impl Future<Output = Result<Vec<Trackable>, Self::Error>> + Send + '_;

  /// Remove a `sit_trackable` row together with its presence history.
  fn unregister_trackable(
    &self,
    track_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Tracking API ──────────────────────────────────────────────────────

  /// Record an observation and advance the trackable's `track_timestmp`.
  fn record_presence(
    &self,
    input: NewPresence,
  ) -> impl Future<Output = Result<Presence, Self::Error>> + Send + '_;

  /// Presence records of a trackable, oldest first.
  fn presence_history(
    &self,
    track_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Presence>, Self::Error>> + Send + '_;

  // ── Situation reports ─────────────────────────────────────────────────

  fn create_report(
    &self,
    input: NewSituationReport,
  ) -> impl Future<Output = Result<SituationReport, Self::Error>> + Send + '_;

  fn get_report(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<Option<SituationReport>, Self::Error>> + Send + '_;

  /// All reports, in creation order.
  fn list_reports(
    &self,
  ) -> impl Future<Output = Result<Vec<SituationReport>, Self::Error>> + Send + '_;

  fn update_report(
    &self,
    report_id: Uuid,
    input: NewSituationReport,
  ) -> impl Future<Output = Result<SituationReport, Self::Error>> + Send + '_;

  /// Delete a report and its `doc_entity` row.
  fn delete_report(
    &self,
    report_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
