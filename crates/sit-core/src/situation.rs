//! Situation model: the `sit_situation` and `sit_trackable` super-entities,
//! `sit_presence` observations, and the `sit_location` virtual field.
//!
//! Super-entity rows are created and removed in lockstep with their concrete
//! rows by the modules owning those rows (incidents, requests, assets,
//! persons, …). Presence rows are written only through the tracking API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  fields,
  location::LocationRepresent,
  meta::{Meta, meta_fields},
  schema::{ComponentSpec, FieldSpec, InstanceType, SchemaBuilder, TableConfig},
  tracker::Tracker,
};

pub const SITUATION_ENTITY: &str = "sit_situation";
pub const TRACKABLE_ENTITY: &str = "sit_trackable";
pub const PRESENCE_TABLE: &str = "sit_presence";

// ─── Instance types ──────────────────────────────────────────────────────────

/// The concrete tables a situation can stand for. Serialised as the table
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SituationType {
  #[serde(rename = "irs_incident")]
  Incident,
  #[serde(rename = "rms_req")]
  Request,
  #[serde(rename = "pr_presence")]
  Presence,
}

impl SituationType {
  pub const ALL: [Self; 3] = [Self::Incident, Self::Request, Self::Presence];

  pub fn table(self) -> &'static str {
    match self {
      Self::Incident => "irs_incident",
      Self::Request => "rms_req",
      Self::Presence => "pr_presence",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Incident => "Incident",
      Self::Request => "Request",
      Self::Presence => "Presence",
    }
  }

  pub fn from_table(table: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|t| t.table() == table)
      .ok_or_else(|| Error::UnknownInstanceType(table.to_owned()))
  }

  fn instance_type(self) -> InstanceType {
    InstanceType { table: self.table(), label: self.label() }
  }
}

impl fmt::Display for SituationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.table())
  }
}

/// The concrete tables whose rows can be tracked. Serialised as the table
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackableType {
  #[serde(rename = "asset_asset")]
  Asset,
  #[serde(rename = "dvi_body")]
  DeadBody,
  #[serde(rename = "event_resource")]
  EventResource,
  #[serde(rename = "hrm_human_resource")]
  HumanResource,
  #[serde(rename = "pr_person")]
  Person,
}

impl TrackableType {
  pub const ALL: [Self; 5] = [
    Self::Asset,
    Self::DeadBody,
    Self::EventResource,
    Self::HumanResource,
    Self::Person,
  ];

  pub fn table(self) -> &'static str {
    match self {
      Self::Asset => "asset_asset",
      Self::DeadBody => "dvi_body",
      Self::EventResource => "event_resource",
      Self::HumanResource => "hrm_human_resource",
      Self::Person => "pr_person",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Asset => "Asset",
      Self::DeadBody => "Dead Body",
      Self::EventResource => "Event Resource",
      Self::HumanResource => "Human Resource",
      Self::Person => "Person",
    }
  }

  pub fn from_table(table: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|t| t.table() == table)
      .ok_or_else(|| Error::UnknownInstanceType(table.to_owned()))
  }

  fn instance_type(self) -> InstanceType {
    InstanceType { table: self.table(), label: self.label() }
  }
}

impl fmt::Display for TrackableType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.table())
  }
}

// ─── Situation ───────────────────────────────────────────────────────────────

/// A `sit_situation` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
  pub sit_id:        Uuid,
  pub instance_type: SituationType,
  /// Id of the concrete row this situation stands for.
  pub record_id:     Uuid,
  pub datetime:      Option<DateTime<Utc>>,
  pub location_id:   Option<Uuid>,
}

/// Input to [`crate::store::SituationStore::register_situation`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewSituation {
  pub instance_type: SituationType,
  pub record_id:     Uuid,
  pub datetime:      Option<DateTime<Utc>>,
  pub location_id:   Option<Uuid>,
}

impl NewSituation {
  pub fn new(instance_type: SituationType, record_id: Uuid) -> Self {
    Self {
      instance_type,
      record_id,
      datetime: None,
      location_id: None,
    }
  }
}

// ─── Trackable ───────────────────────────────────────────────────────────────

/// A `sit_trackable` row. Its position lives only in presence records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trackable {
  pub track_id:       Uuid,
  pub instance_type:  TrackableType,
  pub record_id:      Uuid,
  /// Time of the latest presence; maintained by the tracking API and never
  /// shown.
  #[serde(skip)]
  pub track_timestmp: Option<DateTime<Utc>>,
}

/// A Rust type standing for a row of one of the trackable tables.
///
/// Implementors get presence history and `sit_location` through their
/// table and id alone.
pub trait TrackedRecord {
  const INSTANCE_TYPE: TrackableType;

  fn record_id(&self) -> Uuid;
}

// ─── Presence ────────────────────────────────────────────────────────────────

/// One observation of a trackable at a place and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presence {
  pub presence_id: Uuid,
  pub track_id:    Uuid,
  pub timestmp:    DateTime<Utc>,
  pub location_id: Option<Uuid>,
  /// Opaque bookkeeping token owned by the tracking caller.
  #[serde(skip)]
  pub interlock:   Option<String>,
  #[serde(flatten)]
  pub meta:        Meta,
}

/// Input to [`crate::store::SituationStore::record_presence`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewPresence {
  pub track_id:    Uuid,
  /// Defaults to the time of recording.
  pub timestmp:    Option<DateTime<Utc>>,
  pub location_id: Option<Uuid>,
  pub interlock:   Option<String>,
  /// Stored as `created_by`.
  pub actor:       Option<String>,
}

impl NewPresence {
  pub fn at(
    track_id: Uuid,
    timestmp: DateTime<Utc>,
    location_id: Option<Uuid>,
  ) -> Self {
    Self {
      track_id,
      timestmp: Some(timestmp),
      location_id,
      interlock: None,
      actor: None,
    }
  }
}

// ─── Registration ────────────────────────────────────────────────────────────

/// Register `sit_situation`, `sit_trackable` and `sit_presence`.
pub fn register(b: &mut SchemaBuilder) -> Result<()> {
  b.super_entity(
    SITUATION_ENTITY,
    "sit_id",
    SituationType::ALL.map(SituationType::instance_type),
    [FieldSpec::datetime("datetime"), fields::location_id()],
  )?;
  b.configure(SITUATION_ENTITY, TableConfig::read_only())?;

  b.super_entity(
    TRACKABLE_ENTITY,
    "track_id",
    TrackableType::ALL.map(TrackableType::instance_type),
    [FieldSpec::datetime("track_timestmp").hidden()],
  )?;
  b.configure(TRACKABLE_ENTITY, TableConfig::read_only())?;
  b.add_components(TRACKABLE_ENTITY, [ComponentSpec {
    name:   PRESENCE_TABLE,
    joinby: "track_id",
  }])?;

  let presence_fields = [
    FieldSpec::id("presence_id"),
    FieldSpec::super_link("track_id", TRACKABLE_ENTITY).required(),
    FieldSpec::datetime("timestmp").label("Date/Time"),
    fields::location_id(),
    FieldSpec::text("interlock").hidden(),
  ];
  b.define_table(PRESENCE_TABLE, presence_fields.into_iter().chain(meta_fields()))?;

  Ok(())
}

// ─── Virtual field ───────────────────────────────────────────────────────────

/// Current location of a trackable record, as display text.
///
/// Looked up afresh on every call. A record without presence history yields
/// the formatter's placeholder; tracker failures are returned unchanged.
pub async fn sit_location<T, R>(
  tracker: &T,
  represent: &R,
  instance_type: TrackableType,
  record_id: Uuid,
) -> Result<String, T::Error>
where
  T: Tracker,
  R: LocationRepresent + ?Sized,
{
  let location = tracker.current_location(instance_type, record_id).await?;
  Ok(represent.represent(location.as_ref()))
}

/// [`sit_location`] for a typed record.
pub async fn sit_location_of<T, R, Rec>(
  tracker: &T,
  represent: &R,
  record: &Rec,
) -> Result<String, T::Error>
where
  T: Tracker,
  R: LocationRepresent + ?Sized,
  Rec: TrackedRecord,
{
  sit_location(tracker, represent, Rec::INSTANCE_TYPE, record.record_id()).await
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, convert::Infallible};

  use chrono::TimeZone as _;

  use super::*;
  use crate::{
    location::{GisLocationRepresent, Location},
    model,
    schema::CrudMethod,
    tracker::LocationObservation,
  };

  /// In-memory tracker keyed by concrete table and record id.
  #[derive(Default)]
  struct StubTracker {
    history: HashMap<(TrackableType, Uuid), Vec<LocationObservation>>,
  }

  impl Tracker for StubTracker {
    type Error = Infallible;

    async fn location_history(
      &self,
      instance_type: TrackableType,
      record_id: Uuid,
    ) -> Result<Vec<LocationObservation>, Infallible> {
      Ok(
        self
          .history
          .get(&(instance_type, record_id))
          .cloned()
          .unwrap_or_default(),
      )
    }
  }

  struct Person {
    id: Uuid,
  }

  impl TrackedRecord for Person {
    const INSTANCE_TYPE: TrackableType = TrackableType::Person;

    fn record_id(&self) -> Uuid { self.id }
  }

  fn place(name: &str) -> Location {
    Location {
      location_id: Uuid::new_v4(),
      name: name.into(),
      lat: None,
      lon: None,
    }
  }

  #[test]
  fn discriminators_round_trip_through_table_names() {
    for t in SituationType::ALL {
      assert_eq!(SituationType::from_table(t.table()).unwrap(), t);
      assert_eq!(serde_json::to_value(t).unwrap(), t.table());
    }
    for t in TrackableType::ALL {
      assert_eq!(TrackableType::from_table(t.table()).unwrap(), t);
      assert_eq!(serde_json::to_value(t).unwrap(), t.table());
    }
    assert!(matches!(
      TrackableType::from_table("org_office"),
      Err(Error::UnknownInstanceType(_))
    ));
  }

  #[test]
  fn registered_type_sets_match_the_enums() {
    let schema = model::schema().unwrap();

    let situation = schema.super_entity(SITUATION_ENTITY).unwrap();
    assert_eq!(situation.key, "sit_id");
    assert_eq!(situation.types.len(), 3);
    assert_eq!(situation.type_label("rms_req"), Some("Request"));

    let trackable = schema.super_entity(TRACKABLE_ENTITY).unwrap();
    assert_eq!(trackable.key, "track_id");
    for t in TrackableType::ALL {
      assert_eq!(trackable.type_label(t.table()), Some(t.label()));
    }
  }

  #[test]
  fn every_trackable_type_has_presence_component() {
    let schema = model::schema().unwrap();
    for t in TrackableType::ALL {
      let comp = schema.component(t.table(), PRESENCE_TABLE).unwrap();
      assert_eq!(comp.joinby, "track_id");
    }
    assert!(schema.component("irs_incident", PRESENCE_TABLE).is_none());
  }

  #[test]
  fn roots_reject_direct_writes() {
    let schema = model::schema().unwrap();
    for root in [SITUATION_ENTITY, TRACKABLE_ENTITY] {
      assert!(schema.permits(root, CrudMethod::Read).is_ok());
      for method in [CrudMethod::Create, CrudMethod::Update, CrudMethod::Delete] {
        assert!(matches!(
          schema.permits(root, method),
          Err(Error::NotPermitted { .. })
        ));
      }
    }
  }

  #[test]
  fn presence_bookkeeping_fields_are_hidden() {
    let schema = model::schema().unwrap();
    let presence = schema.table(PRESENCE_TABLE).unwrap();
    let interlock = presence.field("interlock").unwrap();
    assert!(!interlock.readable && !interlock.writable);
    assert!(presence.field("track_id").unwrap().required);
    assert_eq!(presence.field("timestmp").unwrap().label, Some("Date/Time"));

    let track = schema.table(TRACKABLE_ENTITY).unwrap();
    assert!(!track.field("track_timestmp").unwrap().readable);
  }

  #[tokio::test]
  async fn location_without_history_is_placeholder() {
    let tracker = StubTracker::default();
    let text = sit_location(
      &tracker,
      &GisLocationRepresent::default(),
      TrackableType::Asset,
      Uuid::new_v4(),
    )
    .await
    .unwrap();
    assert_eq!(text, "-");
  }

  #[tokio::test]
  async fn location_is_most_recent_observation() {
    let person = Person { id: Uuid::new_v4() };
    let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

    let mut tracker = StubTracker::default();
    tracker.history.insert((TrackableType::Person, person.id), vec![
      LocationObservation { timestmp: t1, location: Some(place("Camp A")) },
      LocationObservation { timestmp: t2, location: Some(place("Camp B")) },
    ]);

    let text =
      sit_location_of(&tracker, &GisLocationRepresent::default(), &person)
        .await
        .unwrap();
    assert_eq!(text, "Camp B");
  }

  #[tokio::test]
  async fn latest_observation_without_location_means_none() {
    let id = Uuid::new_v4();
    let t1 = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();

    let mut tracker = StubTracker::default();
    tracker.history.insert((TrackableType::Asset, id), vec![
      LocationObservation { timestmp: t1, location: Some(place("Depot")) },
      LocationObservation { timestmp: t2, location: None },
    ]);

    let current = tracker
      .current_location(TrackableType::Asset, id)
      .await
      .unwrap();
    assert!(current.is_none());

    let text = sit_location(
      &tracker,
      &GisLocationRepresent::default(),
      TrackableType::Asset,
      id,
    )
    .await
    .unwrap();
    assert_eq!(text, "-");
  }

  #[tokio::test]
  async fn future_observations_are_ignored() {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let mut tracker = StubTracker::default();
    tracker.history.insert((TrackableType::Person, id), vec![
      LocationObservation {
        timestmp: now - chrono::Duration::hours(1),
        location: Some(place("Camp A")),
      },
      LocationObservation {
        timestmp: now + chrono::Duration::days(30),
        location: Some(place("Camp B")),
      },
    ]);

    let current = tracker
      .current_location(TrackableType::Person, id)
      .await
      .unwrap();
    assert_eq!(current.map(|l| l.name).as_deref(), Some("Camp A"));
  }
}
