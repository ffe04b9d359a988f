//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that string
//! order matches time order. Dates are `YYYY-MM-DD`. UUIDs are hyphenated
//! lowercase strings. Instance types are stored as their concrete table
//! names.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use sit_core::{
  location::Location,
  meta::Meta,
  reference::Organisation,
  situation::{Presence, Situation, SituationType, Trackable, TrackableType},
  sitrep::SituationReport,
  tracker::LocationObservation,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawLocation::from_row`].
pub const LOCATION_COLUMNS: &str = "location_id, name, lat, lon";

pub struct RawLocation {
  pub location_id: String,
  pub name:        String,
  pub lat:         Option<f64>,
  pub lon:         Option<f64>,
}

impl RawLocation {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      location_id: row.get(0)?,
      name:        row.get(1)?,
      lat:         row.get(2)?,
      lon:         row.get(3)?,
    })
  }

  pub fn into_location(self) -> Result<Location> {
    Ok(Location {
      location_id: decode_uuid(&self.location_id)?,
      name:        self.name,
      lat:         self.lat,
      lon:         self.lon,
    })
  }
}

pub const ORGANISATION_COLUMNS: &str = "organisation_id, name";

pub struct RawOrganisation {
  pub organisation_id: String,
  pub name:            String,
}

impl RawOrganisation {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      organisation_id: row.get(0)?,
      name:            row.get(1)?,
    })
  }

  pub fn into_organisation(self) -> Result<Organisation> {
    Ok(Organisation {
      organisation_id: decode_uuid(&self.organisation_id)?,
      name:            self.name,
    })
  }
}

pub const SITUATION_COLUMNS: &str =
  "sit_id, instance_type, record_id, datetime, location_id";

pub struct RawSituation {
  pub sit_id:        String,
  pub instance_type: String,
  pub record_id:     String,
  pub datetime:      Option<String>,
  pub location_id:   Option<String>,
}

impl RawSituation {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      sit_id:        row.get(0)?,
      instance_type: row.get(1)?,
      record_id:     row.get(2)?,
      datetime:      row.get(3)?,
      location_id:   row.get(4)?,
    })
  }

  pub fn into_situation(self) -> Result<Situation> {
    Ok(Situation {
      sit_id:        decode_uuid(&self.sit_id)?,
      instance_type: SituationType::from_table(&self.instance_type)?,
      record_id:     decode_uuid(&self.record_id)?,
      datetime:      decode_opt_dt(self.datetime.as_deref())?,
      location_id:   decode_opt_uuid(self.location_id.as_deref())?,
    })
  }
}

pub const TRACKABLE_COLUMNS: &str =
  "track_id, instance_type, record_id, track_timestmp";

pub struct RawTrackable {
  pub track_id:       String,
  pub instance_type:  String,
  pub record_id:      String,
  pub track_timestmp: Option<String>,
}

impl RawTrackable {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      track_id:       row.get(0)?,
      instance_type:  row.get(1)?,
      record_id:      row.get(2)?,
      track_timestmp: row.get(3)?,
    })
  }

  pub fn into_trackable(self) -> Result<Trackable> {
    Ok(Trackable {
      track_id:       decode_uuid(&self.track_id)?,
      instance_type:  TrackableType::from_table(&self.instance_type)?,
      record_id:      decode_uuid(&self.record_id)?,
      track_timestmp: decode_opt_dt(self.track_timestmp.as_deref())?,
    })
  }
}

/// Raw audit columns; always read as the last four of a row.
pub struct RawMeta {
  pub created_on:  String,
  pub created_by:  Option<String>,
  pub modified_on: String,
  pub modified_by: Option<String>,
}

impl RawMeta {
  fn from_row(row: &Row<'_>, first: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      created_on:  row.get(first)?,
      created_by:  row.get(first + 1)?,
      modified_on: row.get(first + 2)?,
      modified_by: row.get(first + 3)?,
    })
  }

  fn into_meta(self) -> Result<Meta> {
    Ok(Meta {
      created_on:  decode_dt(&self.created_on)?,
      created_by:  self.created_by,
      modified_on: decode_dt(&self.modified_on)?,
      modified_by: self.modified_by,
    })
  }
}

pub const PRESENCE_COLUMNS: &str = "presence_id, track_id, timestmp, \
   location_id, interlock, created_on, created_by, modified_on, modified_by";

pub struct RawPresence {
  pub presence_id: String,
  pub track_id:    String,
  pub timestmp:    String,
  pub location_id: Option<String>,
  pub interlock:   Option<String>,
  pub meta:        RawMeta,
}

impl RawPresence {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      presence_id: row.get(0)?,
      track_id:    row.get(1)?,
      timestmp:    row.get(2)?,
      location_id: row.get(3)?,
      interlock:   row.get(4)?,
      meta:        RawMeta::from_row(row, 5)?,
    })
  }

  pub fn into_presence(self) -> Result<Presence> {
    Ok(Presence {
      presence_id: decode_uuid(&self.presence_id)?,
      track_id:    decode_uuid(&self.track_id)?,
      timestmp:    decode_dt(&self.timestmp)?,
      location_id: decode_opt_uuid(self.location_id.as_deref())?,
      interlock:   self.interlock,
      meta:        self.meta.into_meta()?,
    })
  }
}

pub const REPORT_COLUMNS: &str = "report_id, doc_id, name, organisation_id, \
   location_id, date, comments, created_on, created_by, modified_on, modified_by";

pub struct RawReport {
  pub report_id:       String,
  pub doc_id:          String,
  pub name:            String,
  pub organisation_id: Option<String>,
  pub location_id:     Option<String>,
  pub date:            Option<String>,
  pub comments:        Option<String>,
  pub meta:            RawMeta,
}

impl RawReport {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      report_id:       row.get(0)?,
      doc_id:          row.get(1)?,
      name:            row.get(2)?,
      organisation_id: row.get(3)?,
      location_id:     row.get(4)?,
      date:            row.get(5)?,
      comments:        row.get(6)?,
      meta:            RawMeta::from_row(row, 7)?,
    })
  }

  pub fn into_report(self) -> Result<SituationReport> {
    Ok(SituationReport {
      report_id:       decode_uuid(&self.report_id)?,
      doc_id:          decode_uuid(&self.doc_id)?,
      name:            self.name,
      organisation_id: decode_opt_uuid(self.organisation_id.as_deref())?,
      location_id:     decode_opt_uuid(self.location_id.as_deref())?,
      date:            self.date.as_deref().map(decode_date).transpose()?,
      comments:        self.comments,
      meta:            self.meta.into_meta()?,
    })
  }
}

/// A presence timestamp joined with its (optional) location row.
pub struct RawObservation {
  pub timestmp: String,
  pub location: Option<RawLocation>,
}

impl RawObservation {
  /// Expects `timestmp` followed by [`LOCATION_COLUMNS`] from a LEFT JOIN.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    let location_id: Option<String> = row.get(1)?;
    let location = match location_id {
      Some(location_id) => Some(RawLocation {
        location_id,
        name: row.get(2)?,
        lat:  row.get(3)?,
        lon:  row.get(4)?,
      }),
      None => None,
    };
    Ok(Self {
      timestmp: row.get(0)?,
      location,
    })
  }

  pub fn into_observation(self) -> Result<LocationObservation> {
    Ok(LocationObservation {
      timestmp: decode_dt(&self.timestmp)?,
      location: self.location.map(RawLocation::into_location).transpose()?,
    })
  }
}
