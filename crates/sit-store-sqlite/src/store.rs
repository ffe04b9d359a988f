//! [`SqliteStore`]: the SQLite implementation of [`SituationStore`] and
//! [`Tracker`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use sit_core::{
  location::{LOCATION_TABLE, Location, NewLocation},
  meta::Meta,
  model,
  reference::{NewOrganisation, ORGANISATION_TABLE, Organisation},
  schema::Schema,
  situation::{
    NewPresence, NewSituation, Presence, Situation, SituationType, Trackable,
    TrackableType,
  },
  sitrep::{NewSituationReport, REPORT_TABLE, SituationReport},
  store::SituationStore,
  tracker::{LocationObservation, Tracker},
};

use crate::{
  Error, Result,
  encode::{
    LOCATION_COLUMNS, ORGANISATION_COLUMNS, PRESENCE_COLUMNS, REPORT_COLUMNS,
    RawLocation, RawObservation, RawOrganisation, RawPresence, RawReport,
    RawSituation, RawTrackable, SITUATION_COLUMNS, TRACKABLE_COLUMNS,
    encode_date, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// Stored timestamps carry microseconds; anything finer would not survive a
/// round trip.
fn stamp(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

fn now() -> DateTime<Utc> { stamp(Utc::now()) }

/// Whether `e` is a UNIQUE constraint failure.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A situation store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  schema: &'static Schema,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, schema: model::schema()? };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened situation store");
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, schema: model::schema()? };
    store.init_schema().await?;
    Ok(store)
  }

  /// The registry this store validates writes against.
  pub fn schema(&self) -> &'static Schema { self.schema }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Whether a row with primary key `id` exists in `table`.
  async fn exists(
    &self,
    table: &'static str,
    key: &'static str,
    id: Uuid,
  ) -> Result<bool> {
    let id_str = encode_uuid(id);
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT 1 FROM {table} WHERE {key} = ?1"),
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  /// Reject references to reference-data rows that do not exist.
  async fn check_references(
    &self,
    location_id: Option<Uuid>,
    organisation_id: Option<Uuid>,
  ) -> Result<()> {
    if let Some(id) = location_id {
      if !self.exists(LOCATION_TABLE, "location_id", id).await? {
        return Err(sit_core::Error::LocationNotFound(id).into());
      }
    }
    if let Some(id) = organisation_id {
      if !self.exists(ORGANISATION_TABLE, "organisation_id", id).await? {
        return Err(sit_core::Error::OrganisationNotFound(id).into());
      }
    }
    Ok(())
  }
}

// ─── SituationStore impl ─────────────────────────────────────────────────────

impl SituationStore for SqliteStore {
  type Error = Error;

  // ── Reference data ────────────────────────────────────────────────────────

  async fn add_location(&self, input: NewLocation) -> Result<Location> {
    self.schema.check(LOCATION_TABLE, "name", Some(&input.name))?;

    let location = Location {
      location_id: Uuid::new_v4(),
      name:        input.name,
      lat:         input.lat,
      lon:         input.lon,
    };

    let id_str = encode_uuid(location.location_id);
    let name   = location.name.clone();
    let (lat, lon) = (location.lat, location.lon);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO gis_location (location_id, name, lat, lon)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, lat, lon],
        )?;
        Ok(())
      })
      .await?;

    Ok(location)
  }

  async fn get_location(&self, id: Uuid) -> Result<Option<Location>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawLocation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {LOCATION_COLUMNS} FROM gis_location WHERE location_id = ?1"
              ),
              rusqlite::params![id_str],
              RawLocation::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLocation::into_location).transpose()
  }

  async fn list_locations(&self) -> Result<Vec<Location>> {
    let raws: Vec<RawLocation> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LOCATION_COLUMNS} FROM gis_location ORDER BY name"
        ))?;
        let rows = stmt
          .query_map([], RawLocation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLocation::into_location).collect()
  }

  async fn add_organisation(&self, input: NewOrganisation) -> Result<Organisation> {
    self.schema.check(ORGANISATION_TABLE, "name", Some(&input.name))?;

    let organisation = Organisation {
      organisation_id: Uuid::new_v4(),
      name:            input.name,
    };

    let id_str = encode_uuid(organisation.organisation_id);
    let name   = organisation.name.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO org_organisation (organisation_id, name) VALUES (?1, ?2)",
          rusqlite::params![id_str, name],
        )?;
        Ok(())
      })
      .await?;

    Ok(organisation)
  }

  async fn get_organisation(&self, id: Uuid) -> Result<Option<Organisation>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawOrganisation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ORGANISATION_COLUMNS} FROM org_organisation
                 WHERE organisation_id = ?1"
              ),
              rusqlite::params![id_str],
              RawOrganisation::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawOrganisation::into_organisation).transpose()
  }

  async fn list_organisations(&self) -> Result<Vec<Organisation>> {
    let raws: Vec<RawOrganisation> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ORGANISATION_COLUMNS} FROM org_organisation ORDER BY name"
        ))?;
        let rows = stmt
          .query_map([], RawOrganisation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOrganisation::into_organisation).collect()
  }

  // ── Situation super-entity ────────────────────────────────────────────────

  async fn register_situation(&self, input: NewSituation) -> Result<Situation> {
    self.check_references(input.location_id, None).await?;

    let situation = Situation {
      sit_id:        Uuid::new_v4(),
      instance_type: input.instance_type,
      record_id:     input.record_id,
      datetime:      input.datetime.map(stamp),
      location_id:   input.location_id,
    };

    let sit_id_str   = encode_uuid(situation.sit_id);
    let type_str     = situation.instance_type.table();
    let record_str   = encode_uuid(situation.record_id);
    let datetime_str = situation.datetime.map(encode_dt);
    let location_str = situation.location_id.map(encode_uuid);

    // UNIQUE(instance_type, record_id) settles concurrent registrations.
    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO sit_situation (sit_id, instance_type, record_id, datetime, location_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![sit_id_str, type_str, record_str, datetime_str, location_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(
        sit_core::Error::AlreadyRegistered {
          instance_type: situation.instance_type.table(),
          record_id:     situation.record_id,
        }
        .into(),
      );
    }

    tracing::debug!(
      sit_id = %situation.sit_id,
      instance_type = %situation.instance_type,
      "registered situation"
    );
    Ok(situation)
  }

  async fn get_situation(&self, sit_id: Uuid) -> Result<Option<Situation>> {
    let id_str = encode_uuid(sit_id);

    let raw: Option<RawSituation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SITUATION_COLUMNS} FROM sit_situation WHERE sit_id = ?1"),
              rusqlite::params![id_str],
              RawSituation::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSituation::into_situation).transpose()
  }

  async fn find_situation(
    &self,
    instance_type: SituationType,
    record_id: Uuid,
  ) -> Result<Option<Situation>> {
    let type_str   = instance_type.table();
    let record_str = encode_uuid(record_id);

    let raw: Option<RawSituation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SITUATION_COLUMNS} FROM sit_situation
                 WHERE instance_type = ?1 AND record_id = ?2"
              ),
              rusqlite::params![type_str, record_str],
              RawSituation::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSituation::into_situation).transpose()
  }

  async fn list_situations(
    &self,
    instance_type: Option<SituationType>,
  ) -> Result<Vec<Situation>> {
    let type_str = instance_type.map(SituationType::table);

    let raws: Vec<RawSituation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SITUATION_COLUMNS} FROM sit_situation
           WHERE ?1 IS NULL OR instance_type = ?1
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![type_str], RawSituation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSituation::into_situation).collect()
  }

  async fn unregister_situation(&self, sit_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(sit_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sit_situation WHERE sit_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(sit_core::Error::SituationNotFound(sit_id).into());
    }
    tracing::debug!(%sit_id, "unregistered situation");
    Ok(())
  }

  // ── Trackable super-entity ────────────────────────────────────────────────

  async fn register_trackable(
    &self,
    instance_type: TrackableType,
    record_id: Uuid,
  ) -> Result<Trackable> {
    let trackable = Trackable {
      track_id: Uuid::new_v4(),
      instance_type,
      record_id,
      track_timestmp: None,
    };

    let track_id_str = encode_uuid(trackable.track_id);
    let type_str     = instance_type.table();
    let record_str   = encode_uuid(record_id);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO sit_trackable (track_id, instance_type, record_id)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![track_id_str, type_str, record_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(
        sit_core::Error::AlreadyRegistered {
          instance_type: instance_type.table(),
          record_id,
        }
        .into(),
      );
    }

    tracing::debug!(
      track_id = %trackable.track_id,
      %instance_type,
      "registered trackable"
    );
    Ok(trackable)
  }

  async fn get_trackable(&self, track_id: Uuid) -> Result<Option<Trackable>> {
    let id_str = encode_uuid(track_id);

    let raw: Option<RawTrackable> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TRACKABLE_COLUMNS} FROM sit_trackable WHERE track_id = ?1"),
              rusqlite::params![id_str],
              RawTrackable::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTrackable::into_trackable).transpose()
  }

  async fn find_trackable(
    &self,
    instance_type: TrackableType,
    record_id: Uuid,
  ) -> Result<Option<Trackable>> {
    let type_str   = instance_type.table();
    let record_str = encode_uuid(record_id);

    let raw: Option<RawTrackable> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {TRACKABLE_COLUMNS} FROM sit_trackable
                 WHERE instance_type = ?1 AND record_id = ?2"
              ),
              rusqlite::params![type_str, record_str],
              RawTrackable::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTrackable::into_trackable).transpose()
  }

  async fn list_trackables(
    &self,
    instance_type: Option<TrackableType>,
  ) -> Result<Vec<Trackable>> {
    let type_str = instance_type.map(TrackableType::table);

    let raws: Vec<RawTrackable> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TRACKABLE_COLUMNS} FROM sit_trackable
           WHERE ?1 IS NULL OR instance_type = ?1
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![type_str], RawTrackable::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTrackable::into_trackable).collect()
  }

  async fn unregister_trackable(&self, track_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(track_id);

    // Presence rows go with it through ON DELETE CASCADE.
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sit_trackable WHERE track_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if removed == 0 {
      return Err(sit_core::Error::TrackableNotFound(track_id).into());
    }
    tracing::debug!(%track_id, "unregistered trackable");
    Ok(())
  }

  // ── Tracking API ──────────────────────────────────────────────────────────

  async fn record_presence(&self, input: NewPresence) -> Result<Presence> {
    if self.get_trackable(input.track_id).await?.is_none() {
      return Err(sit_core::Error::TrackableNotFound(input.track_id).into());
    }
    self.check_references(input.location_id, None).await?;

    let now = now();
    let presence = Presence {
      presence_id: Uuid::new_v4(),
      track_id:    input.track_id,
      timestmp:    input.timestmp.map(stamp).unwrap_or(now),
      location_id: input.location_id,
      interlock:   input.interlock,
      meta:        Meta::created(now, input.actor),
    };

    let presence_id_str = encode_uuid(presence.presence_id);
    let track_id_str    = encode_uuid(presence.track_id);
    let timestmp_str    = encode_dt(presence.timestmp);
    let location_str    = presence.location_id.map(encode_uuid);
    let interlock       = presence.interlock.clone();
    let created_on_str  = encode_dt(presence.meta.created_on);
    let created_by      = presence.meta.created_by.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO sit_presence (
             presence_id, track_id, timestmp, location_id, interlock,
             created_on, created_by, modified_on, modified_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?6, ?7)",
          rusqlite::params![
            presence_id_str,
            track_id_str,
            timestmp_str,
            location_str,
            interlock,
            created_on_str,
            created_by,
          ],
        )?;
        // Late-arriving observations must not move the timestamp backwards.
        tx.execute(
          "UPDATE sit_trackable SET track_timestmp = ?2
           WHERE track_id = ?1
             AND (track_timestmp IS NULL OR track_timestmp < ?2)",
          rusqlite::params![track_id_str, timestmp_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      presence_id = %presence.presence_id,
      track_id = %presence.track_id,
      "recorded presence"
    );
    Ok(presence)
  }

  async fn presence_history(&self, track_id: Uuid) -> Result<Vec<Presence>> {
    let id_str = encode_uuid(track_id);

    let raws: Vec<RawPresence> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PRESENCE_COLUMNS} FROM sit_presence
           WHERE track_id = ?1
           ORDER BY timestmp, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawPresence::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPresence::into_presence).collect()
  }

  // ── Situation reports ─────────────────────────────────────────────────────

  async fn create_report(&self, input: NewSituationReport) -> Result<SituationReport> {
    input.validate(self.schema)?;
    self
      .check_references(input.location_id, input.organisation_id)
      .await?;

    let report = SituationReport {
      report_id:       Uuid::new_v4(),
      doc_id:          Uuid::new_v4(),
      name:            input.name,
      organisation_id: input.organisation_id,
      location_id:     input.location_id,
      date:            input.date,
      comments:        input.comments,
      meta:            Meta::created(now(), input.actor),
    };

    let report_id_str  = encode_uuid(report.report_id);
    let doc_id_str     = encode_uuid(report.doc_id);
    let name           = report.name.clone();
    let org_str        = report.organisation_id.map(encode_uuid);
    let location_str   = report.location_id.map(encode_uuid);
    let date_str       = report.date.map(encode_date);
    let comments       = report.comments.clone();
    let created_on_str = encode_dt(report.meta.created_on);
    let created_by     = report.meta.created_by.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO doc_entity (doc_id, instance_type) VALUES (?1, ?2)",
          rusqlite::params![doc_id_str, REPORT_TABLE],
        )?;
        tx.execute(
          "INSERT INTO sit_report (
             report_id, doc_id, name, organisation_id, location_id, date,
             comments, created_on, created_by, modified_on, modified_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?8, ?9)",
          rusqlite::params![
            report_id_str,
            doc_id_str,
            name,
            org_str,
            location_str,
            date_str,
            comments,
            created_on_str,
            created_by,
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(report_id = %report.report_id, "created situation report");
    Ok(report)
  }

  async fn get_report(&self, report_id: Uuid) -> Result<Option<SituationReport>> {
    let id_str = encode_uuid(report_id);

    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {REPORT_COLUMNS} FROM sit_report WHERE report_id = ?1"),
              rusqlite::params![id_str],
              RawReport::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReport::into_report).transpose()
  }

  async fn list_reports(&self) -> Result<Vec<SituationReport>> {
    let raws: Vec<RawReport> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REPORT_COLUMNS} FROM sit_report ORDER BY created_on, rowid"
        ))?;
        let rows = stmt
          .query_map([], RawReport::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReport::into_report).collect()
  }

  async fn update_report(
    &self,
    report_id: Uuid,
    input: NewSituationReport,
  ) -> Result<SituationReport> {
    input.validate(self.schema)?;
    self
      .check_references(input.location_id, input.organisation_id)
      .await?;

    let report_id_str   = encode_uuid(report_id);
    let org_str         = input.organisation_id.map(encode_uuid);
    let location_str    = input.location_id.map(encode_uuid);
    let date_str        = input.date.map(encode_date);
    let modified_on_str = encode_dt(now());
    let NewSituationReport { name, comments, actor, .. } = input;

    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE sit_report SET
             name = ?2, organisation_id = ?3, location_id = ?4, date = ?5,
             comments = ?6, modified_on = ?7, modified_by = ?8
           WHERE report_id = ?1",
          rusqlite::params![
            report_id_str,
            name,
            org_str,
            location_str,
            date_str,
            comments,
            modified_on_str,
            actor,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(
          &format!("SELECT {REPORT_COLUMNS} FROM sit_report WHERE report_id = ?1"),
          rusqlite::params![report_id_str],
          RawReport::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    let report = raw
      .ok_or(sit_core::Error::ReportNotFound(report_id))?
      .into_report()?;

    tracing::debug!(%report_id, "updated situation report");
    Ok(report)
  }

  async fn delete_report(&self, report_id: Uuid) -> Result<()> {
    let report_id_str = encode_uuid(report_id);

    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let doc_id: Option<String> = tx
          .query_row(
            "SELECT doc_id FROM sit_report WHERE report_id = ?1",
            rusqlite::params![report_id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(doc_id) = doc_id else {
          return Ok(false);
        };
        tx.execute(
          "DELETE FROM sit_report WHERE report_id = ?1",
          rusqlite::params![report_id_str],
        )?;
        tx.execute(
          "DELETE FROM doc_entity WHERE doc_id = ?1",
          rusqlite::params![doc_id],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !removed {
      return Err(sit_core::Error::ReportNotFound(report_id).into());
    }
    tracing::debug!(%report_id, "deleted situation report");
    Ok(())
  }
}

// ─── Tracker impl ────────────────────────────────────────────────────────────

impl Tracker for SqliteStore {
  type Error = Error;

  async fn location_history(
    &self,
    instance_type: TrackableType,
    record_id: Uuid,
  ) -> Result<Vec<LocationObservation>> {
    let type_str   = instance_type.table();
    let record_str = encode_uuid(record_id);

    let raws: Vec<RawObservation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.timestmp, l.location_id, l.name, l.lat, l.lon
           FROM sit_presence p
           JOIN sit_trackable t     ON t.track_id    = p.track_id
           LEFT JOIN gis_location l ON l.location_id = p.location_id
           WHERE t.instance_type = ?1 AND t.record_id = ?2
           ORDER BY p.timestmp, p.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![type_str, record_str], RawObservation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawObservation::into_observation).collect()
  }
}
