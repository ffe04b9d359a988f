//! SQL schema for the situation SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference data.
CREATE TABLE IF NOT EXISTS gis_location (
    location_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    lat         REAL,
    lon         REAL
);

CREATE TABLE IF NOT EXISTS org_organisation (
    organisation_id TEXT PRIMARY KEY,
    name            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS doc_entity (
    doc_id        TEXT PRIMARY KEY,
    instance_type TEXT NOT NULL
);

-- Super-entities. record_id points at the concrete row, which lives in a
-- table owned by another module.
CREATE TABLE IF NOT EXISTS sit_situation (
    sit_id        TEXT PRIMARY KEY,
    instance_type TEXT NOT NULL,   -- 'irs_incident' | 'rms_req' | 'pr_presence'
    record_id     TEXT NOT NULL,
    datetime      TEXT,
    location_id   TEXT REFERENCES gis_location(location_id),
    UNIQUE (instance_type, record_id)
);

CREATE TABLE IF NOT EXISTS sit_trackable (
    track_id       TEXT PRIMARY KEY,
    instance_type  TEXT NOT NULL,
    record_id      TEXT NOT NULL,
    track_timestmp TEXT,           -- latest presence; tracking API only
    UNIQUE (instance_type, record_id)
);

-- Written only by the tracking API.
CREATE TABLE IF NOT EXISTS sit_presence (
    presence_id TEXT PRIMARY KEY,
    track_id    TEXT NOT NULL REFERENCES sit_trackable(track_id) ON DELETE CASCADE,
    timestmp    TEXT NOT NULL,
    location_id TEXT REFERENCES gis_location(location_id),
    interlock   TEXT,
    created_on  TEXT NOT NULL,
    created_by  TEXT,
    modified_on TEXT NOT NULL,
    modified_by TEXT
);

CREATE TABLE IF NOT EXISTS sit_report (
    report_id       TEXT PRIMARY KEY,
    doc_id          TEXT NOT NULL UNIQUE REFERENCES doc_entity(doc_id),
    name            TEXT NOT NULL,
    organisation_id TEXT REFERENCES org_organisation(organisation_id),
    location_id     TEXT REFERENCES gis_location(location_id),
    date            TEXT,          -- YYYY-MM-DD
    comments        TEXT,
    created_on      TEXT NOT NULL,
    created_by      TEXT,
    modified_on     TEXT NOT NULL,
    modified_by     TEXT
);

CREATE INDEX IF NOT EXISTS sit_presence_track_idx ON sit_presence(track_id, timestmp);
CREATE INDEX IF NOT EXISTS sit_report_org_idx     ON sit_report(organisation_id);

PRAGMA user_version = 1;
";
