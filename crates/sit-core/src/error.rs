//! Error types for `sit-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::schema::CrudMethod;

#[derive(Debug, Error)]
pub enum Error {
  // ── Registration (configuration time) ─────────────────────────────────

  #[error("table {0:?} is already defined")]
  DuplicateTable(&'static str),

  #[error("super-entity {0:?} is already defined")]
  DuplicateSuperEntity(&'static str),

  #[error("field {field:?} is declared twice on {table:?}")]
  DuplicateField {
    table: &'static str,
    field: &'static str,
  },

  #[error("super-entity {0:?} declares no instance types")]
  EmptyInstanceTypes(&'static str),

  #[error("super-entity {entity:?} lists instance type {table:?} twice")]
  DuplicateInstanceType {
    entity: &'static str,
    table:  &'static str,
  },

  #[error("unknown super-entity: {0:?}")]
  UnknownSuperEntity(String),

  #[error("{table}.{field} references unknown table {target:?}")]
  DanglingReference {
    table:  &'static str,
    field:  &'static str,
    target: &'static str,
  },

  #[error("component {component:?} of {table:?} has no matching join field")]
  DanglingComponent {
    table:     &'static str,
    component: &'static str,
  },

  #[error("crud strings registered twice for {0:?}")]
  DuplicateCrudStrings(&'static str),

  // ── Lookup and validation ─────────────────────────────────────────────

  #[error("unknown table: {0:?}")]
  UnknownTable(String),

  #[error("unknown field {field:?} on {table:?}")]
  UnknownField { table: String, field: String },

  #[error("unknown instance type: {0:?}")]
  UnknownInstanceType(String),

  #[error("{method} is not permitted on {table:?}")]
  NotPermitted {
    table:  String,
    method: CrudMethod,
  },

  #[error("{table}.{field} is longer than {max} characters (got {len})")]
  TooLong {
    table: String,
    field: String,
    max:   usize,
    len:   usize,
  },

  #[error("{table}.{field} is required")]
  Required { table: String, field: String },

  #[error("{table}.{field} is not writable")]
  NotWritable { table: String, field: String },

  // ── Records ───────────────────────────────────────────────────────────

  #[error("situation not found: {0}")]
  SituationNotFound(Uuid),

  #[error("trackable not found: {0}")]
  TrackableNotFound(Uuid),

  #[error("situation report not found: {0}")]
  ReportNotFound(Uuid),

  #[error("location not found: {0}")]
  LocationNotFound(Uuid),

  #[error("organisation not found: {0}")]
  OrganisationNotFound(Uuid),

  #[error("{instance_type} record {record_id} is already registered")]
  AlreadyRegistered {
    instance_type: &'static str,
    record_id:     Uuid,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse category of a failure, used by outer layers to pick a response
/// without knowing the concrete backend error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  /// The addressed record does not exist.
  NotFound,
  /// The input failed validation or referenced a missing row.
  Invalid,
  /// The write collides with an existing row.
  Conflict,
  /// The table configuration does not allow the operation.
  Forbidden,
  Internal,
}

/// Implemented by every error type a store can return.
pub trait Classify {
  fn class(&self) -> ErrorClass;
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Self::SituationNotFound(_)
      | Self::TrackableNotFound(_)
      | Self::ReportNotFound(_)
      | Self::UnknownTable(_) => ErrorClass::NotFound,

      Self::UnknownField { .. }
      | Self::UnknownInstanceType(_)
      | Self::TooLong { .. }
      | Self::Required { .. }
      | Self::NotWritable { .. }
      | Self::LocationNotFound(_)
      | Self::OrganisationNotFound(_) => ErrorClass::Invalid,

      Self::AlreadyRegistered { .. } => ErrorClass::Conflict,

      Self::NotPermitted { .. } => ErrorClass::Forbidden,

      Self::DuplicateTable(_)
      | Self::DuplicateSuperEntity(_)
      | Self::DuplicateField { .. }
      | Self::EmptyInstanceTypes(_)
      | Self::DuplicateInstanceType { .. }
      | Self::UnknownSuperEntity(_)
      | Self::DanglingReference { .. }
      | Self::DanglingComponent { .. }
      | Self::DuplicateCrudStrings(_) => ErrorClass::Internal,
    }
  }
}
