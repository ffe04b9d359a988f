//! Standard audit metadata carried by every user-facing table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::FieldSpec;

/// Creation and modification stamps, set by the store on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
  pub created_on:  DateTime<Utc>,
  pub created_by:  Option<String>,
  pub modified_on: DateTime<Utc>,
  pub modified_by: Option<String>,
}

impl Meta {
  pub fn created(at: DateTime<Utc>, by: Option<String>) -> Self {
    Self {
      created_on:  at,
      created_by:  by.clone(),
      modified_on: at,
      modified_by: by,
    }
  }

  pub fn modified(&self, at: DateTime<Utc>, by: Option<String>) -> Self {
    Self {
      created_on:  self.created_on,
      created_by:  self.created_by.clone(),
      modified_on: at,
      modified_by: by,
    }
  }
}

/// Field declarations matching [`Meta`]; none are writable by callers.
pub fn meta_fields() -> [FieldSpec; 4] {
  [
    FieldSpec::datetime("created_on").read_only(),
    FieldSpec::text("created_by").read_only(),
    FieldSpec::datetime("modified_on").read_only(),
    FieldSpec::text("modified_by").read_only(),
  ]
}
