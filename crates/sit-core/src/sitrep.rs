//! Situation Report model (`sit_report`).
//!
//! Reports are documents: each one owns a `doc_entity` row so attachments
//! and versions can hang off its `doc_id`. They can be aggregated by
//! organisation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  crud::CrudStrings,
  fields,
  meta::{Meta, meta_fields},
  reference::DOC_ENTITY,
  schema::{FieldSpec, Schema, SchemaBuilder},
};

pub const REPORT_TABLE: &str = "sit_report";

/// Upper bound on `sit_report.name`, in characters.
pub const NAME_MAX_LEN: usize = 128;

/// A `sit_report` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationReport {
  pub report_id:       Uuid,
  pub doc_id:          Uuid,
  pub name:            String,
  pub organisation_id: Option<Uuid>,
  pub location_id:     Option<Uuid>,
  pub date:            Option<NaiveDate>,
  pub comments:        Option<String>,
  #[serde(flatten)]
  pub meta:            Meta,
}

/// Input to [`crate::store::SituationStore::create_report`] and
/// [`crate::store::SituationStore::update_report`]; an update replaces every
/// editable field.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSituationReport {
  pub name:            String,
  pub organisation_id: Option<Uuid>,
  pub location_id:     Option<Uuid>,
  pub date:            Option<NaiveDate>,
  pub comments:        Option<String>,
  /// Stored as `created_by` / `modified_by`.
  pub actor:           Option<String>,
}

impl NewSituationReport {
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name:            name.into(),
      organisation_id: None,
      location_id:     None,
      date:            None,
      comments:        None,
      actor:           None,
    }
  }

  /// Check the string fields against their registered declarations.
  pub fn validate(&self, schema: &Schema) -> Result<()> {
    schema.check(REPORT_TABLE, "name", Some(&self.name))?;
    schema.check(REPORT_TABLE, "comments", self.comments.as_deref())?;
    Ok(())
  }
}

pub fn crud_strings() -> CrudStrings {
  CrudStrings {
    label_create:        "Add Situation Report",
    title_display:       "Situation Report Details",
    title_list:          "Situation Reports",
    title_update:        "Edit Situation Report",
    title_upload:        "Import Situation Reports",
    label_list_button:   "List Situation Reports",
    label_delete_button: "Delete Situation Report",
    msg_record_created:  "Situation Report added",
    msg_record_modified: "Situation Report updated",
    msg_record_deleted:  "Situation Report deleted",
    msg_list_empty:      "No Situation Reports currently registered",
  }
}

/// Register `sit_report` and its CRUD strings.
pub fn register(b: &mut SchemaBuilder) -> Result<()> {
  let report_fields = [
    FieldSpec::id("report_id"),
    FieldSpec::super_link("doc_id", DOC_ENTITY).read_only(),
    FieldSpec::string("name", NAME_MAX_LEN).label("Name").required(),
    fields::organisation_id(),
    fields::location_id(),
    fields::date(),
    fields::comments(),
  ];
  b.define_table(REPORT_TABLE, report_fields.into_iter().chain(meta_fields()))?;
  b.crud_strings(REPORT_TABLE, crud_strings())?;
  Ok(())
}
