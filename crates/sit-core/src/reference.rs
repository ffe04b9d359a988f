//! Reference data consumed by the situation models: locations,
//! organisations, and the generic document super-entity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  location::LOCATION_TABLE,
  schema::{FieldSpec, InstanceType, SchemaBuilder},
};

pub const ORGANISATION_TABLE: &str = "org_organisation";

/// Super-entity giving documents a shared `doc_id` for attachments and
/// versioning.
pub const DOC_ENTITY: &str = "doc_entity";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organisation {
  pub organisation_id: Uuid,
  pub name:            String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrganisation {
  pub name: String,
}

pub fn register(b: &mut SchemaBuilder) -> Result<()> {
  b.define_table(LOCATION_TABLE, [
    FieldSpec::id("location_id"),
    FieldSpec::string("name", 128).label("Name").required(),
    FieldSpec::float("lat").label("Latitude"),
    FieldSpec::float("lon").label("Longitude"),
  ])?;

  b.define_table(ORGANISATION_TABLE, [
    FieldSpec::id("organisation_id"),
    FieldSpec::string("name", 128).label("Name").required(),
  ])?;

  b.super_entity(
    DOC_ENTITY,
    "doc_id",
    [
      InstanceType { table: "doc_document", label: "Document" },
      InstanceType { table: "doc_image", label: "Image" },
      InstanceType { table: crate::sitrep::REPORT_TABLE, label: "Situation Report" },
    ],
    Vec::new(),
  )?;

  Ok(())
}
