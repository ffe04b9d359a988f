//! Reusable field declarations shared across models.

use crate::{
  location::LOCATION_TABLE,
  reference::ORGANISATION_TABLE,
  schema::FieldSpec,
};

/// Optional reference to a GIS location.
pub fn location_id() -> FieldSpec {
  FieldSpec::reference("location_id", LOCATION_TABLE).label("Location")
}

/// Optional reference to an organisation.
pub fn organisation_id() -> FieldSpec {
  FieldSpec::reference("organisation_id", ORGANISATION_TABLE)
    .label("Organization")
}

pub fn date() -> FieldSpec { FieldSpec::date("date").label("Date") }

pub fn comments() -> FieldSpec { FieldSpec::text("comments").label("Comments") }
