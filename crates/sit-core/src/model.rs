//! The process-wide default schema.

use std::sync::OnceLock;

use crate::{
  Result,
  reference,
  schema::{Schema, SchemaBuilder},
  situation,
  sitrep,
};

static SCHEMA: OnceLock<Schema> = OnceLock::new();

/// Register reference data, the Situation Model and the Situation Report
/// Model into a fresh registry.
pub fn try_build() -> Result<Schema> {
  let mut b = SchemaBuilder::new();
  reference::register(&mut b)?;
  situation::register(&mut b)?;
  sitrep::register(&mut b)?;
  b.build()
}

/// The default schema, built on first use and shared for the rest of the
/// process.
pub fn schema() -> Result<&'static Schema> {
  if let Some(schema) = SCHEMA.get() {
    return Ok(schema);
  }
  let built = try_build()?;
  Ok(SCHEMA.get_or_init(|| built))
}
