//! Human-readable labels and messages shown by CRUD views of a table.

use serde::Serialize;

/// The label set registered per table with
/// [`SchemaBuilder::crud_strings`](crate::schema::SchemaBuilder::crud_strings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrudStrings {
  pub label_create:        &'static str,
  pub title_display:       &'static str,
  pub title_list:          &'static str,
  pub title_update:        &'static str,
  pub title_upload:        &'static str,
  pub label_list_button:   &'static str,
  pub label_delete_button: &'static str,
  pub msg_record_created:  &'static str,
  pub msg_record_modified: &'static str,
  pub msg_record_deleted:  &'static str,
  pub msg_list_empty:      &'static str,
}
