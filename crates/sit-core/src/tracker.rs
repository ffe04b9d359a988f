//! The location-history lookup consumed by the `sit_location` virtual field.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{location::Location, situation::TrackableType};

/// One entry of a trackable's location history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationObservation {
  pub timestmp: DateTime<Utc>,
  pub location: Option<Location>,
}

/// Resolves where a trackable record has been seen.
///
/// Records are addressed by their concrete table and id. A record that was
/// never registered as trackable simply has no history.
pub trait Tracker: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All observations for the record, oldest first.
  fn location_history(
    &self,
    instance_type: TrackableType,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Vec<LocationObservation>, Self::Error>> + Send + '_;

  /// The location of the most recent observation not dated in the future.
  ///
  /// `None` when there is no such observation or when it carries no
  /// location; older observations are never consulted.
  fn current_location(
    &self,
    instance_type: TrackableType,
    record_id: Uuid,
  ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send + '_ {
    async move {
      let history = self.location_history(instance_type, record_id).await?;
      let now = Utc::now();
      Ok(
        history
          .into_iter()
          .rev()
          .find(|o| o.timestmp <= now)
          .and_then(|o| o.location),
      )
    }
  }
}
