//! GIS locations and their human-readable representation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const LOCATION_TABLE: &str = "gis_location";

/// A named place, optionally with coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub location_id: Uuid,
  pub name:        String,
  pub lat:         Option<f64>,
  pub lon:         Option<f64>,
}

/// Input to [`crate::store::SituationStore::add_location`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewLocation {
  pub name: String,
  #[serde(default)]
  pub lat:  Option<f64>,
  #[serde(default)]
  pub lon:  Option<f64>,
}

impl NewLocation {
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      lat:  None,
      lon:  None,
    }
  }
}

// ─── Representation ──────────────────────────────────────────────────────────

/// Turns an optional location into display text.
pub trait LocationRepresent: Send + Sync {
  /// Must not fail; `None` maps to a placeholder.
  fn represent(&self, location: Option<&Location>) -> String;
}

/// Default formatter: `Name (lat, lon)`, or just `Name` without
/// coordinates.
#[derive(Debug, Clone)]
pub struct GisLocationRepresent {
  /// Shown when there is no location.
  pub none: String,
}

impl Default for GisLocationRepresent {
  fn default() -> Self { Self { none: "-".to_owned() } }
}

impl LocationRepresent for GisLocationRepresent {
  fn represent(&self, location: Option<&Location>) -> String {
    let Some(location) = location else {
      return self.none.clone();
    };
    match (location.lat, location.lon) {
      (Some(lat), Some(lon)) => {
        format!("{} ({lat:.4}, {lon:.4})", location.name)
      }
      _ => location.name.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn loc(lat: Option<f64>, lon: Option<f64>) -> Location {
    Location {
      location_id: Uuid::new_v4(),
      name: "Port-au-Prince".into(),
      lat,
      lon,
    }
  }

  #[test]
  fn represents_missing_location_as_placeholder() {
    assert_eq!(GisLocationRepresent::default().represent(None), "-");
    let custom = GisLocationRepresent { none: String::new() };
    assert_eq!(custom.represent(None), "");
  }

  #[test]
  fn represents_name_and_coordinates() {
    let r = GisLocationRepresent::default();
    assert_eq!(
      r.represent(Some(&loc(Some(18.5944), Some(-72.3074)))),
      "Port-au-Prince (18.5944, -72.3074)"
    );
    assert_eq!(r.represent(Some(&loc(Some(18.5), None))), "Port-au-Prince");
  }
}
