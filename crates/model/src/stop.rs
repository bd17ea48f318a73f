use serde::{Deserialize, Serialize};
use utility::id::HasId;

use crate::Localized;

/// Natural key of the stop that stands in for every unresolved stop reference.
pub const UNKNOWN_STOP_CODE: &str = "0001";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Natural key of the stop in the source system.
    pub code: String,
    pub geo: Geo,
    pub name: Localized,
}

impl Stop {
    /// The "stop not found" stop. Placed on the Brussels Grand-Place, which is
    /// a neutral point in the middle of the network.
    pub fn unknown() -> Self {
        Self {
            code: UNKNOWN_STOP_CODE.to_owned(),
            geo: Geo {
                latitude: 50.8468,
                longitude: 4.3524,
            },
            name: Localized::new("ARRÊT NON TROUVÉ", "STOP NIET GEVONDEN"),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.code == UNKNOWN_STOP_CODE
    }
}

impl HasId for Stop {
    type IdType = i64;
}

/// Coordinates of a stop. Not range checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub latitude: f64,
    pub longitude: f64,
}

impl Geo {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_stop_is_recognized() {
        let stop = Stop::unknown();
        assert!(stop.is_unknown());
        assert_eq!(stop.name.fr, "ARRÊT NON TROUVÉ");
        assert_eq!(stop.name.nl, "STOP NIET GEVONDEN");
    }

    #[test]
    fn geo_decodes_without_range_checks() {
        let geo: Geo =
            serde_json::from_str(r#"{"latitude": 123.5, "longitude": -999.0}"#).unwrap();
        assert_eq!(geo.latitude, 123.5);
        assert_eq!(geo.longitude, -999.0);
    }
}
