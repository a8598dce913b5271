use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::config::constants::HOVER_ANGLE;

/// Number of compass directions a drone can move in.
pub const DIRECTION_COUNT: u8 = 16;

/// Angle between two adjacent compass directions.
pub const DIRECTION_SPACING: f64 = 360.0 / DIRECTION_COUNT as f64;

/// Direction of a single move.
///
/// A move is either one of 16 evenly spaced bearings (stored by index, so
/// 0 = 0°, 1 = 22.5°, ... 15 = 337.5°) or a hover, which marks a pause at a
/// turnaround point and never changes position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    Bearing(u8),
    Hover,
}

impl Heading {
    /// All 16 bearings in enumeration order. The search tries neighbours in
    /// this order, which fixes its tie-breaking.
    pub const ALL: [Heading; DIRECTION_COUNT as usize] = {
        let mut all = [Heading::Hover; DIRECTION_COUNT as usize];
        let mut i = 0;
        while i < DIRECTION_COUNT {
            all[i as usize] = Heading::Bearing(i);
            i += 1;
        }
        all
    };

    /// Parse an angle in degrees. Accepts the 16 bearings (any multiple of
    /// 22.5°, normalised into [0, 360)) and the hover angle.
    fn from_degrees(degrees: f64) -> Option<Heading> {
        if degrees == HOVER_ANGLE {
            return Some(Heading::Hover);
        }
        let index = degrees / DIRECTION_SPACING;
        if !index.is_finite() || index.fract() != 0.0 {
            return None;
        }
        let index = (index as i64).rem_euclid(DIRECTION_COUNT as i64) as u8;
        Some(Heading::Bearing(index))
    }

    /// Bearing in degrees, or `None` for a hover.
    pub fn bearing_degrees(&self) -> Option<f64> {
        match self {
            Heading::Bearing(index) => Some(*index as f64 * DIRECTION_SPACING),
            Heading::Hover => None,
        }
    }

    /// Angle as written to output files: the bearing, or 999 for a hover.
    pub fn degrees(&self) -> f64 {
        self.bearing_degrees().unwrap_or(HOVER_ANGLE)
    }

    /// The opposite direction (180° further, wrapped into [0, 360)).
    pub fn reversed(&self) -> Heading {
        match self {
            Heading::Bearing(index) => {
                Heading::Bearing((index + DIRECTION_COUNT / 2) % DIRECTION_COUNT)
            }
            Heading::Hover => Heading::Hover,
        }
    }

    pub fn is_hover(&self) -> bool {
        matches!(self, Heading::Hover)
    }
}

impl Serialize for Heading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.degrees())
    }
}

/// Reads the angle column of a flightpath file back into a heading.
impl<'de> Deserialize<'de> for Heading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let degrees = f64::deserialize(deserializer)?;
        Heading::from_degrees(degrees)
            .ok_or_else(|| de::Error::custom(format!("not a move angle: {}", degrees)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_headings_in_order() {
        let degrees: Vec<f64> = Heading::ALL.iter().map(|h| h.degrees()).collect();
        assert_eq!(degrees.len(), 16);
        assert_eq!(degrees[0], 0.0);
        assert_eq!(degrees[1], 22.5);
        assert_eq!(degrees[4], 90.0);
        assert_eq!(degrees[15], 337.5);
    }

    #[test]
    fn test_reversed_wraps() {
        let h = Heading::from_degrees(337.5).unwrap();
        assert_eq!(h.reversed().degrees(), 157.5);
        assert_eq!(Heading::from_degrees(0.0).unwrap().reversed().degrees(), 180.0);
        assert_eq!(Heading::Hover.reversed(), Heading::Hover);
    }

    #[test]
    fn test_from_degrees() {
        assert_eq!(Heading::from_degrees(45.0), Some(Heading::Bearing(2)));
        assert_eq!(Heading::from_degrees(360.0), Some(Heading::Bearing(0)));
        assert_eq!(Heading::from_degrees(517.5), Some(Heading::Bearing(7)));
        assert_eq!(Heading::from_degrees(999.0), Some(Heading::Hover));
        assert_eq!(Heading::from_degrees(10.0), None);
        assert_eq!(Heading::from_degrees(f64::NAN), None);
    }

    #[test]
    fn test_serialize_as_degrees() {
        assert_eq!(serde_json::to_string(&Heading::Bearing(3)).unwrap(), "67.5");
        assert_eq!(serde_json::to_string(&Heading::Hover).unwrap(), "999.0");
    }

    #[test]
    fn test_deserialize_angles() {
        let headings: Vec<Heading> = serde_json::from_str("[0.0, 67.5, 337.5, 999.0]").unwrap();
        assert_eq!(
            headings,
            vec![
                Heading::Bearing(0),
                Heading::Bearing(3),
                Heading::Bearing(15),
                Heading::Hover
            ]
        );
        assert!(serde_json::from_str::<Heading>("10.0").is_err());
    }
}
