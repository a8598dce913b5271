use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Heading;
use crate::config::constants::{DRONE_IS_CLOSE_DISTANCE, DRONE_MOVE_DISTANCE};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("coordinate out of range: ({lng}, {lat})")]
    OutOfRange { lng: f64, lat: f64 },
}

/// A WGS84 position in decimal degrees.
///
/// Equality is exact floating-point equality; use [`Coordinate::is_close_to`]
/// when positions come out of arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// True if longitude is within [-180, 180] and latitude within [-90, 90].
    ///
    /// NaN components are never valid.
    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.lng) && (-90.0..=90.0).contains(&self.lat)
    }

    /// Return `self` if valid, otherwise an [`GeometryError::OutOfRange`].
    pub fn validated(self) -> Result<Self, GeometryError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(GeometryError::OutOfRange {
                lng: self.lng,
                lat: self.lat,
            })
        }
    }

    /// Euclidean distance in degrees. No geodesic correction is applied.
    pub fn distance_to(&self, other: &Coordinate) -> Result<f64, GeometryError> {
        let a = self.validated()?;
        let b = other.validated()?;
        Ok(((b.lng - a.lng).powi(2) + (b.lat - a.lat).powi(2)).sqrt())
    }

    /// True if `other` is strictly less than one move away.
    pub fn is_close_to(&self, other: &Coordinate) -> Result<bool, GeometryError> {
        Ok(self.distance_to(other)? < DRONE_IS_CLOSE_DISTANCE)
    }

    /// Position after one move along `heading`.
    ///
    /// Uses the trigonometric convention: 0° points to increasing longitude,
    /// 90° to increasing latitude. A hover leaves the position unchanged.
    pub fn step(&self, heading: Heading) -> Result<Coordinate, GeometryError> {
        let from = self.validated()?;
        let Some(degrees) = heading.bearing_degrees() else {
            return Ok(from);
        };

        let angle = degrees.to_radians();
        Ok(Coordinate {
            lng: from.lng + DRONE_MOVE_DISTANCE * angle.cos(),
            lat: from.lat + DRONE_MOVE_DISTANCE * angle.sin(),
        })
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::coord! { x: c.lng, y: c.lat }
    }
}
