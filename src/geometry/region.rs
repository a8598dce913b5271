use geo::{BoundingRect, LineString, Rect};
use serde::{Deserialize, Deserializer};

use super::{Coordinate, GeometryError};

/// A named polygon, used both for no-fly zones and for the central area.
///
/// Vertices are listed in order; the last vertex connects back to the first.
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    vertices: Vec<Coordinate>,
    bounds: Option<Rect<f64>>,
}

impl Region {
    pub fn new(name: impl Into<String>, vertices: Vec<Coordinate>) -> Self {
        let bounds = LineString::from_iter(vertices.iter().map(|&v| geo::Coord::from(v)))
            .bounding_rect();
        Self {
            name: name.into(),
            vertices,
            bounds,
        }
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Check every vertex is a valid coordinate.
    pub fn validate(&self) -> Result<(), GeometryError> {
        self.vertices
            .iter()
            .try_for_each(|v| v.validated().map(|_| ()))
    }

    /// Point-in-polygon test.
    ///
    /// A point that equals a vertex is inside. Otherwise a ray is cast towards
    /// increasing longitude and edges that strictly straddle the point's
    /// latitude are counted; an odd count means inside. Because the crossing
    /// test uses `<`, points on a left or bottom edge count as inside and
    /// points on a right or top edge do not.
    pub fn contains(&self, point: &Coordinate) -> bool {
        if self
            .vertices
            .iter()
            .any(|v| v.lat == point.lat && v.lng == point.lng)
        {
            return true;
        }

        // Any point the ray cast could count lies within the bounding box.
        match &self.bounds {
            Some(rect) => {
                let (min, max) = (rect.min(), rect.max());
                if point.lng > max.x || point.lat < min.y || point.lat > max.y {
                    return false;
                }
            }
            None => return false,
        }

        let n = self.vertices.len();
        let mut crossings = 0usize;
        let mut j = n - 1;
        for i in 0..n {
            let v1 = &self.vertices[i];
            let v2 = &self.vertices[j];

            let straddles = (v1.lat > point.lat) != (v2.lat > point.lat);
            if straddles {
                let edge_lng =
                    (v2.lng - v1.lng) * (point.lat - v1.lat) / (v2.lat - v1.lat) + v1.lng;
                if point.lng < edge_lng {
                    crossings += 1;
                }
            }
            j = i;
        }

        crossings % 2 == 1
    }
}

#[derive(Deserialize)]
struct RawRegion {
    name: String,
    vertices: Vec<Coordinate>,
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawRegion::deserialize(deserializer)?;
        Ok(Region::new(raw.name, raw.vertices))
    }
}
