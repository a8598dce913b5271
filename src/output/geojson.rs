use geo::LineString;
use serde::Serialize;

use crate::geometry::Coordinate;

#[derive(Debug, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    type_: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    type_: &'static str,
    pub properties: Properties,
    pub geometry: Geometry,
}

/// GeoJSON requires a properties object; only `name` is written, and it is null.
#[derive(Debug, Default, Serialize)]
pub struct Properties {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    type_: &'static str,
    /// `[lng, lat]` pairs
    pub coordinates: Vec<[f64; 2]>,
}

impl Geometry {
    pub fn line_string(line: &LineString<f64>) -> Self {
        Self {
            type_: "LineString",
            coordinates: line.coords().map(|c| [c.x, c.y]).collect(),
        }
    }
}

impl FeatureCollection {
    /// A collection holding one LineString feature through every waypoint.
    pub fn from_waypoints(waypoints: &[Coordinate]) -> Self {
        let line: LineString<f64> = waypoints.iter().map(|&c| geo::Coord::from(c)).collect();
        Self {
            type_: "FeatureCollection",
            features: vec![Feature {
                type_: "Feature",
                properties: Properties::default(),
                geometry: Geometry::line_string(&line),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection_shape() {
        let points = vec![
            Coordinate::new(-3.186874, 55.944494),
            Coordinate::new(-3.186724, 55.944494),
        ];
        let value = serde_json::to_value(FeatureCollection::from_waypoints(&points)).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        let feature = &value["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert!(feature["properties"]["name"].is_null());
        assert_eq!(feature["geometry"]["type"], "LineString");
        assert_eq!(feature["geometry"]["coordinates"][0][0], -3.186874);
        assert_eq!(feature["geometry"]["coordinates"][0][1], 55.944494);
        assert_eq!(feature["geometry"]["coordinates"][1][0], -3.186724);
    }
}
