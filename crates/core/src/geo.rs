//! Circle approximation on the WGS84 sphere and the shapes sent to `geo_shape` clauses.

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use crate::SearchError;

pub const DEFAULT_SEGMENTS: usize = 20;

const EARTH_RADIUS_METRES: f64 = 6_378_137.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// A single closed ring polygon, `(lon, lat)` ordered and counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPolygon {
    ring: Vec<Coordinate>,
}

impl GeoPolygon {
    pub fn ring(&self) -> &[Coordinate] {
        &self.ring
    }
}

impl Serialize for GeoPolygon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Ring<'a>(&'a [Coordinate]);

        impl Serialize for Ring<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
                for point in self.0 {
                    seq.serialize_element(&[point.lon, point.lat])?;
                }
                seq.end()
            }
        }

        let mut shape = serializer.serialize_struct("GeoPolygon", 2)?;
        shape.serialize_field("type", "polygon")?;
        shape.serialize_field("coordinates", &[Ring(&self.ring)])?;
        shape.end()
    }
}

/// Geometry as stored on an indexed document, passed through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeoLocation {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeoShape {
    Polygon(GeoPolygon),
    Stored(GeoLocation),
}

impl From<GeoPolygon> for GeoShape {
    fn from(polygon: GeoPolygon) -> Self {
        Self::Polygon(polygon)
    }
}

impl From<GeoLocation> for GeoShape {
    fn from(location: GeoLocation) -> Self {
        Self::Stored(location)
    }
}

/// Approximates a circle of `radius_metres` around `centre` with `segments` points.
///
/// Each vertex is the great-circle destination from the centre along an evenly spaced
/// bearing, so the longitude spread widens with `1 / cos(latitude)`. The first vertex is
/// repeated at the end to close the ring, giving `segments + 1` coordinates.
pub fn circle_to_polygon(
    centre: Coordinate,
    radius_metres: f64,
    segments: usize,
) -> Result<GeoPolygon, SearchError> {
    if segments < 3 {
        return Err(SearchError::InvalidGeometry(format!(
            "a circle needs at least 3 segments, got {segments}"
        )));
    }
    if !radius_metres.is_finite() || radius_metres <= 0.0 {
        return Err(SearchError::InvalidGeometry(format!(
            "radius must be a positive number of metres, got {radius_metres}"
        )));
    }
    if !(-90.0..=90.0).contains(&centre.lat) || !(-180.0..=180.0).contains(&centre.lon) {
        return Err(SearchError::InvalidGeometry(format!(
            "centre ({}, {}) is not a valid coordinate",
            centre.lat, centre.lon
        )));
    }

    let mut ring: Vec<Coordinate> = (0..segments)
        .map(|step| {
            let bearing = -2.0 * std::f64::consts::PI * step as f64 / segments as f64;
            offset(centre, radius_metres, bearing)
        })
        .collect();
    ring.push(ring[0]);

    Ok(GeoPolygon { ring })
}

fn offset(centre: Coordinate, distance: f64, bearing: f64) -> Coordinate {
    let lat1 = centre.lat.to_radians();
    let lon1 = centre.lon.to_radians();
    let angular = distance / EARTH_RADIUS_METRES;

    let lat = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat.sin());

    Coordinate {
        lat: lat.to_degrees(),
        lon: wrap_longitude(lon.to_degrees()),
    }
}

/// Folds a longitude back into `[-180, 180)` after crossing the antimeridian.
fn wrap_longitude(lon: f64) -> f64 {
    (lon + 540.0).rem_euclid(360.0) - 180.0
}
