use serde::Serialize;

use crate::SearchError;

pub const DEFAULT_DISTANCE: &str = "0.1,km";

const METRES_PER_KILOMETRE: f64 = 1000.0;
const METRES_PER_MILE: f64 = 1609.34;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Kilometres,
    Miles,
}

impl DistanceUnit {
    fn parse(unit: &str) -> Option<Self> {
        match unit {
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
                Some(Self::Kilometres)
            }
            "m" | "mile" | "miles" => Some(Self::Miles),
            _ => None,
        }
    }

    fn metres(self) -> f64 {
        match self {
            Self::Kilometres => METRES_PER_KILOMETRE,
            Self::Miles => METRES_PER_MILE,
        }
    }
}

/// A search radius such as `"10,km"` or `"2.5,miles"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Default for Distance {
    fn default() -> Self {
        Self {
            value: 0.1,
            unit: DistanceUnit::Kilometres,
        }
    }
}

impl Distance {
    /// Parses `"<number>,<unit>"`; an empty string means [`DEFAULT_DISTANCE`].
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        let input = if raw.is_empty() { DEFAULT_DISTANCE } else { raw };
        let invalid = || SearchError::InvalidDistance(input.to_string());

        let lowered = input.to_lowercase();
        let mut segments = lowered.split(',');
        let (Some(value), Some(unit), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(invalid());
        };

        let value: f64 = value.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }
        let unit = DistanceUnit::parse(unit.trim()).ok_or_else(invalid)?;

        Ok(Self { value, unit })
    }

    pub fn to_metres(self) -> f64 {
        self.value * self.unit.metres()
    }
}

/// Spatial relation used by `geo_shape` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoRelation {
    #[default]
    Intersects,
    Within,
}

impl GeoRelation {
    /// Parses a relation name case-insensitively; empty input means `intersects`.
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        if raw.is_empty() {
            return Ok(Self::default());
        }
        match raw.to_lowercase().as_str() {
            "intersects" => Ok(Self::Intersects),
            "within" => Ok(Self::Within),
            _ => Err(SearchError::InvalidRelation(raw.to_string())),
        }
    }
}
