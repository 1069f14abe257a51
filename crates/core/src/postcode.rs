use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::distance::Distance;
use crate::geo::{circle_to_polygon, GeoPolygon, DEFAULT_SEGMENTS};
use crate::traits::SearchEngine;
use crate::SearchError;

static POSTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[A-Z][A-HJ-Y]?[0-9][A-Z0-9]? ?[0-9][A-Z]{2}|GIR ?0A{2}")
        .expect("postcode pattern compiles")
});

/// Returns the first UK postcode in `text` with whitespace removed, case preserved.
pub fn extract_postcode(text: &str) -> Option<String> {
    POSTCODE
        .find(text)
        .map(|found| found.as_str().split_whitespace().collect())
}

/// Turns a postcode mentioned in `term` into a search polygon.
///
/// `Ok(None)` means there is no usable geography: no postcode in the text, a postcode the
/// lookup index does not know, or a degenerate circle. Transport failures talking to the
/// engine are returned as errors.
pub async fn locate<E>(
    engine: &E,
    postcode_index: &str,
    term: &str,
    distance: Distance,
) -> Result<Option<GeoPolygon>, SearchError>
where
    E: SearchEngine + Sync + ?Sized,
{
    let Some(postcode) = extract_postcode(term) else {
        return Ok(None);
    };
    let normalized = postcode.to_lowercase();

    let Some(centre) = engine.lookup_postcode(postcode_index, &normalized).await? else {
        warn!(postcode = %normalized, "postcode not found, searching without geography");
        return Ok(None);
    };

    let radius = distance.to_metres();
    match circle_to_polygon(centre, radius, DEFAULT_SEGMENTS) {
        Ok(polygon) => {
            debug!(postcode = %normalized, radius_metres = radius, "derived search polygon");
            Ok(Some(polygon))
        }
        Err(error) => {
            warn!(postcode = %normalized, %error, "could not build search polygon");
            Ok(None)
        }
    }
}
