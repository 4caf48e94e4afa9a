use anyhow::Result;

use crate::preference_db::PreferenceStore;
use crate::route::{GeoPoint, Route};
use crate::utils::split_dropping_trailing_empty;

const POINT_SEPARATOR: char = ';';
const FIELD_SEPARATOR: char = ',';

/* The persisted route is a single preference string:

    <lat>,<lng>;<lat>,<lng>;...

with a trailing `;`, no escaping and no version field. Changing this format
silently drops old data on load (segments without exactly two fields are
skipped), so don't.
*/

// Shortest representation that parses back to the same `f64`, whole numbers
// keep their `.0` (`55.0`, not `55`).
fn format_coordinate(value: f64) -> String {
    format!("{value:?}")
}

pub fn encode_route(points: &[GeoPoint]) -> String {
    let mut route_data = String::new();
    for point in points {
        route_data.push_str(&format_coordinate(point.latitude));
        route_data.push(FIELD_SEPARATOR);
        route_data.push_str(&format_coordinate(point.longitude));
        route_data.push(POINT_SEPARATOR);
    }
    route_data
}

fn parse_coordinate(field: &str, segment: &str) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|e| anyhow!("invalid number {:?} in route segment {:?}: {}", field, segment, e))
}

// NOTE: a non-numeric field fails the whole decode, while a segment with the
// wrong field count is only skipped.
pub fn decode_route(route_data: &str) -> Result<Vec<GeoPoint>> {
    let mut points = Vec::new();
    if route_data.is_empty() {
        return Ok(points);
    }
    for segment in split_dropping_trailing_empty(route_data, POINT_SEPARATOR) {
        let fields = split_dropping_trailing_empty(segment, FIELD_SEPARATOR);
        if fields.len() != 2 {
            debug!("[route_store.decode_route] skipping segment {:?}", segment);
            continue;
        }
        let latitude = parse_coordinate(fields[0], segment)?;
        let longitude = parse_coordinate(fields[1], segment)?;
        points.push(GeoPoint::new(latitude, longitude));
    }
    Ok(points)
}

pub struct RouteStore<S: PreferenceStore> {
    preferences: S,
    bucket: String,
    key: String,
}

impl<S: PreferenceStore> RouteStore<S> {
    pub fn new(preferences: S, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        RouteStore {
            preferences,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn save(&mut self, route: &Route) -> Result<()> {
        let route_data = encode_route(route.points());
        self.preferences
            .put_string(&self.bucket, &self.key, &route_data)?;
        debug!("[route_store.save] saved {} points", route.len());
        Ok(())
    }

    pub fn load(&mut self) -> Result<Vec<GeoPoint>> {
        let route_data = self
            .preferences
            .get_string_with_default(&self.bucket, &self.key, "")?;
        let points = decode_route(&route_data)?;
        info!("[route_store.load] loaded {} points", points.len());
        Ok(points)
    }

    pub fn preferences(&mut self) -> &mut S {
        &mut self.preferences
    }
}
