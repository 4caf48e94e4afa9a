use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }
}

// Append-only for the lifetime of the screen, only a process restart gives an
// empty route again.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Route {
    points: Vec<GeoPoint>,
}

impl Route {
    pub fn new() -> Self {
        Route { points: Vec::new() }
    }

    pub fn push(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    pub fn extend(&mut self, points: impl IntoIterator<Item = GeoPoint>) {
        self.points.extend(points);
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&GeoPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<GeoPoint> for Route {
    fn from_iter<I: IntoIterator<Item = GeoPoint>>(iter: I) -> Self {
        Route {
            points: iter.into_iter().collect(),
        }
    }
}
