use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::route::GeoPoint;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileSource {
    Mapnik,
    OpenTopo,
    Wikimedia,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    pub user_agent: String,
    pub tile_source: TileSource,
    pub zoom_buttons_visible: bool,
    pub multi_touch_controls: bool,
    pub zoom: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolylineStyle {
    pub width: f32,
    // 0xAARRGGBB
    pub color: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    Start,
    Center,
    End,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub anchor_u: Anchor,
    pub anchor_v: Anchor,
    pub icon: String,
}

/// The map surface the screen draws on.
///
/// Tile fetching and drawing live on the other side of this trait. The screen
/// only places overlays, moves the camera and forwards lifecycle calls.
pub trait MapView {
    fn configure(&mut self, settings: &MapSettings);

    fn set_zoom(&mut self, zoom: f64);

    fn set_center(&mut self, point: GeoPoint);

    fn add_polyline(&mut self, style: &PolylineStyle) -> OverlayId;

    fn set_polyline_points(&mut self, polyline: OverlayId, points: &[GeoPoint]);

    fn add_marker(&mut self, position: GeoPoint, style: &MarkerStyle) -> OverlayId;

    fn remove_overlay(&mut self, overlay: OverlayId);

    /// Ask for a redraw.
    fn invalidate(&mut self);

    /// Suspend the surface's internal timers (tile loading, animations).
    fn on_pause(&mut self);

    fn on_resume(&mut self);
}
