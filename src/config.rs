use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::dialog::AlertDialog;
use crate::location_tracker::LocationRequest;
use crate::map_view::{Anchor, MapSettings, MarkerStyle, PolylineStyle, TileSource};

const OPAQUE_RED: u32 = 0xFFFF_0000;

/// Everything the main screen needs to know that isn't state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub location_permission_request_code: i32,
    pub preferences_name: String,
    pub route_key: String,
    pub map: MapSettings,
    pub route_line: PolylineStyle,
    pub marker: MarkerStyle,
    pub location_request: LocationRequest,
    pub developer_info: AlertDialog,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig {
            location_permission_request_code: 1,
            preferences_name: "RoutePreferences".to_string(),
            route_key: "route_data".to_string(),
            map: MapSettings {
                user_agent: "route_tracker".to_string(),
                tile_source: TileSource::Mapnik,
                zoom_buttons_visible: false,
                multi_touch_controls: true,
                zoom: 15.0,
            },
            route_line: PolylineStyle {
                width: 15.0,
                color: OPAQUE_RED,
            },
            marker: MarkerStyle {
                anchor_u: Anchor::Center,
                anchor_v: Anchor::End,
                icon: "map_pin".to_string(),
            },
            location_request: LocationRequest::default(),
            developer_info: AlertDialog::new("Разработчик", ""),
        }
    }
}

impl ScreenConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // A missing file means "use the defaults", a broken one is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("[config.load_or_default] no config at {:?}", path);
            return Ok(ScreenConfig::default());
        }
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)
            .map_err(|e| anyhow!("failed to parse config {:?}: {}", path, e))?;
        info!("[config.load_or_default] loaded config from {:?}", path);
        Ok(config)
    }
}
