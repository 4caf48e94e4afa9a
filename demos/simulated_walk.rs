// Runs the main screen headless: a console "map", a location source that
// walks along a fixed path, and preferences stored under the given directory.
// Run it twice to see the saved route come back.
use anyhow::Result;
use chrono::Utc;
use route_tracker_core::{
    config::ScreenConfig,
    dialog::{AlertDialog, DialogPresenter},
    event_loop::{self, ScreenHandle},
    location_tracker::{
        Fix, LocationCallback, LocationClient, LocationRequest, Permission, PermissionGate,
        PermissionState,
    },
    logs,
    main_screen::{MainScreen, ScreenPlatform},
    map_view::{MapSettings, MapView, MarkerStyle, OverlayId, PolylineStyle},
    preference_db::PreferenceDb,
    route::GeoPoint,
};
use std::{env, fs, thread, time::Duration};

struct ConsoleMap {
    next_id: u64,
}

impl MapView for ConsoleMap {
    fn configure(&mut self, settings: &MapSettings) {
        println!("[map] tiles={} user_agent={}", settings.tile_source, settings.user_agent);
    }

    fn set_zoom(&mut self, zoom: f64) {
        println!("[map] zoom={zoom}");
    }

    fn set_center(&mut self, point: GeoPoint) {
        println!("[map] center=({}, {})", point.latitude, point.longitude);
    }

    fn add_polyline(&mut self, style: &PolylineStyle) -> OverlayId {
        self.next_id += 1;
        println!("[map] polyline #{} width={} color={:#010x}", self.next_id, style.width, style.color);
        OverlayId(self.next_id)
    }

    fn set_polyline_points(&mut self, polyline: OverlayId, points: &[GeoPoint]) {
        println!("[map] polyline #{} now has {} points", polyline.0, points.len());
    }

    fn add_marker(&mut self, position: GeoPoint, style: &MarkerStyle) -> OverlayId {
        self.next_id += 1;
        println!(
            "[map] marker #{} '{}' at ({}, {})",
            self.next_id, style.icon, position.latitude, position.longitude
        );
        OverlayId(self.next_id)
    }

    fn remove_overlay(&mut self, overlay: OverlayId) {
        println!("[map] removed #{}", overlay.0);
    }

    fn invalidate(&mut self) {}

    fn on_pause(&mut self) {}

    fn on_resume(&mut self) {}
}

struct SimulatedWalk {
    handle: ScreenHandle,
    path: Vec<(f64, f64)>,
}

impl LocationClient for SimulatedWalk {
    fn request_location_updates(
        &mut self,
        request: &LocationRequest,
        callback: LocationCallback,
    ) -> Result<()> {
        let path = std::mem::take(&mut self.path);
        let handle = self.handle.clone();
        // ten times faster than the fastest requested rate
        let interval = Duration::from_millis(request.fastest_interval_ms / 10);
        thread::spawn(move || {
            for (latitude, longitude) in path {
                thread::sleep(interval);
                let mut fix = Fix::new(latitude, longitude);
                fix.timestamp_ms = Some(Utc::now().timestamp_millis());
                callback.on_location_result(vec![fix]);
            }
            handle.destroy();
        });
        Ok(())
    }

    fn remove_location_updates(&mut self) {
        println!("[location] unsubscribed");
    }
}

struct AlwaysGranted;

impl PermissionGate for AlwaysGranted {
    fn check(&self, _permission: Permission) -> PermissionState {
        PermissionState::Granted
    }

    fn request(&mut self, _permission: Permission, _request_code: i32) {}
}

struct ConsoleDialogs;

impl DialogPresenter for ConsoleDialogs {
    fn show_alert(&mut self, dialog: &AlertDialog) {
        println!("[dialog] {}: {} [{}]", dialog.title, dialog.message, dialog.positive_button);
    }
}

pub fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let data_dir = args.get(1).cloned().unwrap_or_else(|| "./route_tracker_demo".to_string());
    fs::create_dir_all(&data_dir)?;
    logs::init(&data_dir)?;

    let config = ScreenConfig::load_or_default(format!("{data_dir}/config.json"))?;
    let preferences = PreferenceDb::open(&data_dir)?;

    let (handle, events) = event_loop::channel();
    let platform = ScreenPlatform {
        map: Box::new(ConsoleMap { next_id: 0 }),
        location_client: Box::new(SimulatedWalk {
            handle: handle.clone(),
            path: (0..10)
                .map(|i| (55.75 + i as f64 * 0.001, 37.62 + i as f64 * 0.0005))
                .collect(),
        }),
        permissions: Box::new(AlwaysGranted),
        dialogs: Box::new(ConsoleDialogs),
    };
    handle.click_author_button();

    let screen = MainScreen::new(config, platform, preferences, &handle);
    // from here on only the walk keeps the loop alive
    drop(handle);
    let screen = event_loop::run(screen, events)?;
    println!("route has {} points", screen.route().len());

    logs::export(&data_dir, &format!("{data_dir}/logs.zip"))?;
    Ok(())
}
