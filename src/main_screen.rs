use anyhow::Result;

use crate::config::ScreenConfig;
use crate::dialog::DialogPresenter;
use crate::event_loop::{ScreenHandle, WeakScreenHandle};
use crate::location_tracker::{
    Fix, LocationCallback, LocationClient, LocationTracker, PermissionGate, PermissionState,
    TrackerState,
};
use crate::map_view::{MapView, OverlayId};
use crate::preference_db::PreferenceStore;
use crate::route::{GeoPoint, Route};
use crate::route_store::RouteStore;

/// The platform services the screen drives. None of them are called from
/// anywhere but the event loop thread.
pub struct ScreenPlatform {
    pub map: Box<dyn MapView>,
    pub location_client: Box<dyn LocationClient>,
    pub permissions: Box<dyn PermissionGate>,
    pub dialogs: Box<dyn DialogPresenter>,
}

#[derive(Default)]
struct ScreenState {
    route: Route,
    current_location: Option<GeoPoint>,
    route_line: Option<OverlayId>,
    current_marker: Option<OverlayId>,
    author_button_ready: bool,
}

pub struct MainScreen<S: PreferenceStore> {
    config: ScreenConfig,
    // weak so the screen itself never keeps its event loop running
    handle: WeakScreenHandle,
    platform: ScreenPlatform,
    route_store: RouteStore<S>,
    tracker: LocationTracker,
    state: ScreenState,
}

impl<S: PreferenceStore> MainScreen<S> {
    pub fn new(
        config: ScreenConfig,
        platform: ScreenPlatform,
        preferences: S,
        handle: &ScreenHandle,
    ) -> Self {
        let route_store = RouteStore::new(
            preferences,
            config.preferences_name.clone(),
            config.route_key.clone(),
        );
        let tracker = LocationTracker::new(
            config.location_permission_request_code,
            config.location_request.clone(),
        );
        MainScreen {
            config,
            handle: handle.downgrade(),
            platform,
            route_store,
            tracker,
            state: ScreenState::default(),
        }
    }

    // A saved route that fails to decode is returned as an error and the
    // screen should not be used after that.
    pub fn on_create(&mut self) -> Result<()> {
        self.initialize_map_view();
        self.request_location_permissions();
        self.load_saved_route()?;
        self.state.author_button_ready = true;
        info!(
            "[main_screen.on_create] ready, route has {} points, tracker is {:?}",
            self.state.route.len(),
            self.tracker.state()
        );
        Ok(())
    }

    fn initialize_map_view(&mut self) {
        let map = &mut self.platform.map;
        map.configure(&self.config.map);
        map.set_zoom(self.config.map.zoom);
    }

    fn location_callback(&self) -> Option<LocationCallback> {
        self.handle.upgrade().map(LocationCallback::new)
    }

    fn request_location_permissions(&mut self) {
        let callback = self.location_callback();
        self.tracker.activate(
            &mut *self.platform.permissions,
            &mut *self.platform.location_client,
            callback,
        );
    }

    pub fn on_request_permissions_result(
        &mut self,
        request_code: i32,
        grant_results: &[PermissionState],
    ) {
        let callback = self.location_callback();
        self.tracker.on_permission_result(
            request_code,
            grant_results,
            &*self.platform.permissions,
            &mut *self.platform.location_client,
            callback,
        );
    }

    pub fn on_location_result(&mut self, fixes: Vec<Fix>) {
        if !self.tracker.is_tracking() {
            debug!(
                "[main_screen.on_location_result] tracker is {:?}, dropping {} fixes",
                self.tracker.state(),
                fixes.len()
            );
            return;
        }
        if fixes.is_empty() {
            return;
        }
        for fix in &fixes {
            self.update_current_location(fix.to_geo_point());
        }
        self.save_current_route();
    }

    fn update_current_location(&mut self, point: GeoPoint) {
        self.state.current_location = Some(point);
        self.state.route.push(point);
        self.platform.map.set_center(point);

        let route_line = self.ensure_route_line();
        self.platform
            .map
            .set_polyline_points(route_line, self.state.route.points());

        self.update_map_marker(point);
        self.platform.map.invalidate();
    }

    fn ensure_route_line(&mut self) -> OverlayId {
        match self.state.route_line {
            Some(route_line) => route_line,
            None => {
                let route_line = self.platform.map.add_polyline(&self.config.route_line);
                self.state.route_line = Some(route_line);
                route_line
            }
        }
    }

    fn update_map_marker(&mut self, point: GeoPoint) {
        if let Some(marker) = self.state.current_marker.take() {
            self.platform.map.remove_overlay(marker);
        }
        let marker = self.platform.map.add_marker(point, &self.config.marker);
        self.state.current_marker = Some(marker);
    }

    // The in-memory route stays ahead if this fails, the next batch writes
    // the whole route again.
    fn save_current_route(&mut self) {
        if let Err(e) = self.route_store.save(&self.state.route) {
            error!(
                "[main_screen.save_current_route] failed to save {} points: {:?}",
                self.state.route.len(),
                e
            );
        }
    }

    fn load_saved_route(&mut self) -> Result<()> {
        let points = self.route_store.load()?;
        if points.is_empty() {
            return Ok(());
        }
        self.state.route.extend(points);
        let route_line = self.ensure_route_line();
        self.platform
            .map
            .set_polyline_points(route_line, self.state.route.points());
        self.platform.map.invalidate();
        Ok(())
    }

    pub fn show_developer_info(&mut self) {
        if !self.state.author_button_ready {
            return;
        }
        self.platform
            .dialogs
            .show_alert(&self.config.developer_info);
    }

    pub fn on_pause(&mut self) {
        self.platform.map.on_pause();
    }

    pub fn on_resume(&mut self) {
        self.platform.map.on_resume();
    }

    pub fn on_destroy(&mut self) {
        self.tracker.stop(&mut *self.platform.location_client);
        info!(
            "[main_screen.on_destroy] stopped with {} points",
            self.state.route.len()
        );
    }

    pub fn route(&self) -> &Route {
        &self.state.route
    }

    pub fn current_location(&self) -> Option<GeoPoint> {
        self.state.current_location
    }

    pub fn tracker_state(&self) -> TrackerState {
        self.tracker.state()
    }
}
