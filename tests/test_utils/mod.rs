#![allow(dead_code)]

use anyhow::Result;
use route_tracker_core::{
    config::ScreenConfig,
    dialog::{AlertDialog, DialogPresenter},
    event_loop::{self, ScreenEvent, ScreenHandle},
    location_tracker::{
        Fix, LocationCallback, LocationClient, LocationRequest, Permission, PermissionGate,
        PermissionState,
    },
    main_screen::{MainScreen, ScreenPlatform},
    map_view::{MapSettings, MapView, MarkerStyle, OverlayId, PolylineStyle},
    preference_db::PreferenceStore,
    route::GeoPoint,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::mpsc;

#[derive(Clone, Debug, PartialEq)]
pub enum MapCall {
    Configure(MapSettings),
    SetZoom(f64),
    SetCenter(GeoPoint),
    AddPolyline(OverlayId),
    SetPolylinePoints(OverlayId, usize),
    AddMarker(OverlayId, GeoPoint),
    RemoveOverlay(OverlayId),
    Invalidate,
    Pause,
    Resume,
}

#[derive(Default)]
pub struct MapRecord {
    pub calls: Vec<MapCall>,
    pub polylines: BTreeMap<OverlayId, Vec<GeoPoint>>,
    pub markers: BTreeMap<OverlayId, GeoPoint>,
    pub center: Option<GeoPoint>,
    pub paused: bool,
    next_id: u64,
}

impl MapRecord {
    fn next_id(&mut self) -> OverlayId {
        self.next_id += 1;
        OverlayId(self.next_id)
    }

    pub fn count(&self, f: impl Fn(&MapCall) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }

    pub fn invalidations(&self) -> usize {
        self.count(|c| *c == MapCall::Invalidate)
    }
}

pub struct RecordingMap(pub Rc<RefCell<MapRecord>>);

impl MapView for RecordingMap {
    fn configure(&mut self, settings: &MapSettings) {
        self.0
            .borrow_mut()
            .calls
            .push(MapCall::Configure(settings.clone()));
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.0.borrow_mut().calls.push(MapCall::SetZoom(zoom));
    }

    fn set_center(&mut self, point: GeoPoint) {
        let mut map = self.0.borrow_mut();
        map.center = Some(point);
        map.calls.push(MapCall::SetCenter(point));
    }

    fn add_polyline(&mut self, _style: &PolylineStyle) -> OverlayId {
        let mut map = self.0.borrow_mut();
        let id = map.next_id();
        map.polylines.insert(id, vec![]);
        map.calls.push(MapCall::AddPolyline(id));
        id
    }

    fn set_polyline_points(&mut self, polyline: OverlayId, points: &[GeoPoint]) {
        let mut map = self.0.borrow_mut();
        map.polylines.insert(polyline, points.to_vec());
        map.calls
            .push(MapCall::SetPolylinePoints(polyline, points.len()));
    }

    fn add_marker(&mut self, position: GeoPoint, _style: &MarkerStyle) -> OverlayId {
        let mut map = self.0.borrow_mut();
        let id = map.next_id();
        map.markers.insert(id, position);
        map.calls.push(MapCall::AddMarker(id, position));
        id
    }

    fn remove_overlay(&mut self, overlay: OverlayId) {
        let mut map = self.0.borrow_mut();
        map.markers.remove(&overlay);
        map.polylines.remove(&overlay);
        map.calls.push(MapCall::RemoveOverlay(overlay));
    }

    fn invalidate(&mut self) {
        self.0.borrow_mut().calls.push(MapCall::Invalidate);
    }

    fn on_pause(&mut self) {
        let mut map = self.0.borrow_mut();
        map.paused = true;
        map.calls.push(MapCall::Pause);
    }

    fn on_resume(&mut self) {
        let mut map = self.0.borrow_mut();
        map.paused = false;
        map.calls.push(MapCall::Resume);
    }
}

#[derive(Default)]
pub struct LocationRecord {
    pub requests: Vec<LocationRequest>,
    pub callback: Option<LocationCallback>,
    pub removals: usize,
}

pub struct FakeLocationClient {
    pub record: Rc<RefCell<LocationRecord>>,
    // fixes sent from a background thread right after subscribing, followed
    // by a `Destroy`
    pub background_fixes: Option<(Vec<Vec<Fix>>, ScreenHandle)>,
}

impl LocationClient for FakeLocationClient {
    fn request_location_updates(
        &mut self,
        request: &LocationRequest,
        callback: LocationCallback,
    ) -> Result<()> {
        let mut record = self.record.borrow_mut();
        record.requests.push(request.clone());
        if let Some((batches, handle)) = self.background_fixes.take() {
            let callback = callback.clone();
            std::thread::spawn(move || {
                for batch in batches {
                    callback.on_location_result(batch);
                }
                handle.destroy();
            });
        }
        record.callback = Some(callback);
        Ok(())
    }

    fn remove_location_updates(&mut self) {
        let mut record = self.record.borrow_mut();
        record.removals += 1;
        record.callback = None;
    }
}

pub struct FakePermissions {
    pub state: Rc<RefCell<PermissionState>>,
    pub requests: Rc<RefCell<Vec<i32>>>,
    // when set, a request is answered right away through this handle
    pub answer: Option<(ScreenHandle, PermissionState)>,
}

impl PermissionGate for FakePermissions {
    fn check(&self, _permission: Permission) -> PermissionState {
        *self.state.borrow()
    }

    fn request(&mut self, _permission: Permission, request_code: i32) {
        self.requests.borrow_mut().push(request_code);
        if let Some((handle, answer)) = &self.answer {
            *self.state.borrow_mut() = *answer;
            handle.permission_result(request_code, vec![*answer]);
        }
    }
}

pub struct FakeDialogs(pub Rc<RefCell<Vec<AlertDialog>>>);

impl DialogPresenter for FakeDialogs {
    fn show_alert(&mut self, dialog: &AlertDialog) {
        self.0.borrow_mut().push(dialog.clone());
    }
}

#[derive(Clone, Default)]
pub struct MemoryPreferences {
    pub values: Rc<RefCell<HashMap<(String, String), String>>>,
    pub fail_writes: Rc<RefCell<bool>>,
}

impl MemoryPreferences {
    pub fn route_data(&self) -> Option<String> {
        self.values
            .borrow()
            .get(&("RoutePreferences".to_string(), "route_data".to_string()))
            .cloned()
    }

    pub fn set_route_data(&self, value: &str) {
        self.values.borrow_mut().insert(
            ("RoutePreferences".to_string(), "route_data".to_string()),
            value.to_string(),
        );
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_string(&mut self, bucket: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .borrow()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }

    fn put_string(&mut self, bucket: &str, key: &str, value: &str) -> Result<()> {
        if *self.fail_writes.borrow() {
            anyhow::bail!("disk full");
        }
        self.values
            .borrow_mut()
            .insert((bucket.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

pub struct Harness {
    pub map: Rc<RefCell<MapRecord>>,
    pub location: Rc<RefCell<LocationRecord>>,
    pub permission_state: Rc<RefCell<PermissionState>>,
    pub permission_requests: Rc<RefCell<Vec<i32>>>,
    pub dialogs: Rc<RefCell<Vec<AlertDialog>>>,
    pub preferences: MemoryPreferences,
    pub handle: ScreenHandle,
    pub events: Option<mpsc::Receiver<ScreenEvent>>,
}

pub struct HarnessOptions {
    pub permission: PermissionState,
    // answer to the runtime permission prompt, `None` leaves it pending
    pub prompt_answer: Option<PermissionState>,
    pub saved_route: Option<String>,
    pub background_fixes: Option<Vec<Vec<Fix>>>,
    pub config: ScreenConfig,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        HarnessOptions {
            permission: PermissionState::Granted,
            prompt_answer: None,
            saved_route: None,
            background_fixes: None,
            config: ScreenConfig::default(),
        }
    }
}

pub fn build_screen(options: HarnessOptions) -> (Harness, MainScreen<MemoryPreferences>) {
    let (handle, events) = event_loop::channel();
    let map = Rc::new(RefCell::new(MapRecord::default()));
    let location = Rc::new(RefCell::new(LocationRecord::default()));
    let permission_state = Rc::new(RefCell::new(options.permission));
    let permission_requests = Rc::new(RefCell::new(vec![]));
    let dialogs = Rc::new(RefCell::new(vec![]));
    let preferences = MemoryPreferences::default();
    if let Some(saved_route) = &options.saved_route {
        preferences.set_route_data(saved_route);
    }

    let platform = ScreenPlatform {
        map: Box::new(RecordingMap(map.clone())),
        location_client: Box::new(FakeLocationClient {
            record: location.clone(),
            background_fixes: options
                .background_fixes
                .map(|batches| (batches, handle.clone())),
        }),
        permissions: Box::new(FakePermissions {
            state: permission_state.clone(),
            requests: permission_requests.clone(),
            answer: options.prompt_answer.map(|answer| (handle.clone(), answer)),
        }),
        dialogs: Box::new(FakeDialogs(dialogs.clone())),
    };
    let screen = MainScreen::new(
        options.config,
        platform,
        preferences.clone(),
        &handle,
    );
    (
        Harness {
            map,
            location,
            permission_state,
            permission_requests,
            dialogs,
            preferences,
            handle,
            events: Some(events),
        },
        screen,
    )
}

pub fn fix(latitude: f64, longitude: f64) -> Fix {
    Fix::new(latitude, longitude)
}
