use anyhow::Result;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::event_loop::{ScreenEvent, ScreenHandle};
use crate::route::GeoPoint;

/// A single location report from the platform's location service.
#[derive(Clone, Debug, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp_ms: Option<i64>,
    pub accuracy: Option<f32>,
    pub altitude: Option<f32>,
    pub speed: Option<f32>,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Fix {
            latitude,
            longitude,
            timestamp_ms: None,
            accuracy: None,
            altitude: None,
            speed: None,
        }
    }

    pub fn to_geo_point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    HighAccuracy,
    BalancedPowerAccuracy,
    LowPower,
    NoPower,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationRequest {
    pub interval_ms: u64,
    pub fastest_interval_ms: u64,
    pub priority: Priority,
}

impl Default for LocationRequest {
    fn default() -> Self {
        LocationRequest {
            interval_ms: 5000,
            fastest_interval_ms: 2000,
            priority: Priority::HighAccuracy,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Permission {
    FineLocation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

/// Runtime permission system of the platform. The answer to `request` comes
/// back later as `ScreenEvent::PermissionResult`.
pub trait PermissionGate {
    fn check(&self, permission: Permission) -> PermissionState;

    fn request(&mut self, permission: Permission, request_code: i32);
}

/// Handed to the location client on subscribe, every batch it delivers is
/// posted to the screen's event loop.
#[derive(Clone)]
pub struct LocationCallback {
    handle: ScreenHandle,
}

impl LocationCallback {
    pub fn new(handle: ScreenHandle) -> Self {
        LocationCallback { handle }
    }

    pub fn on_location_result(&self, fixes: Vec<Fix>) {
        self.handle.post(ScreenEvent::LocationResult(fixes));
    }
}

pub trait LocationClient {
    fn request_location_updates(
        &mut self,
        request: &LocationRequest,
        callback: LocationCallback,
    ) -> Result<()>;

    fn remove_location_updates(&mut self);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    AwaitingPermission,
    Tracking,
    Denied,
    Stopped,
}

pub struct LocationTracker {
    request_code: i32,
    request: LocationRequest,
    state: TrackerState,
}

impl LocationTracker {
    pub fn new(request_code: i32, request: LocationRequest) -> Self {
        LocationTracker {
            request_code,
            request,
            state: TrackerState::Idle,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == TrackerState::Tracking
    }

    pub fn activate(
        &mut self,
        permissions: &mut dyn PermissionGate,
        client: &mut dyn LocationClient,
        callback: Option<LocationCallback>,
    ) {
        match permissions.check(Permission::FineLocation) {
            PermissionState::Granted => self.start_updates(&*permissions, client, callback),
            PermissionState::Denied => {
                info!("[location_tracker.activate] requesting location permission");
                permissions.request(Permission::FineLocation, self.request_code);
                self.state = TrackerState::AwaitingPermission;
            }
        }
    }

    pub fn on_permission_result(
        &mut self,
        request_code: i32,
        grant_results: &[PermissionState],
        permissions: &dyn PermissionGate,
        client: &mut dyn LocationClient,
        callback: Option<LocationCallback>,
    ) {
        if request_code != self.request_code {
            debug!(
                "[location_tracker.on_permission_result] ignoring request code {}",
                request_code
            );
            return;
        }
        match grant_results.first() {
            Some(PermissionState::Granted) => self.start_updates(permissions, client, callback),
            _ => {
                if self.state == TrackerState::AwaitingPermission {
                    info!("[location_tracker.on_permission_result] location permission denied");
                    self.state = TrackerState::Denied;
                }
            }
        }
    }

    fn start_updates(
        &mut self,
        permissions: &dyn PermissionGate,
        client: &mut dyn LocationClient,
        callback: Option<LocationCallback>,
    ) {
        match self.state {
            TrackerState::Tracking => {
                warn!("[location_tracker.start_updates] already tracking");
                return;
            }
            TrackerState::Stopped => {
                warn!("[location_tracker.start_updates] tracker is stopped");
                return;
            }
            _ => (),
        }
        if permissions.check(Permission::FineLocation) != PermissionState::Granted {
            warn!("[location_tracker.start_updates] permission is not granted");
            return;
        }
        let Some(callback) = callback else {
            warn!("[location_tracker.start_updates] screen has no handles left");
            return;
        };
        match client.request_location_updates(&self.request, callback) {
            Ok(()) => {
                info!(
                    "[location_tracker.start_updates] subscribed, interval={}ms fastest={}ms priority={}",
                    self.request.interval_ms, self.request.fastest_interval_ms, self.request.priority
                );
                self.state = TrackerState::Tracking;
            }
            Err(e) => {
                error!(
                    "[location_tracker.start_updates] failed to subscribe: {:?}",
                    e
                );
                self.state = TrackerState::Idle;
            }
        }
    }

    // Always unsubscribes, whether or not a subscription was ever made.
    pub fn stop(&mut self, client: &mut dyn LocationClient) {
        if self.state == TrackerState::Stopped {
            return;
        }
        client.remove_location_updates();
        self.state = TrackerState::Stopped;
    }
}
