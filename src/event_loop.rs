use anyhow::Result;
use std::sync::{mpsc, Arc, Weak};

use crate::location_tracker::{Fix, PermissionState};
use crate::main_screen::MainScreen;
use crate::preference_db::PreferenceStore;

#[derive(Clone, Debug, PartialEq)]
pub enum ScreenEvent {
    PermissionResult {
        request_code: i32,
        grant_results: Vec<PermissionState>,
    },
    LocationResult(Vec<Fix>),
    AuthorButtonClicked,
    Pause,
    Resume,
    Destroy,
}

/// Cheap to clone and safe to send to other threads. Everything the platform
/// wants to tell the screen goes through one of these. Once every handle is
/// dropped the event loop tears the screen down.
#[derive(Clone)]
pub struct ScreenHandle {
    // all clones share one sender, the channel closes when the last one goes
    sender: Arc<mpsc::Sender<ScreenEvent>>,
}

/// A handle that does not keep the event loop alive.
#[derive(Clone)]
pub struct WeakScreenHandle {
    sender: Weak<mpsc::Sender<ScreenEvent>>,
}

impl WeakScreenHandle {
    pub fn upgrade(&self) -> Option<ScreenHandle> {
        self.sender.upgrade().map(|sender| ScreenHandle { sender })
    }
}

impl ScreenHandle {
    pub fn downgrade(&self) -> WeakScreenHandle {
        WeakScreenHandle {
            sender: Arc::downgrade(&self.sender),
        }
    }

    // Returns false if the screen is already gone, the event is dropped then.
    pub fn post(&self, event: ScreenEvent) -> bool {
        match self.sender.send(event) {
            Ok(()) => true,
            Err(mpsc::SendError(event)) => {
                warn!("[event_loop.post] screen is gone, dropping {:?}", event);
                false
            }
        }
    }

    pub fn permission_result(&self, request_code: i32, grant_results: Vec<PermissionState>) -> bool {
        self.post(ScreenEvent::PermissionResult {
            request_code,
            grant_results,
        })
    }

    pub fn pause(&self) -> bool {
        self.post(ScreenEvent::Pause)
    }

    pub fn resume(&self) -> bool {
        self.post(ScreenEvent::Resume)
    }

    pub fn destroy(&self) -> bool {
        self.post(ScreenEvent::Destroy)
    }

    pub fn click_author_button(&self) -> bool {
        self.post(ScreenEvent::AuthorButtonClicked)
    }
}

pub fn channel() -> (ScreenHandle, mpsc::Receiver<ScreenEvent>) {
    let (sender, receiver) = mpsc::channel();
    (
        ScreenHandle {
            sender: Arc::new(sender),
        },
        receiver,
    )
}

// Runs the screen on the current thread: `on_create` first, then every event
// in arrival order until `Destroy` or until every `ScreenHandle` is dropped,
// the screen is torn down either way. Events that arrive during `on_create`
// wait in the channel, so a saved route is always drawn before the first live
// fix.
pub fn run<S: PreferenceStore>(
    mut screen: MainScreen<S>,
    events: mpsc::Receiver<ScreenEvent>,
) -> Result<MainScreen<S>> {
    screen.on_create()?;
    while let Ok(event) = events.recv() {
        if dispatch(&mut screen, event) == Flow::Exit {
            info!("[event_loop.run] screen destroyed");
            return Ok(screen);
        }
    }
    info!("[event_loop.run] all handles dropped, tearing down");
    screen.on_destroy();
    Ok(screen)
}

#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

fn dispatch<S: PreferenceStore>(screen: &mut MainScreen<S>, event: ScreenEvent) -> Flow {
    match event {
        ScreenEvent::PermissionResult {
            request_code,
            grant_results,
        } => screen.on_request_permissions_result(request_code, &grant_results),
        ScreenEvent::LocationResult(fixes) => screen.on_location_result(fixes),
        ScreenEvent::AuthorButtonClicked => screen.show_developer_info(),
        ScreenEvent::Pause => screen.on_pause(),
        ScreenEvent::Resume => screen.on_resume(),
        ScreenEvent::Destroy => {
            screen.on_destroy();
            return Flow::Exit;
        }
    }
    Flow::Continue
}
