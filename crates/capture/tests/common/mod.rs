//! Fake devices and a fake attendance API for driving capture flows.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use image::{Rgb, RgbImage};
use tokio::sync::Notify;

use rollcall_capture::config::FlowConfig;
use rollcall_capture::device::{
    DeviceError, MediaSource, PositionFix, PositionOptions, PositionSource, VideoConstraints,
    VideoStream,
};
use rollcall_capture::flow::{FlowDeps, FlowHandle};
use rollcall_capture::preview::PreviewRegistry;
use rollcall_capture::submit::CheckInApi;
use rollcall_client::{ApiError, PhotoUpload};
use rollcall_core::attendance::{CheckInStatus, Coordinates, LoginRecord};

pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

/// 64x48 frame, red on the left half and blue on the right.
pub fn split_card() -> RgbImage {
    RgbImage::from_fn(64, 48, |x, _| if x < 32 { RED } else { BLUE })
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// A camera that hands out streams of a fixed frame and counts how many of
/// them are still live.
#[derive(Default)]
pub struct FakeCamera {
    denied: AtomicBool,
    opened: AtomicUsize,
    live: Arc<AtomicUsize>,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denied() -> Self {
        let camera = Self::default();
        camera.denied.store(true, Ordering::SeqCst);
        camera
    }

    /// Streams opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Streams currently running.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaSource for FakeCamera {
    async fn open_video(
        &self,
        _constraints: &VideoConstraints,
    ) -> Result<Box<dyn VideoStream>, DeviceError> {
        if self.denied.load(Ordering::SeqCst) {
            return Err(DeviceError::PermissionDenied("camera blocked".to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            frame: split_card(),
            running: true,
            live: Arc::clone(&self.live),
        }))
    }
}

struct FakeStream {
    frame: RgbImage,
    running: bool,
    live: Arc<AtomicUsize>,
}

impl VideoStream for FakeStream {
    fn label(&self) -> &str {
        "fake camera"
    }

    fn current_frame(&self) -> Option<RgbImage> {
        self.running.then(|| self.frame.clone())
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn is_live(&self) -> bool {
        self.running
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

pub fn office() -> Coordinates {
    Coordinates::new(12.9716, 77.5946, 15.0)
}

/// A position source that answers with `coordinates` once its gate opens.
pub struct GatedPositions {
    coordinates: Coordinates,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
    answered: AtomicUsize,
}

impl GatedPositions {
    pub fn immediate(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            gate: None,
            calls: AtomicUsize::new(0),
            answered: AtomicUsize::new(0),
        }
    }

    pub fn gated(coordinates: Coordinates, gate: Arc<Notify>) -> Self {
        Self {
            coordinates,
            gate: Some(gate),
            calls: AtomicUsize::new(0),
            answered: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests that have returned a fix.
    pub fn answered(&self) -> usize {
        self.answered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PositionSource for GatedPositions {
    async fn current_position(&self, _options: &PositionOptions) -> Result<PositionFix, DeviceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            // Only the first request is held back.
            if call == 0 {
                gate.notified().await;
            }
        }
        self.answered.fetch_add(1, Ordering::SeqCst);
        Ok(PositionFix {
            coordinates: self.coordinates,
            acquired_at: Utc::now(),
        })
    }
}

/// A position source whose user has refused location access.
pub struct DeniedPositions;

#[async_trait]
impl PositionSource for DeniedPositions {
    async fn current_position(&self, _options: &PositionOptions) -> Result<PositionFix, DeviceError> {
        Err(DeviceError::PermissionDenied("location blocked".to_string()))
    }
}

// ---------------------------------------------------------------------------
// API
// ---------------------------------------------------------------------------

/// In-memory stand-in for the attendance API.
///
/// A successful upload marks the user as checked in, like the real server.
#[derive(Default)]
pub struct FakeApi {
    checked_in: AtomicBool,
    record: Mutex<Option<LoginRecord>>,
    status_fails: AtomicBool,
    status_calls: AtomicUsize,
    uploads: Mutex<Vec<PhotoUpload>>,
    fail_next: Mutex<Option<String>>,
    upload_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn already_checked_in() -> Self {
        let api = Self::default();
        api.checked_in.store(true, Ordering::SeqCst);
        api
    }

    pub fn with_failing_status() -> Self {
        let api = Self::default();
        api.status_fails.store(true, Ordering::SeqCst);
        api
    }

    /// Fail the next upload with a 500 carrying `message`.
    pub fn fail_next_upload(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    /// Hold every upload until `gate` is notified.
    pub fn hold_uploads(&self, gate: Arc<Notify>) {
        *self.upload_gate.lock().unwrap() = Some(gate);
    }

    pub fn uploads(&self) -> Vec<PhotoUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckInApi for FakeApi {
    async fn check_login_status(&self) -> Result<CheckInStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.status_fails.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                message: None,
            });
        }
        Ok(CheckInStatus {
            has_logged_in_today: self.checked_in.load(Ordering::SeqCst),
            login_record: self.record.lock().unwrap().clone(),
        })
    }

    async fn login_with_photo(&self, upload: PhotoUpload) -> Result<Option<LoginRecord>, ApiError> {
        let gate = self.upload_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.uploads.lock().unwrap().push(upload.clone());

        let failure = self.fail_next.lock().unwrap().take();
        if let Some(message) = failure {
            return Err(ApiError::Status {
                status: 500,
                message: Some(message),
            });
        }

        let record = LoginRecord {
            id: "rec-1".to_string(),
            login_date: Utc::now(),
            photo_url: Some("/uploads/rec-1.jpg".to_string()),
            location: upload.coordinates,
            is_photo_deleted: false,
        };
        *self.record.lock().unwrap() = Some(record.clone());
        self.checked_in.store(true, Ordering::SeqCst);
        Ok(Some(record))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Wait until `condition` holds on a fake, then give the flow task a few
/// turns to drain the completion it was just handed.
///
/// Fakes update their counters in the same poll that completes the
/// request, so on the current-thread test runtime the completion is
/// already queued when `condition` first holds.
pub async fn settle_after(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("fake never reached the expected state");

    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub struct Harness {
    pub camera: Arc<FakeCamera>,
    pub api: Arc<FakeApi>,
    pub previews: PreviewRegistry,
    pub flow: FlowHandle,
}

/// Spawn a flow over the given fakes with a short position timeout.
pub fn spawn_flow(
    camera: FakeCamera,
    positions: Arc<dyn PositionSource>,
    api: FakeApi,
) -> Harness {
    let camera = Arc::new(camera);
    let api = Arc::new(api);
    let previews = PreviewRegistry::new();

    let mut config = FlowConfig::default();
    config.position.timeout = Duration::from_millis(500);

    let flow = FlowHandle::spawn(
        FlowDeps {
            media: camera.clone(),
            positions,
            api: api.clone(),
            previews: previews.clone(),
        },
        config,
    );

    Harness {
        camera,
        api,
        previews,
        flow,
    }
}

/// A flow with a working camera, an immediate position and a fresh user.
pub fn default_flow() -> Harness {
    spawn_flow(
        FakeCamera::new(),
        Arc::new(GatedPositions::immediate(office())),
        FakeApi::new(),
    )
}
