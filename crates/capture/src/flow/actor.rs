//! The task that owns a flow's state.
//!
//! Commands arrive over an mpsc channel and are applied one at a time.
//! Device and network work runs on a [`JoinSet`]; each completion is
//! matched back against the current state before it is applied, so a
//! result that arrives after a cancel or retake is dropped.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use rollcall_core::attendance::{CheckInStatus, Coordinates, LoginRecord};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::camera::CameraSession;
use crate::config::FlowConfig;
use crate::error::{CaptureError, FlowError};
use crate::frame::{self, FrameId};
use crate::geolocation::GeolocationAcquirer;
use crate::status;
use crate::submit::{self, SUBMIT_FALLBACK_MESSAGE, SUBMIT_SUCCESS_MESSAGE};

use super::handle::{FlowCommand, FlowDeps, PendingUpload, UploadOutcome};
use super::notice::Notice;
use super::state::{FlowPhase, FlowSnapshot, FlowState, InFlightUpload, StatusView};

/// Shown when the camera cannot be opened.
pub const CAMERA_UNAVAILABLE_MESSAGE: &str = "Camera access denied or not available";

enum Completion {
    Position {
        epoch: u64,
        coordinates: Option<Coordinates>,
    },
    Status(CheckInStatus),
    Upload {
        frame_id: FrameId,
        result: Result<Option<LoginRecord>, CaptureError>,
    },
}

pub(super) struct FlowActor {
    deps: FlowDeps,
    config: FlowConfig,
    geolocation: GeolocationAcquirer,
    state: FlowState,
    status: StatusView,
    coordinates: Option<Coordinates>,
    /// Bumped on cancel; position results from an older epoch are dropped.
    position_epoch: u64,
    /// Epoch of the in-flight position request, if any.
    position_pending: Option<u64>,
    last_frame_id: u64,
    tasks: JoinSet<Completion>,
    snapshot_tx: watch::Sender<FlowSnapshot>,
    notice_tx: broadcast::Sender<Notice>,
}

impl FlowActor {
    pub(super) fn new(
        deps: FlowDeps,
        config: FlowConfig,
        snapshot_tx: watch::Sender<FlowSnapshot>,
        notice_tx: broadcast::Sender<Notice>,
    ) -> Self {
        let geolocation = GeolocationAcquirer::new(deps.positions.clone(), config.position.clone());
        Self {
            deps,
            config,
            geolocation,
            state: FlowState::Idle,
            status: StatusView::loading(),
            coordinates: None,
            position_epoch: 0,
            position_pending: None,
            last_frame_id: 0,
            tasks: JoinSet::new(),
            snapshot_tx,
            notice_tx,
        }
    }

    pub(super) async fn run(
        mut self,
        mut commands: mpsc::Receiver<FlowCommand>,
        cancel: CancellationToken,
    ) {
        self.refresh_status();
        self.request_position();
        self.publish();
        tracing::debug!("Capture flow mounted");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.handle_completion(joined);
                }
            }
        }

        self.teardown();
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Replies go out after the new state is published, so a caller that
    /// awaited a command always observes its effect.
    async fn handle_command(&mut self, command: FlowCommand) {
        match command {
            FlowCommand::Start(reply) => {
                let result = self.start().await;
                self.publish();
                let _ = reply.send(result);
            }
            FlowCommand::Capture(reply) => {
                let result = self.capture();
                self.publish();
                let _ = reply.send(result);
            }
            FlowCommand::Retake(reply) => {
                let result = self.retake();
                self.publish();
                let _ = reply.send(result);
            }
            FlowCommand::Confirm(reply) => {
                let result = self.confirm();
                self.publish();
                let _ = reply.send(result);
            }
            FlowCommand::Cancel(reply) => {
                let result = self.cancel();
                self.publish();
                let _ = reply.send(result);
            }
        }
    }

    async fn start(&mut self) -> Result<(), FlowError> {
        let phase = self.state.phase();
        if phase != FlowPhase::Idle {
            return Err(FlowError::InvalidTransition {
                phase,
                action: "start",
            });
        }
        if self.status.loading {
            return Err(FlowError::StatusPending);
        }
        if self.status.has_logged_in_today {
            return Err(FlowError::AlreadyCheckedIn);
        }

        match CameraSession::start(self.deps.media.as_ref(), &self.config.video).await {
            Ok(session) => {
                self.state = FlowState::Live { session };
                self.request_position();
                Ok(())
            }
            Err(e) => {
                self.notify(Notice::error(CAMERA_UNAVAILABLE_MESSAGE));
                Err(e.into())
            }
        }
    }

    fn capture(&mut self) -> Result<FrameId, FlowError> {
        match self.take_state() {
            FlowState::Live { session } => {
                let id = FrameId(self.last_frame_id + 1);
                match frame::capture(&session, id, self.config.jpeg_quality) {
                    Ok(frame) => {
                        self.last_frame_id = id.0;
                        let preview = self.deps.previews.register(frame.jpeg().clone());
                        tracing::debug!(frame_id = %id, preview = %preview.id(), "Preview registered");
                        self.state = FlowState::Captured {
                            session,
                            frame,
                            preview,
                            upload: None,
                        };
                        Ok(id)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Frame capture failed");
                        self.state = FlowState::Live { session };
                        Err(e.into())
                    }
                }
            }
            other => {
                self.state = other;
                Err(CaptureError::CaptureUnavailable.into())
            }
        }
    }

    fn retake(&mut self) -> Result<(), FlowError> {
        match self.take_state() {
            FlowState::Captured {
                session,
                frame,
                preview,
                upload,
            } => {
                drop(preview);
                if let Some(upload) = upload {
                    supersede(upload);
                }
                tracing::debug!(frame_id = %frame.id(), "Frame discarded for retake");
                self.state = FlowState::Live { session };
                Ok(())
            }
            other => {
                let phase = other.phase();
                self.state = other;
                Err(FlowError::InvalidTransition {
                    phase,
                    action: "retake",
                })
            }
        }
    }

    fn confirm(&mut self) -> Result<PendingUpload, FlowError> {
        let phase = self.state.phase();
        let FlowState::Captured { frame, upload, .. } = &mut self.state else {
            return Err(FlowError::InvalidTransition {
                phase,
                action: "confirm",
            });
        };
        if upload.is_some() {
            return Err(FlowError::UploadInFlight);
        }

        let frame_id = frame.id();
        let frame = frame.clone();
        let api = self.deps.api.clone();
        let coordinates = self.coordinates;
        tracing::info!(%frame_id, has_location = coordinates.is_some(), "Submitting check-in");

        self.tasks.spawn(async move {
            let result = AssertUnwindSafe(submit::submit(api.as_ref(), &frame, coordinates))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(CaptureError::SubmissionFailed(SUBMIT_FALLBACK_MESSAGE.to_string()))
                });
            Completion::Upload { frame_id, result }
        });

        let (reply, outcome) = oneshot::channel();
        *upload = Some(InFlightUpload { frame_id, reply });
        Ok(PendingUpload::new(frame_id, outcome))
    }

    fn cancel(&mut self) -> Result<(), FlowError> {
        match self.take_state() {
            FlowState::Live { mut session } => session.stop(),
            FlowState::Captured {
                mut session,
                frame,
                preview,
                upload,
            } => {
                session.stop();
                drop(preview);
                drop(frame);
                if let Some(upload) = upload {
                    supersede(upload);
                }
            }
            // Nothing is open; cancelling again is a no-op.
            other => {
                self.state = other;
                return Ok(());
            }
        }

        self.position_epoch += 1;
        self.position_pending = None;
        tracing::info!("Capture cancelled");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Completions
    // -----------------------------------------------------------------------

    fn handle_completion(&mut self, joined: Result<Completion, JoinError>) {
        match joined {
            Ok(Completion::Position { epoch, coordinates }) => self.on_position(epoch, coordinates),
            Ok(Completion::Status(status)) => {
                self.status = StatusView::loaded(status);
            }
            Ok(Completion::Upload { frame_id, result }) => self.on_upload(frame_id, result),
            Err(e) => tracing::error!(error = %e, "Capture flow task failed"),
        }
        self.publish();
    }

    fn on_position(&mut self, epoch: u64, coordinates: Option<Coordinates>) {
        if epoch != self.position_epoch {
            tracing::debug!(epoch, "Discarding position from a cancelled attempt");
            return;
        }
        self.position_pending = None;
        if self.coordinates.is_none() {
            self.coordinates = coordinates;
        }
    }

    fn on_upload(&mut self, frame_id: FrameId, result: Result<Option<LoginRecord>, CaptureError>) {
        match self.take_state() {
            FlowState::Captured {
                mut session,
                frame,
                preview,
                upload: Some(upload),
            } if upload.frame_id == frame_id => match result {
                Ok(record) => {
                    session.stop();
                    drop(preview);
                    drop(frame);
                    self.state = FlowState::Confirmed;
                    tracing::info!(%frame_id, "Check-in recorded");
                    self.notify(Notice::success(SUBMIT_SUCCESS_MESSAGE));
                    self.refresh_status();
                    self.publish();
                    let _ = upload.reply.send(UploadOutcome::Recorded(record));
                }
                Err(e) => {
                    let message = match e {
                        CaptureError::SubmissionFailed(message) => message,
                        other => other.to_string(),
                    };
                    self.notify(Notice::error(message.clone()));
                    self.state = FlowState::Captured {
                        session,
                        frame,
                        preview,
                        upload: None,
                    };
                    self.publish();
                    let _ = upload.reply.send(UploadOutcome::Failed(message));
                }
            },
            other => {
                self.state = other;
                tracing::warn!(%frame_id, "Discarding upload result for a superseded frame");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Background work
    // -----------------------------------------------------------------------

    fn refresh_status(&mut self) {
        self.status.loading = true;
        let api = self.deps.api.clone();
        self.tasks.spawn(async move {
            let status = AssertUnwindSafe(status::refresh_or_default(api.as_ref()))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| CheckInStatus::not_checked_in());
            Completion::Status(status)
        });
    }

    /// Start locating unless a position is known or already being fetched
    /// for the current epoch.
    fn request_position(&mut self) {
        if self.coordinates.is_some() || self.position_pending == Some(self.position_epoch) {
            return;
        }
        let epoch = self.position_epoch;
        let geolocation = self.geolocation.clone();
        self.position_pending = Some(epoch);
        self.tasks.spawn(async move {
            let coordinates = AssertUnwindSafe(geolocation.acquire())
                .catch_unwind()
                .await
                .unwrap_or(None);
            Completion::Position { epoch, coordinates }
        });
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn take_state(&mut self) -> FlowState {
        std::mem::replace(&mut self.state, FlowState::Idle)
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(%notice, "Notice");
        // No subscribers is fine.
        let _ = self.notice_tx.send(notice);
    }

    fn snapshot(&self) -> FlowSnapshot {
        let (preview, frame_id, uploading, camera_live) = match &self.state {
            FlowState::Live { session } => (None, None, false, session.is_live()),
            FlowState::Captured {
                session,
                frame,
                preview,
                upload,
            } => (
                Some(preview.id()),
                Some(frame.id()),
                upload.is_some(),
                session.is_live(),
            ),
            FlowState::Idle | FlowState::Confirmed => (None, None, false, false),
        };

        FlowSnapshot {
            phase: self.state.phase(),
            status: self.status.clone(),
            coordinates: self.coordinates,
            locating: self.position_pending.is_some(),
            preview,
            frame_id,
            uploading,
            camera_live,
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    fn teardown(&mut self) {
        match self.take_state() {
            FlowState::Live { mut session } => session.stop(),
            FlowState::Captured {
                mut session,
                frame,
                preview,
                upload,
            } => {
                session.stop();
                drop(preview);
                drop(frame);
                // The waiter sees the flow as closed.
                drop(upload);
            }
            FlowState::Confirmed => self.state = FlowState::Confirmed,
            FlowState::Idle => {}
        }
        self.tasks.abort_all();
        self.position_pending = None;
        self.publish();
        tracing::debug!(phase = %self.state.phase(), "Capture flow torn down");
    }
}

fn supersede(upload: InFlightUpload) {
    tracing::debug!(frame_id = %upload.frame_id, "Upload superseded");
    let _ = upload.reply.send(UploadOutcome::Superseded);
}
