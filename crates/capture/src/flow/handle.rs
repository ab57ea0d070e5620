//! Public handle for driving a capture flow.

use std::sync::Arc;

use rollcall_core::attendance::LoginRecord;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::FlowConfig;
use crate::device::{MediaSource, PositionSource};
use crate::error::FlowError;
use crate::frame::FrameId;
use crate::preview::PreviewRegistry;
use crate::submit::CheckInApi;

use super::actor::FlowActor;
use super::notice::Notice;
use super::state::FlowSnapshot;

/// Pending commands per flow. The UI issues one at a time, so this only
/// absorbs bursts.
const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Notices kept for slow subscribers.
const NOTICE_CHANNEL_CAPACITY: usize = 32;

pub(super) type Reply<T> = oneshot::Sender<Result<T, FlowError>>;

pub(super) enum FlowCommand {
    Start(Reply<()>),
    Capture(Reply<FrameId>),
    Retake(Reply<()>),
    Confirm(Reply<PendingUpload>),
    Cancel(Reply<()>),
}

/// Collaborators of a flow.
#[derive(Clone)]
pub struct FlowDeps {
    pub media: Arc<dyn MediaSource>,
    pub positions: Arc<dyn PositionSource>,
    pub api: Arc<dyn CheckInApi>,
    pub previews: PreviewRegistry,
}

/// How a confirmed upload ended.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The server recorded the check-in. The flow is now confirmed.
    Recorded(Option<LoginRecord>),
    /// The upload failed with this user-facing message. The flow is back
    /// in review with the same frame and may be confirmed again.
    Failed(String),
    /// The frame was retaken or the flow cancelled before the upload
    /// settled; its result will be ignored.
    Superseded,
}

/// An upload that has been dispatched by `confirm`.
#[derive(Debug)]
pub struct PendingUpload {
    frame_id: FrameId,
    outcome: oneshot::Receiver<UploadOutcome>,
}

impl PendingUpload {
    pub(super) fn new(frame_id: FrameId, outcome: oneshot::Receiver<UploadOutcome>) -> Self {
        Self { frame_id, outcome }
    }

    /// The frame being uploaded.
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Wait for the upload to settle.
    ///
    /// Returns [`FlowError::Closed`] when the flow shut down first.
    pub async fn settled(self) -> Result<UploadOutcome, FlowError> {
        self.outcome.await.map_err(|_| FlowError::Closed)
    }
}

/// Handle to a running capture flow.
///
/// The flow runs as its own task and owns the camera, the captured frame
/// and every in-flight request. Dropping the handle, or calling
/// [`close`](Self::close), tears it down and releases the camera.
pub struct FlowHandle {
    commands: mpsc::Sender<FlowCommand>,
    snapshot: watch::Receiver<FlowSnapshot>,
    notices: broadcast::Sender<Notice>,
    previews: PreviewRegistry,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl FlowHandle {
    /// Mount a new flow: fetches the check-in status and starts locating.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(deps: FlowDeps, config: FlowConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(FlowSnapshot::initial());
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let previews = deps.previews.clone();

        let actor = FlowActor::new(deps, config, snapshot_tx, notice_tx.clone());
        let task = tokio::spawn(actor.run(command_rx, cancel.clone()));

        Self {
            commands: command_tx,
            snapshot: snapshot_rx,
            notices: notice_tx,
            previews,
            cancel,
            task,
        }
    }

    /// Latest published state.
    pub fn snapshot(&self) -> FlowSnapshot {
        self.snapshot.borrow().clone()
    }

    /// A receiver that observes every state change.
    pub fn watch(&self) -> watch::Receiver<FlowSnapshot> {
        self.snapshot.clone()
    }

    /// Subscribe to user-facing notices emitted from now on.
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Registry resolving [`FlowSnapshot::preview`] ids to image bytes.
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Wait until `predicate` holds for the published state.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&FlowSnapshot) -> bool,
    ) -> Result<FlowSnapshot, FlowError> {
        let mut rx = self.snapshot.clone();
        let snapshot = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| FlowError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Wait until the check-in status has been loaded.
    pub async fn ready(&self) -> Result<FlowSnapshot, FlowError> {
        self.wait_for(|s| !s.status.loading).await
    }

    /// `Idle → Live`: open the camera.
    pub async fn start(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::Start).await
    }

    /// `Live → Captured`: snapshot the current frame.
    pub async fn capture(&self) -> Result<FrameId, FlowError> {
        self.send(FlowCommand::Capture).await
    }

    /// `Captured → Live`: discard the frame, keep the camera.
    pub async fn retake(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::Retake).await
    }

    /// Upload the captured frame. Returns once the upload is dispatched;
    /// await [`PendingUpload::settled`] for the result.
    pub async fn confirm(&self) -> Result<PendingUpload, FlowError> {
        self.send(FlowCommand::Confirm).await
    }

    /// `Live | Captured → Idle`: stop the camera and drop the frame.
    pub async fn cancel(&self) -> Result<(), FlowError> {
        self.send(FlowCommand::Cancel).await
    }

    /// Tear the flow down and wait for its task to finish.
    pub async fn close(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Capture flow task ended abnormally");
        }
    }

    async fn send<T>(&self, command: impl FnOnce(Reply<T>) -> FlowCommand) -> Result<T, FlowError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| FlowError::Closed)?;
        response.await.map_err(|_| FlowError::Closed)?
    }
}
