//! Daily check-in capture workflow.
//!
//! A [`flow::FlowHandle`] drives one capture flow: camera session,
//! mirrored frame capture, review, multipart upload and status refresh.
//! Devices sit behind the [`device::MediaSource`] and
//! [`device::PositionSource`] traits; the remote API behind
//! [`submit::CheckInApi`].

pub mod camera;
pub mod config;
pub mod device;
pub mod error;
pub mod flow;
pub mod frame;
pub mod geolocation;
pub mod preview;
pub mod status;
pub mod still;
pub mod submit;
