//! Best-effort geolocation for check-ins.
//!
//! A missing position is never an error for the caller: denial, timeout
//! and unsupported environments all come back as `None` and the check-in
//! proceeds without coordinates.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rollcall_core::attendance::Coordinates;

use crate::device::{DeviceError, PositionFix, PositionOptions, PositionSource};

// ---------------------------------------------------------------------------
// Acquirer
// ---------------------------------------------------------------------------

/// Issues one bounded position request against a [`PositionSource`].
#[derive(Clone)]
pub struct GeolocationAcquirer {
    source: Arc<dyn PositionSource>,
    options: PositionOptions,
}

impl GeolocationAcquirer {
    pub fn new(source: Arc<dyn PositionSource>, options: PositionOptions) -> Self {
        Self { source, options }
    }

    /// Request the current position, waiting at most `options.timeout`.
    pub async fn acquire(&self) -> Option<Coordinates> {
        let request = self.source.current_position(&self.options);
        match tokio::time::timeout(self.options.timeout, request).await {
            Ok(Ok(fix)) => {
                tracing::debug!(
                    accuracy = fix.coordinates.accuracy,
                    "Position acquired",
                );
                Some(fix.coordinates)
            }
            Ok(Err(e)) => {
                tracing::info!(error = %e, "Location access denied or failed, continuing without location");
                None
            }
            Err(_) => {
                tracing::info!(
                    timeout_ms = self.options.timeout.as_millis() as u64,
                    "Location request timed out, continuing without location",
                );
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Serves the last fix while it is younger than `options.maximum_age`,
/// otherwise asks the inner source and remembers the answer.
pub struct CachedPositionSource<P> {
    inner: P,
    last: Mutex<Option<PositionFix>>,
}

impl<P: PositionSource> CachedPositionSource<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }

    fn cached(&self, options: &PositionOptions) -> Option<PositionFix> {
        let last = *self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let fix = last?;
        let age = chrono::Utc::now().signed_duration_since(fix.acquired_at);
        let max_age = chrono::Duration::from_std(options.maximum_age).ok()?;
        (age >= chrono::Duration::zero() && age <= max_age).then_some(fix)
    }
}

#[async_trait]
impl<P: PositionSource> PositionSource for CachedPositionSource<P> {
    async fn current_position(&self, options: &PositionOptions) -> Result<PositionFix, DeviceError> {
        if let Some(fix) = self.cached(options) {
            tracing::trace!("Serving cached position");
            return Ok(fix);
        }
        let fix = self.inner.current_position(options).await?;
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(fix);
        Ok(fix)
    }
}

/// Always reports the same configured coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedPositionSource {
    coordinates: Coordinates,
}

impl FixedPositionSource {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl PositionSource for FixedPositionSource {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<PositionFix, DeviceError> {
        Ok(PositionFix {
            coordinates: self.coordinates,
            acquired_at: chrono::Utc::now(),
        })
    }
}

/// Environment without geolocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPositionSource;

#[async_trait]
impl PositionSource for UnsupportedPositionSource {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<PositionFix, DeviceError> {
        Err(DeviceError::Unsupported)
    }
}
