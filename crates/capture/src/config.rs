use std::time::Duration;

use rollcall_client::config::ConfigError;
use rollcall_core::attendance::DEFAULT_JPEG_QUALITY;

use crate::device::{PositionOptions, VideoConstraints};

/// Tunables for one capture flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub video: VideoConstraints,
    pub position: PositionOptions,
    /// JPEG quality for captured frames, 1-100 (default: 80).
    pub jpeg_quality: u8,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            video: VideoConstraints::default(),
            position: PositionOptions::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl FlowConfig {
    /// Load overrides from environment variables.
    ///
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `ROLLCALL_JPEG_QUALITY`      | `80`    |
    /// | `ROLLCALL_GEO_TIMEOUT_SECS`  | `10`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("ROLLCALL_JPEG_QUALITY") {
            config.jpeg_quality = raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|q| (1..=100).contains(q))
                .ok_or(ConfigError::Invalid {
                    var: "ROLLCALL_JPEG_QUALITY",
                    expected: "an integer between 1 and 100",
                    value: raw,
                })?;
        }

        if let Some(raw) = lookup("ROLLCALL_GEO_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid {
                    var: "ROLLCALL_GEO_TIMEOUT_SECS",
                    expected: "a positive integer",
                    value: raw,
                })?;
            config.position.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
