/// Errors raised before anything reaches the network.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Form input failed its rules; the message lists every failing field.
    #[error("Validation failed: {0}")]
    Validation(String),
}
