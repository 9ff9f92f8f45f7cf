use thiserror::Error;

/// The error taxonomy from the engine's error-handling design: every
/// variant except `Fatal` is local recovery — the owning subscription or
/// record is dropped and the run continues.
#[derive(Error, Debug, Clone)]
pub enum FeedError {
    #[error("invalid source {locator}: {reason}")]
    InvalidSource { locator: String, reason: String },

    #[error("reader error in {locator} at line {line}: {reason}")]
    ReaderError {
        locator: String,
        line: usize,
        reason: String,
    },

    #[error("subscription fault for {symbol}: {reason}")]
    SubscriptionFault { symbol: String, reason: String },

    #[error("admission rejected for {symbol}: {reason}")]
    AdmissionRejected { symbol: String, reason: String },

    #[error("fatal: {0}")]
    Fatal(String),
}

impl FeedError {
    /// `Fatal` errors propagate to the driver and abort the run; every
    /// other category is recovered locally per the propagation policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FeedError::Fatal(_))
    }
}
