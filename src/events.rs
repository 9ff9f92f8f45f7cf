use crate::base_data::BaseDataPoint;
use crate::error::FeedError;
use crate::symbol::Symbol;
use crate::universe::SecurityChanges;

/// One merged `TimeSlice`'s worth of data, handed to the algorithm callback.
/// Construction and ownership live in `synchronizer`; this module only
/// defines the surface the driver implements to receive it.
#[derive(Debug, Clone)]
pub struct TimeSlice {
    pub utc_time: chrono::DateTime<chrono::Utc>,
    pub packets: Vec<(crate::subscription::ConfigKey, Vec<BaseDataPoint>)>,
    pub security_changes: SecurityChanges,
    pub cash_book_snapshot: crate::security::CashBookSnapshot,
}

impl TimeSlice {
    pub fn is_sentinel(&self) -> bool {
        self.utc_time == chrono::DateTime::<chrono::Utc>::MAX_UTC
    }
}

/// The out-of-process collaborator that consumes merged slices. `on_time_slice`
/// fires exactly once per merged UTC time in strict increasing order;
/// `on_security_changes` fires first whenever a slice carries any; `on_end_of_algorithm`
/// fires exactly once, after the sentinel slice.
pub trait AlgorithmCallback: Send {
    fn on_time_slice(&mut self, slice: &TimeSlice);

    fn on_security_changes(&mut self, changes: &SecurityChanges) {
        let _ = changes;
    }

    fn on_end_of_algorithm(&mut self) {}

    /// Non-fatal engine events (`reader_error`, `admission_rejected`, ...)
    /// surfaced for observability; default is a no-op.
    fn on_event(&mut self, event: &FeedError) {
        let _ = event;
    }
}

/// The brokerage / data-queue collaborator's interface — out of scope for
/// implementation here, declared only so live-mode wiring has a contract to
/// depend on.
pub trait DataQueueHandle: Send + Sync {
    fn next_ticks(&self) -> Vec<BaseDataPoint>;
    fn subscribe(&self, job: &str, symbols: &[Symbol]);
    fn unsubscribe(&self, job: &str, symbols: &[Symbol]);
}
