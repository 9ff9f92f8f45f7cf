mod aggregator;
mod buffer;
mod fill_forward;
mod filter;
mod per_day_union;

pub use aggregator::CollectionAggregator;
pub use buffer::{BufferThresholds, EnqueueableBuffer};
pub use fill_forward::FillForwardEnumerator;
pub use filter::SubscriptionFilter;
pub use per_day_union::{PerDayUnion, ReaderFactory};

use crate::base_data::BaseDataPoint;
use crate::error::FeedError;

/// The stage contract for the per-subscription transformer stack: a lazy
/// pull with an explicit result per call — replacing the "exceptions as
/// flow control" pattern with a result type at the per-point level, so a
/// parse or transport failure is visible to the caller without unwinding.
/// `dispose` releases any resource the stage is still holding (an open
/// file, a cache lock) before the stack is dropped.
pub trait Enumerator: Send {
    fn next(&mut self) -> Result<Option<BaseDataPoint>, FeedError>;

    fn dispose(&mut self) {}
}

impl<T: Enumerator + ?Sized> Enumerator for Box<T> {
    fn next(&mut self) -> Result<Option<BaseDataPoint>, FeedError> {
        (**self).next()
    }
    fn dispose(&mut self) {
        (**self).dispose()
    }
}
