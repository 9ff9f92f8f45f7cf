use super::Enumerator;
use crate::base_data::BaseDataPoint;
use crate::error::FeedError;
use crate::reader::SourceReader;
use chrono::{DateTime, Utc};

/// Resolves one tradable date to an already-opened source reader. Owning the
/// transport call (and whatever blocking it needs to do to honor it) is the
/// factory's job; `PerDayUnion` only sequences readers and concatenates
/// their points, staying agnostic to how a given day's bytes were fetched.
pub type ReaderFactory = Box<dyn FnMut(DateTime<Utc>) -> Result<Box<dyn SourceReader + Send>, FeedError> + Send>;

/// Stage 1 of the enumerator pipeline: for each tradable date in range,
/// request a source and concatenate its reader's output with the next
/// date's. A date whose source is missing (`invalid_source`) is recorded as
/// an event and skipped rather than aborting the whole subscription — only
/// the per-day open fails, not the stream.
pub struct PerDayUnion {
    dates: std::vec::IntoIter<DateTime<Utc>>,
    factory: ReaderFactory,
    current: Option<Box<dyn SourceReader + Send>>,
    events: Vec<FeedError>,
}

impl PerDayUnion {
    pub fn new(dates: Vec<DateTime<Utc>>, factory: ReaderFactory) -> Self {
        PerDayUnion { dates: dates.into_iter(), factory, current: None, events: Vec::new() }
    }

    pub fn events(&self) -> &[FeedError] {
        &self.events
    }
}

impl Enumerator for PerDayUnion {
    fn next(&mut self) -> Result<Option<BaseDataPoint>, FeedError> {
        loop {
            if let Some(reader) = self.current.as_mut() {
                if let Some(point) = reader.next() {
                    return Ok(Some(point));
                }
                self.events.extend(reader.events().iter().cloned());
                self.current = None;
            }
            let date = match self.dates.next() {
                Some(d) => d,
                None => return Ok(None),
            };
            match (self.factory)(date) {
                Ok(reader) => self.current = Some(reader),
                Err(e @ FeedError::InvalidSource { .. }) => {
                    self.events.push(e);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
