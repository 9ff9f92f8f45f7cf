mod collection;
mod text;
mod zip_entry_name;

pub use collection::CollectionReader;
pub use text::TextReader;
pub use zip_entry_name::ZipEntryNameReader;

use crate::base_data::BaseDataPoint;
use crate::error::FeedError;
use crate::transport::LineSource;

/// Parses a single line into zero-or-one point (`Text` format), or a whole
/// day's container of points (`Collection` format). Supplied by the caller
/// per data type, mirroring the teacher's per-type parsing hook.
pub type TextParser = Box<dyn Fn(&str) -> Result<Option<BaseDataPoint>, String> + Send + Sync>;
pub type CollectionParser = Box<dyn Fn(&str) -> Result<Vec<BaseDataPoint>, String> + Send + Sync>;
pub type ZipEntryParser = Box<dyn Fn(&str) -> Result<BaseDataPoint, String> + Send + Sync>;

/// Common surface over the three source-reader variants: a lazy point
/// stream plus the `reader_error` events accumulated for lines that failed
/// to parse (non-fatal — the line is simply skipped). `invalid_source`
/// failures happen one layer down, at the transport, and never reach a
/// `SourceReader` at all — the per-day union catches them before a reader
/// is constructed.
pub trait SourceReader: Iterator<Item = BaseDataPoint> {
    fn events(&self) -> &[FeedError];
}

pub(crate) fn drain_line_source(lines: LineSource) -> Vec<String> {
    lines.collect()
}
