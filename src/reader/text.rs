use super::{SourceReader, TextParser};
use crate::base_data::BaseDataPoint;
use crate::error::FeedError;
use crate::transport::LineSource;

/// One line in, zero-or-one point out. Parse failures push a `reader_error`
/// onto `events` and iteration continues with the next line.
pub struct TextReader {
    lines: std::vec::IntoIter<String>,
    parse: TextParser,
    locator: String,
    line_no: usize,
    events: Vec<FeedError>,
}

impl TextReader {
    pub fn new(locator: impl Into<String>, lines: LineSource, parse: TextParser) -> Self {
        TextReader { lines: lines.collect::<Vec<_>>().into_iter(), parse, locator: locator.into(), line_no: 0, events: Vec::new() }
    }
}

impl Iterator for TextReader {
    type Item = BaseDataPoint;
    fn next(&mut self) -> Option<BaseDataPoint> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            match (self.parse)(&line) {
                Ok(Some(point)) => return Some(point),
                Ok(None) => continue,
                Err(reason) => {
                    self.events.push(FeedError::ReaderError { locator: self.locator.clone(), line: self.line_no, reason });
                    continue;
                }
            }
        }
    }
}

impl SourceReader for TextReader {
    fn events(&self) -> &[FeedError] {
        &self.events
    }
}
