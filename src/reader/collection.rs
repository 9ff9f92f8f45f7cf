use super::{CollectionParser, SourceReader};
use crate::base_data::BaseDataPoint;
use crate::error::FeedError;
use crate::transport::LineSource;
use std::collections::VecDeque;

/// One line in, a container of points out — used for sources that pack a
/// whole day's bars/ticks into a single record (e.g. a JSON array per line).
/// Points already parsed out of a line are queued and drained before the
/// next line is pulled, preserving emission order within and across lines.
pub struct CollectionReader {
    lines: std::vec::IntoIter<String>,
    parse: CollectionParser,
    locator: String,
    line_no: usize,
    pending: VecDeque<BaseDataPoint>,
    events: Vec<FeedError>,
}

impl CollectionReader {
    pub fn new(locator: impl Into<String>, lines: LineSource, parse: CollectionParser) -> Self {
        CollectionReader {
            lines: lines.collect::<Vec<_>>().into_iter(),
            parse,
            locator: locator.into(),
            line_no: 0,
            pending: VecDeque::new(),
            events: Vec::new(),
        }
    }
}

impl Iterator for CollectionReader {
    type Item = BaseDataPoint;
    fn next(&mut self) -> Option<BaseDataPoint> {
        loop {
            if let Some(point) = self.pending.pop_front() {
                return Some(point);
            }
            let line = self.lines.next()?;
            self.line_no += 1;
            match (self.parse)(&line) {
                Ok(points) => self.pending.extend(points),
                Err(reason) => {
                    self.events.push(FeedError::ReaderError { locator: self.locator.clone(), line: self.line_no, reason });
                }
            }
        }
    }
}

impl SourceReader for CollectionReader {
    fn events(&self) -> &[FeedError] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_data::DataKind;
    use crate::symbol::{SecurityType, Symbol};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn parser() -> CollectionParser {
        Box::new(|line: &str| {
            if line == "bad" {
                return Err("malformed container".to_string());
            }
            let n: usize = line.parse().unwrap_or(1);
            let t = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
            Ok((0..n)
                .map(|i| {
                    BaseDataPoint::new(
                        Symbol::new("SPY", SecurityType::Equity, "NYSE"),
                        t + chrono::Duration::seconds(i as i64),
                        t + chrono::Duration::seconds(i as i64),
                        DataKind::Tick { price: Decimal::ONE, size: Decimal::ONE },
                    )
                })
                .collect())
        })
    }

    #[test]
    fn flattens_points_across_lines_preserving_order() {
        let lines = LineSource::new(vec!["2".to_string(), "bad".to_string(), "1".to_string()]);
        let mut reader = CollectionReader::new("f.json", lines, parser());
        let points: Vec<_> = (&mut reader).collect();
        assert_eq!(points.len(), 3);
        assert_eq!(reader.events().len(), 1);
    }
}
