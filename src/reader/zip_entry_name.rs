use super::{SourceReader, ZipEntryParser};
use crate::base_data::BaseDataPoint;
use crate::error::FeedError;
use crate::transport::LineSource;

/// Each "line" is a zip entry name; `parse` turns an entry name (e.g. a
/// per-symbol file name inside a packed universe archive) into exactly one
/// point. Used for instrument-universe expansion.
pub struct ZipEntryNameReader {
    lines: std::vec::IntoIter<String>,
    parse: ZipEntryParser,
    locator: String,
    line_no: usize,
    events: Vec<FeedError>,
}

impl ZipEntryNameReader {
    pub fn new(locator: impl Into<String>, lines: LineSource, parse: ZipEntryParser) -> Self {
        ZipEntryNameReader {
            lines: lines.collect::<Vec<_>>().into_iter(),
            parse,
            locator: locator.into(),
            line_no: 0,
            events: Vec::new(),
        }
    }
}

impl Iterator for ZipEntryNameReader {
    type Item = BaseDataPoint;
    fn next(&mut self) -> Option<BaseDataPoint> {
        loop {
            let name = self.lines.next()?;
            self.line_no += 1;
            match (self.parse)(&name) {
                Ok(point) => return Some(point),
                Err(reason) => {
                    self.events.push(FeedError::ReaderError { locator: self.locator.clone(), line: self.line_no, reason });
                    continue;
                }
            }
        }
    }
}

impl SourceReader for ZipEntryNameReader {
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

    fn parser() -> ZipEntryParser {
        Box::new(|name: &str| {
            if name == "bad.csv" {
                return Err("unrecognized entry name".to_string());
            }
            let t = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
            Ok(BaseDataPoint::new(
                Symbol::new(name.trim_end_matches(".csv"), SecurityType::Equity, "NYSE"),
                t,
                t,
                DataKind::Tick { price: Decimal::ONE, size: Decimal::ONE },
            ))
        })
    }

    #[test]
    fn one_point_per_valid_entry_name() {
        let lines = LineSource::new(vec!["AAPL.csv".to_string(), "bad.csv".to_string(), "MSFT.csv".to_string()]);
        let mut reader = ZipEntryNameReader::new("universe.zip", lines, parser());
        let points: Vec<_> = (&mut reader).collect();
        assert_eq!(points.len(), 2);
        assert_eq!(reader.events().len(), 1);
    }
}
