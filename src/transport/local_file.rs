use super::{LineSource, Transport};
use crate::error::FeedError;
use crate::source::SubscriptionDataSource;
use async_trait::async_trait;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Opens a file path directly off `data-folder`. Missing file fails with
/// `invalid_source`; the file handle is scoped to this function and closed
/// on every exit path (the `BufReader` is dropped at the end of the block
/// regardless of whether reading succeeded).
pub struct LocalFileTransport;

#[async_trait]
impl Transport for LocalFileTransport {
    async fn open(&self, source: &SubscriptionDataSource) -> Result<LineSource, FeedError> {
        let locator = source.locator.clone();
        tokio::task::spawn_blocking(move || {
            let file = File::open(&locator).map_err(|e| FeedError::InvalidSource {
                locator: locator.clone(),
                reason: e.to_string(),
            })?;
            let reader = BufReader::new(file);
            let mut lines = Vec::new();
            for line in reader.lines() {
                let line = line.map_err(|e| FeedError::InvalidSource {
                    locator: locator.clone(),
                    reason: e.to_string(),
                })?;
                lines.push(line);
            }
            Ok(LineSource::new(lines))
        })
        .await
        .map_err(|e| FeedError::Fatal(format!("local file worker panicked: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceFormat, TransportKind};
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_is_invalid_source() {
        let transport = LocalFileTransport;
        let source = SubscriptionDataSource::new("/no/such/path.csv", SourceFormat::Csv, TransportKind::LocalFile);
        let err = transport.open(&source).await.unwrap_err();
        assert!(matches!(err, FeedError::InvalidSource { .. }));
    }

    #[tokio::test]
    async fn reads_lines_in_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a").unwrap();
        writeln!(file, "b").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let transport = LocalFileTransport;
        let source = SubscriptionDataSource::new(path, SourceFormat::Csv, TransportKind::LocalFile);
        let lines: Vec<_> = transport.open(&source).await.unwrap().collect();
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
    }
}
