use super::{LineSource, Transport};
use crate::error::FeedError;
use crate::source::SubscriptionDataSource;
use async_trait::async_trait;
use std::fs::File;

/// Iterates entry names inside a zip archive, emitting one synthetic "line"
/// per entry name — used for instrument-universe expansion from a directory
/// of per-symbol files packed into one archive.
pub struct ZipEntryTransport;

#[async_trait]
impl Transport for ZipEntryTransport {
    async fn open(&self, source: &SubscriptionDataSource) -> Result<LineSource, FeedError> {
        let (archive_path, _entry_hint) = source.zip_parts().unwrap_or((source.locator.as_str(), ""));
        let archive_path = archive_path.to_string();
        tokio::task::spawn_blocking(move || {
            let file = File::open(&archive_path).map_err(|e| FeedError::InvalidSource {
                locator: archive_path.clone(),
                reason: e.to_string(),
            })?;
            let mut archive = zip::ZipArchive::new(file).map_err(|e| FeedError::InvalidSource {
                locator: archive_path.clone(),
                reason: e.to_string(),
            })?;
            let mut names = Vec::with_capacity(archive.len());
            for i in 0..archive.len() {
                let entry = archive.by_index(i).map_err(|e| FeedError::InvalidSource {
                    locator: archive_path.clone(),
                    reason: e.to_string(),
                })?;
                names.push(entry.name().to_string());
            }
            Ok(LineSource::new(names))
        })
        .await
        .map_err(|e| FeedError::Fatal(format!("zip worker panicked: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceFormat, TransportKind};

    #[tokio::test]
    async fn missing_archive_is_invalid_source() {
        let transport = ZipEntryTransport;
        let source = SubscriptionDataSource::new("/no/such.zip#x.csv", SourceFormat::ZipEntryNames, TransportKind::ZipEntry);
        let err = transport.open(&source).await.unwrap_err();
        assert!(matches!(err, FeedError::InvalidSource { .. }));
    }
}
