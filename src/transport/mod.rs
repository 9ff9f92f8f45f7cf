mod local_file;
mod remote_file;
mod rest;
mod zip_entry;

pub use local_file::LocalFileTransport;
pub use remote_file::RemoteFileTransport;
pub use rest::RestTransport;
pub use zip_entry::ZipEntryTransport;

use crate::error::FeedError;
use crate::source::SubscriptionDataSource;
use async_trait::async_trait;

/// A lazily-consumable line stream handed back by a transport. Transports
/// fetch eagerly (the whole file/response/archive listing) but the
/// underlying handle — file descriptor, socket, archive reader — is closed
/// before this is returned, so holding a `LineSource` never pins an OS
/// resource open.
pub struct LineSource {
    lines: std::vec::IntoIter<String>,
}

impl LineSource {
    pub fn new(lines: Vec<String>) -> Self {
        LineSource { lines: lines.into_iter() }
    }
}

impl Iterator for LineSource {
    type Item = String;
    fn next(&mut self) -> Option<String> {
        self.lines.next()
    }
}

/// Given a `SubscriptionDataSource`, yield a byte/line stream. Each variant
/// maps to exactly one `TransportKind`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, source: &SubscriptionDataSource) -> Result<LineSource, FeedError>;
}
