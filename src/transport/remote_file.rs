use super::{LineSource, Transport};
use crate::error::FeedError;
use crate::source::SubscriptionDataSource;
use async_trait::async_trait;
use dashmap::DashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fetches via HTTP GET into a content-addressed cache keyed by URL hash;
/// reuses the cached copy on hit. A single in-flight download per URL is
/// enforced by a per-key `Mutex` stored in `locks`, so two subscriptions
/// requesting the same URL concurrently observe exactly one GET.
pub struct RemoteFileTransport {
    cache_dir: PathBuf,
    client: reqwest::Client,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RemoteFileTransport {
    pub fn new(cache_dir: PathBuf) -> Self {
        RemoteFileTransport { cache_dir, client: reqwest::Client::new(), locks: DashMap::new() }
    }

    fn cache_key(locator: &str) -> String {
        use std::hash::{Hash, Hasher};
        let mut hasher = ahash::AHasher::default();
        locator.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    fn cache_path(&self, locator: &str) -> PathBuf {
        self.cache_dir.join(Self::cache_key(locator))
    }

    fn key_lock(&self, locator: &str) -> Arc<Mutex<()>> {
        self.locks.entry(locator.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

#[async_trait]
impl Transport for RemoteFileTransport {
    async fn open(&self, source: &SubscriptionDataSource) -> Result<LineSource, FeedError> {
        let lock = self.key_lock(&source.locator);
        let _guard = lock.lock().await;

        let path = self.cache_path(&source.locator);
        if let Ok(bytes) = tokio::fs::read(&path).await {
            let text = String::from_utf8_lossy(&bytes).to_string();
            return Ok(LineSource::new(text.lines().map(str::to_string).collect()));
        }

        let response = self.client.get(&source.locator).send().await.map_err(|e| FeedError::InvalidSource {
            locator: source.locator.clone(),
            reason: e.to_string(),
        })?;
        if !response.status().is_success() {
            return Err(FeedError::InvalidSource {
                locator: source.locator.clone(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        let bytes = response.bytes().await.map_err(|e| FeedError::InvalidSource {
            locator: source.locator.clone(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            let _ = tokio::fs::create_dir_all(parent).await;
        }
        if let Ok(mut f) = std::fs::File::create(&path) {
            let _ = f.write_all(&bytes);
        }

        let text = String::from_utf8_lossy(&bytes).to_string();
        Ok(LineSource::new(text.lines().map(str::to_string).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable_for_same_locator() {
        assert_eq!(RemoteFileTransport::cache_key("http://x/y"), RemoteFileTransport::cache_key("http://x/y"));
        assert_ne!(RemoteFileTransport::cache_key("http://x/y"), RemoteFileTransport::cache_key("http://x/z"));
    }
}
