use super::{LineSource, Transport};
use crate::error::FeedError;
use crate::source::SubscriptionDataSource;
use async_trait::async_trait;

/// Polls an HTTP endpoint. Each call to `open` performs exactly one GET and
/// yields at most one line — the cadence between calls is the caller's
/// responsibility (the enumerator's per-day union drives it at the
/// subscription's resolution-derived interval).
pub struct RestTransport {
    client: reqwest::Client,
}

impl RestTransport {
    pub fn new() -> Self {
        RestTransport { client: reqwest::Client::new() }
    }
}

impl Default for RestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn open(&self, source: &SubscriptionDataSource) -> Result<LineSource, FeedError> {
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
        let text = response.text().await.map_err(|e| FeedError::InvalidSource {
            locator: source.locator.clone(),
            reason: e.to_string(),
        })?;
        Ok(LineSource::new(vec![text]))
    }
}

/// Jittered exponential backoff for reconnect loops: starts at 1s, doubles
/// on every failure, caps at 60s.
pub struct ReconnectBackoff {
    current: std::time::Duration,
    cap: std::time::Duration,
}

impl ReconnectBackoff {
    pub fn new() -> Self {
        ReconnectBackoff { current: std::time::Duration::from_secs(1), cap: std::time::Duration::from_secs(60) }
    }

    pub fn reset(&mut self) {
        self.current = std::time::Duration::from_secs(1);
    }

    /// The delay to sleep before the next attempt, advancing the backoff
    /// state and adding up to 20% jitter so many reconnecting workers don't
    /// retry in lockstep.
    pub fn next_delay(&mut self) -> std::time::Duration {
        let base = self.current;
        self.current = (self.current * 2).min(self.cap);
        let jitter_frac: f64 = rand::random::<f64>() * 0.2;
        base.mul_f64(1.0 + jitter_frac)
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let mut b = ReconnectBackoff::new();
        let d1 = b.next_delay();
        let d2 = b.next_delay();
        let d3 = b.next_delay();
        assert!(d1.as_secs_f64() >= 1.0 && d1.as_secs_f64() < 1.3);
        assert!(d2.as_secs_f64() >= 2.0 && d2.as_secs_f64() < 2.6);
        assert!(d3.as_secs_f64() >= 4.0 && d3.as_secs_f64() < 5.0);
        for _ in 0..10 {
            b.next_delay();
        }
        assert!(b.current <= std::time::Duration::from_secs(60).mul_f64(1.2));
    }

    #[test]
    fn reset_returns_to_initial_delay() {
        let mut b = ReconnectBackoff::new();
        b.next_delay();
        b.next_delay();
        b.reset();
        let d = b.next_delay();
        assert!(d.as_secs_f64() < 1.3);
    }
}
