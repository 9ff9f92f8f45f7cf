use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Selects transport defaults: backtests prefer file-based transports,
/// live runs prefer polling/streaming ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    Backtest,
    Live,
    LiveDesktop,
}

/// The enumerated configuration surface from the external-interfaces
/// section: everything the core reads to pick transports and size admission
/// limits. Loading, CLI parsing, and the logging backend itself remain the
/// driver's responsibility — this struct is the contract between them and
/// the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    pub environment: Environment,
    #[serde(default)]
    pub live_mode: bool,
    pub thread_count_override: Option<usize>,
    #[serde(default = "default_tick_limit")]
    pub tick_limit: usize,
    #[serde(default = "default_second_limit")]
    pub second_limit: usize,
    #[serde(default = "default_minute_limit")]
    pub minute_limit: usize,
    pub data_folder: PathBuf,
    pub cache_folder: PathBuf,
}

fn default_tick_limit() -> usize {
    100
}
fn default_second_limit() -> usize {
    400
}
fn default_minute_limit() -> usize {
    2_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            environment: Environment::Backtest,
            live_mode: false,
            thread_count_override: None,
            tick_limit: default_tick_limit(),
            second_limit: default_second_limit(),
            minute_limit: default_minute_limit(),
            data_folder: PathBuf::from("data"),
            cache_folder: PathBuf::from("data/cache"),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// `max(1, min(4, logical_cores - 3))`, overridable, as specified for
    /// the `ParallelRunner`'s worker pool.
    pub fn worker_pool_size(&self) -> usize {
        if let Some(n) = self.thread_count_override {
            return n.max(1);
        }
        let cores = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        1usize.max(4.min(cores.saturating_sub(3).max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_toml() {
        let cfg = EngineConfig {
            environment: Environment::Live,
            live_mode: true,
            thread_count_override: Some(2),
            tick_limit: 10,
            second_limit: 20,
            minute_limit: 30,
            data_folder: PathBuf::from("/tmp/data"),
            cache_folder: PathBuf::from("/tmp/cache"),
        };
        let s = toml::to_string(&cfg).unwrap();
        let back = EngineConfig::from_toml_str(&s).unwrap();
        assert_eq!(back.tick_limit, cfg.tick_limit);
        assert_eq!(back.data_folder, cfg.data_folder);
    }

    #[test]
    fn worker_pool_respects_override() {
        let mut cfg = EngineConfig::default();
        cfg.thread_count_override = Some(7);
        assert_eq!(cfg.worker_pool_size(), 7);
    }
}
