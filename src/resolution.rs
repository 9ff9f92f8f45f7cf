use chrono::Duration;
use std::fmt;

/// The resolution of a data point, which determines the period it covers.
/// `Tick` always derives a zero increment; every other variant derives an
/// increment used both for bar-close rounding and fill-forward spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Resolution {
    Tick,
    Second(u64),
    Minute(u64),
    Hour(u64),
    Daily,
}

impl Resolution {
    /// The increment derived from this resolution; zero for tick.
    pub fn increment(&self) -> Duration {
        match self {
            Resolution::Tick => Duration::zero(),
            Resolution::Second(n) => Duration::seconds(*n as i64),
            Resolution::Minute(n) => Duration::minutes(*n as i64),
            Resolution::Hour(n) => Duration::hours(*n as i64),
            Resolution::Daily => Duration::days(1),
        }
    }

    pub fn is_tick(&self) -> bool {
        matches!(self, Resolution::Tick)
    }

    /// Whether fill-forward may apply at this resolution. Forced off for
    /// tick resolution per the `SubscriptionDataConfig` invariant.
    pub fn fill_forward_eligible(&self) -> bool {
        !self.is_tick()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Tick => write!(f, "Tick"),
            Resolution::Second(n) => write!(f, "{}-Second", n),
            Resolution::Minute(n) => write!(f, "{}-Minute", n),
            Resolution::Hour(n) => write!(f, "{}-Hour", n),
            Resolution::Daily => write!(f, "Daily"),
        }
    }
}
