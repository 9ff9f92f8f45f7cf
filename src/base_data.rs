use crate::symbol::Symbol;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A non-price event delivered alongside price data.
#[derive(Debug, Clone, PartialEq)]
pub enum AuxiliaryEvent {
    Split { factor: Decimal },
    Dividend { amount: Decimal },
    Delisting,
    SymbolChange { new_name: String },
}

/// The tagged union replacing the teacher's weakly-typed per-symbol
/// dynamic indexer (`DataDictionary`): every payload a `BaseDataPoint` can
/// carry, one variant per `kind` named in the data model.
#[derive(Debug, Clone, PartialEq)]
pub enum DataKind {
    TradeBar { open: Decimal, high: Decimal, low: Decimal, close: Decimal, volume: Decimal },
    QuoteBar { bid_close: Decimal, ask_close: Decimal },
    Tick { price: Decimal, size: Decimal },
    Auxiliary(AuxiliaryEvent),
    Custom(Vec<u8>),
    UniverseSelectionBundle(Vec<Symbol>),
    /// Several points sharing one timestamp folded into a single emission —
    /// options chains, coarse-fundamental baskets — produced by the
    /// collection-aggregation enumerator stage.
    Composite(Vec<BaseDataPoint>),
}

impl DataKind {
    pub fn is_tick(&self) -> bool {
        matches!(self, DataKind::Tick { .. })
    }

    pub fn is_universe_selection(&self) -> bool {
        matches!(self, DataKind::UniverseSelectionBundle(_))
    }
}

/// `{ symbol, time (start), end_time, value, kind }` from the data model.
/// `time` is in the point's declared data time zone (caller-tracked, not
/// carried on the struct itself — see `SubscriptionDataConfig::data_time_zone`);
/// `end_time` is the inclusive close of the covered interval, equal to
/// `time` for instantaneous ticks and auxiliary events.
///
/// `is_fill_forward` marks synthetic copies created by the fill-forward
/// enumerator stage; it is never set by a source reader.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseDataPoint {
    pub symbol: Symbol,
    pub time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub kind: DataKind,
    pub is_fill_forward: bool,
}

impl BaseDataPoint {
    pub fn new(symbol: Symbol, time: DateTime<Utc>, end_time: DateTime<Utc>, kind: DataKind) -> Self {
        debug_assert!(end_time >= time, "end_time must not precede time");
        BaseDataPoint { symbol, time, end_time, kind, is_fill_forward: false }
    }

    /// Clone preserving the fill-forward flag, used when the synchronizer
    /// snapshots `current` into a packet before calling `move_next`.
    pub fn cloned_for_slice(&self) -> Self {
        self.clone()
    }

    /// Build the synthetic repeat point fill-forward synthesizes at a
    /// resolution boundary: same symbol and last value, new interval.
    pub fn forward_copy(&self, new_time: DateTime<Utc>, new_end_time: DateTime<Utc>) -> Self {
        let mut copy = self.clone();
        copy.time = new_time;
        copy.end_time = new_end_time;
        copy.is_fill_forward = true;
        copy
    }

    pub fn last_value(&self) -> Option<Decimal> {
        match &self.kind {
            DataKind::TradeBar { close, .. } => Some(*close),
            DataKind::QuoteBar { bid_close, ask_close } => Some((*bid_close + *ask_close) / Decimal::TWO),
            DataKind::Tick { price, .. } => Some(*price),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SecurityType;
    use chrono::TimeZone;

    fn sample() -> BaseDataPoint {
        let sym = Symbol::new("SPY", SecurityType::Equity, "NYSE");
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        BaseDataPoint::new(sym, t, t, DataKind::Tick { price: Decimal::new(4500, 0), size: Decimal::ONE })
    }

    #[test]
    fn forward_copy_marks_fill_forward_and_preserves_value() {
        let base = sample();
        let next_start = base.time + chrono::Duration::minutes(1);
        let next_end = base.end_time + chrono::Duration::minutes(1);
        let fwd = base.forward_copy(next_start, next_end);
        assert!(fwd.is_fill_forward);
        assert_eq!(fwd.last_value(), base.last_value());
        assert!(!base.is_fill_forward);
    }
}
