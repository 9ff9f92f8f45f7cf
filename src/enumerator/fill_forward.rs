use super::Enumerator;
use crate::base_data::BaseDataPoint;
use crate::error::FeedError;
use crate::market_hours::{is_open_at, TradingHours};
use chrono::Duration;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Stage 3: synthesizes repeat copies of the last real point at every
/// resolution boundary inside a data gap that falls within open hours. The
/// resolution driving the boundary spacing is a shared nanosecond duration —
/// the minimum non-tick resolution across all active, non-internal
/// subscriptions, recomputed by the registry on every add/remove — so a
/// universe change mid-run widens or narrows the gap spacing here without
/// this stage knowing why. Skipped entirely for tick subscriptions by the
/// caller assembling the stack.
pub struct FillForwardEnumerator {
    inner: Box<dyn Enumerator>,
    hours: TradingHours,
    extended_hours: Option<TradingHours>,
    resolution_nanos: Arc<AtomicI64>,
    last_point: Option<BaseDataPoint>,
    pending: VecDeque<BaseDataPoint>,
    done: bool,
}

impl FillForwardEnumerator {
    pub fn new(
        inner: Box<dyn Enumerator>,
        hours: TradingHours,
        extended_hours: Option<TradingHours>,
        resolution_nanos: Arc<AtomicI64>,
    ) -> Self {
        FillForwardEnumerator { inner, hours, extended_hours, resolution_nanos, last_point: None, pending: VecDeque::new(), done: false }
    }
}

impl Enumerator for FillForwardEnumerator {
    fn next(&mut self) -> Result<Option<BaseDataPoint>, FeedError> {
        if let Some(p) = self.pending.pop_front() {
            return Ok(Some(p));
        }
        if self.done {
            return Ok(None);
        }
        let point = match self.inner.next()? {
            None => {
                self.done = true;
                return Ok(None);
            }
            Some(p) => p,
        };

        let nanos = self.resolution_nanos.load(Ordering::Relaxed);
        if nanos > 0 {
            if let Some(last) = self.last_point.clone() {
                let increment = Duration::nanoseconds(nanos);
                let mut synth_start = last.end_time;
                loop {
                    let synth_end = synth_start + increment;
                    if synth_end >= point.time {
                        break;
                    }
                    if is_open_at(&self.hours, self.extended_hours.as_ref(), synth_end) {
                        self.pending.push_back(last.forward_copy(synth_start, synth_end));
                    }
                    synth_start = synth_end;
                }
            }
        }
        self.last_point = Some(point.clone());
        self.pending.push_back(point);
        Ok(self.pending.pop_front())
    }

    fn dispose(&mut self) {
        self.inner.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_data::DataKind;
    use crate::symbol::{SecurityType, Symbol};
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::New_York;
    use rust_decimal::Decimal;

    struct Fixed(std::collections::VecDeque<BaseDataPoint>);
    impl Enumerator for Fixed {
        fn next(&mut self) -> Result<Option<BaseDataPoint>, FeedError> {
            Ok(self.0.pop_front())
        }
    }

    fn pt(t: chrono::DateTime<Utc>) -> BaseDataPoint {
        BaseDataPoint::new(Symbol::new("SPY", SecurityType::Equity, "NYSE"), t, t, DataKind::Tick { price: Decimal::new(100, 0), size: Decimal::ONE })
    }

    #[test]
    fn synthesizes_missing_minute_boundaries() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        let t_next_real = t0 + chrono::Duration::minutes(3);
        let points = std::collections::VecDeque::from(vec![pt(t0), pt(t_next_real)]);
        let resolution = Arc::new(AtomicI64::new(Duration::minutes(1).num_nanoseconds().unwrap()));
        let mut ff = FillForwardEnumerator::new(Box::new(Fixed(points)), TradingHours::always_open(New_York), None, resolution);

        let p0 = ff.next().unwrap().unwrap();
        assert!(!p0.is_fill_forward);
        let p1 = ff.next().unwrap().unwrap();
        assert!(p1.is_fill_forward);
        assert_eq!(p1.time, t0 + chrono::Duration::minutes(1));
        let p2 = ff.next().unwrap().unwrap();
        assert!(p2.is_fill_forward);
        assert_eq!(p2.time, t0 + chrono::Duration::minutes(2));
        let p3 = ff.next().unwrap().unwrap();
        assert!(!p3.is_fill_forward);
        assert_eq!(p3.time, t_next_real);
        assert!(ff.next().unwrap().is_none());
    }
}
