use super::Enumerator;
use crate::base_data::{BaseDataPoint, DataKind};
use crate::error::FeedError;

/// Stage 2: folds every point sharing a timestamp into one composite
/// emission (options chains, coarse-fundamental baskets). Single points pass
/// straight through unwrapped — composite wrapping only kicks in when a
/// second point actually shares the group's timestamp.
pub struct CollectionAggregator {
    inner: Box<dyn Enumerator>,
    held: Option<BaseDataPoint>,
}

impl CollectionAggregator {
    pub fn new(inner: Box<dyn Enumerator>) -> Self {
        CollectionAggregator { inner, held: None }
    }
}

impl Enumerator for CollectionAggregator {
    fn next(&mut self) -> Result<Option<BaseDataPoint>, FeedError> {
        let mut group: Vec<BaseDataPoint> = match self.held.take() {
            Some(p) => vec![p],
            None => match self.inner.next()? {
                Some(p) => vec![p],
                None => return Ok(None),
            },
        };
        loop {
            match self.inner.next()? {
                None => break,
                Some(p) => {
                    if p.time == group[0].time {
                        group.push(p);
                    } else {
                        self.held = Some(p);
                        break;
                    }
                }
            }
        }
        if group.len() == 1 {
            return Ok(Some(group.into_iter().next().unwrap()));
        }
        let symbol = group[0].symbol.clone();
        let time = group[0].time;
        let end_time = group.iter().map(|p| p.end_time).max().unwrap();
        Ok(Some(BaseDataPoint::new(symbol, time, end_time, DataKind::Composite(group))))
    }

    fn dispose(&mut self) {
        self.inner.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{SecurityType, Symbol};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::collections::VecDeque;

    struct Fixed(VecDeque<BaseDataPoint>);
    impl Enumerator for Fixed {
        fn next(&mut self) -> Result<Option<BaseDataPoint>, FeedError> {
            Ok(self.0.pop_front())
        }
    }

    fn pt(t: chrono::DateTime<Utc>) -> BaseDataPoint {
        BaseDataPoint::new(Symbol::new("SPY", SecurityType::Equity, "NYSE"), t, t, DataKind::Tick { price: Decimal::ONE, size: Decimal::ONE })
    }

    #[test]
    fn groups_same_timestamp_points_into_composite() {
        let t1 = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let t2 = t1 + chrono::Duration::minutes(1);
        let points = vec![pt(t1), pt(t1), pt(t2)];
        let mut agg = CollectionAggregator::new(Box::new(Fixed(points.into())));
        let first = agg.next().unwrap().unwrap();
        assert!(matches!(first.kind, DataKind::Composite(ref v) if v.len() == 2));
        let second = agg.next().unwrap().unwrap();
        assert!(matches!(second.kind, DataKind::Tick { .. }));
        assert!(agg.next().unwrap().is_none());
    }
}
