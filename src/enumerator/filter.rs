use super::Enumerator;
use crate::base_data::BaseDataPoint;
use crate::error::FeedError;
use crate::market_hours::{is_open_at, TradingHours};

pub type UserFilter = Box<dyn Fn(&BaseDataPoint) -> bool + Send>;

/// Stage 4: when `is_filtered`, drops points whose `end_time` falls outside
/// the security's trading hours (subject to `extended_hours`); a
/// caller-supplied predicate applies on top of that.
pub struct SubscriptionFilter {
    inner: Box<dyn Enumerator>,
    hours: TradingHours,
    extended_hours: Option<TradingHours>,
    is_filtered: bool,
    user_filter: Option<UserFilter>,
}

impl SubscriptionFilter {
    pub fn new(
        inner: Box<dyn Enumerator>,
        hours: TradingHours,
        extended_hours: Option<TradingHours>,
        is_filtered: bool,
        user_filter: Option<UserFilter>,
    ) -> Self {
        SubscriptionFilter { inner, hours, extended_hours, is_filtered, user_filter }
    }
}

impl Enumerator for SubscriptionFilter {
    fn next(&mut self) -> Result<Option<BaseDataPoint>, FeedError> {
        loop {
            let point = match self.inner.next()? {
                None => return Ok(None),
                Some(p) => p,
            };
            if self.is_filtered && !is_open_at(&self.hours, self.extended_hours.as_ref(), point.end_time) {
                continue;
            }
            if let Some(f) = &self.user_filter {
                if !f(&point) {
                    continue;
                }
            }
            return Ok(Some(point));
        }
    }

    fn dispose(&mut self) {
        self.inner.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_data::DataKind;
    use crate::market_hours::DaySession;
    use crate::symbol::{SecurityType, Symbol};
    use chrono::{NaiveTime, TimeZone, Utc};
    use chrono_tz::America::New_York;
    use rust_decimal::Decimal;

    struct Fixed(std::collections::VecDeque<BaseDataPoint>);
    impl Enumerator for Fixed {
        fn next(&mut self) -> Result<Option<BaseDataPoint>, FeedError> {
            Ok(self.0.pop_front())
        }
    }

    fn nine_to_five() -> TradingHours {
        let session = DaySession { open: Some(NaiveTime::from_hms_opt(9, 0, 0).unwrap()), close: Some(NaiveTime::from_hms_opt(17, 0, 0).unwrap()) };
        TradingHours {
            timezone: New_York,
            sunday: DaySession::CLOSED,
            monday: session,
            tuesday: session,
            wednesday: session,
            thursday: session,
            friday: session,
            saturday: DaySession::CLOSED,
        }
    }

    fn pt(t: chrono::DateTime<Utc>) -> BaseDataPoint {
        BaseDataPoint::new(Symbol::new("SPY", SecurityType::Equity, "NYSE"), t, t, DataKind::Tick { price: Decimal::ONE, size: Decimal::ONE })
    }

    #[test]
    fn drops_points_outside_trading_hours_when_filtered() {
        let in_hours = New_York.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap().to_utc();
        let after_close = New_York.with_ymd_and_hms(2024, 1, 2, 20, 0, 0).unwrap().to_utc();
        let points = std::collections::VecDeque::from(vec![pt(in_hours), pt(after_close)]);
        let mut filter = SubscriptionFilter::new(Box::new(Fixed(points)), nine_to_five(), None, true, None);
        let kept = filter.next().unwrap().unwrap();
        assert_eq!(kept.time, in_hours);
        assert!(filter.next().unwrap().is_none());
    }
}
