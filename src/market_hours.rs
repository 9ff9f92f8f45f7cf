use chrono::{DateTime, Datelike, Duration, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// A single weekday's open/close window, in the exchange's local time.
/// `close > open` is a same-day session; `close <= open` wraps past
/// midnight into the next calendar day (e.g. CME's Sunday 17:00 open).
#[derive(Debug, Clone, Copy)]
pub struct DaySession {
    pub open: Option<NaiveTime>,
    pub close: Option<NaiveTime>,
}

impl DaySession {
    pub const CLOSED: DaySession = DaySession { open: None, close: None };

    pub fn is_trading_time(&self, time: NaiveTime) -> bool {
        match (self.open, self.close) {
            (Some(open), Some(close)) if close > open => time >= open && time < close,
            (Some(open), Some(close)) => time >= open || time < close,
            (Some(open), None) => time >= open,
            (None, Some(close)) => time < close,
            (None, None) => false,
        }
    }
}

/// Per-weekday trading hours for one exchange, in a named IANA timezone.
/// Doubles as the `extended_hours` session table when constructed with the
/// venue's pre-market/after-hours windows instead of its regular ones.
#[derive(Clone, Debug)]
pub struct TradingHours {
    pub timezone: Tz,
    pub sunday: DaySession,
    pub monday: DaySession,
    pub tuesday: DaySession,
    pub wednesday: DaySession,
    pub thursday: DaySession,
    pub friday: DaySession,
    pub saturday: DaySession,
}

impl TradingHours {
    /// A calendar with every weekday open around the clock, for 24/7 venues
    /// (crypto) and as a test fixture standing in for "no session filter".
    pub fn always_open(timezone: Tz) -> Self {
        let open = DaySession { open: Some(NaiveTime::from_hms_opt(0, 0, 0).unwrap()), close: None };
        TradingHours { timezone, sunday: open, monday: open, tuesday: open, wednesday: open, thursday: open, friday: open, saturday: open }
    }

    fn session_for(&self, weekday: Weekday) -> &DaySession {
        match weekday {
            Weekday::Sun => &self.sunday,
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
        }
    }

    pub fn is_market_open(&self, current_time: DateTime<Utc>) -> bool {
        let market_time = current_time.with_timezone(&self.timezone);
        self.session_for(market_time.weekday()).is_trading_time(market_time.time())
    }

    pub fn seconds_until_close(&self, current_time: DateTime<Utc>) -> Option<i64> {
        let market_time = current_time.with_timezone(&self.timezone);
        let naive = market_time.time();
        let session = self.session_for(market_time.weekday());

        match (session.open, session.close) {
            (Some(open), Some(close)) if close > open => {
                if naive >= open && naive < close {
                    Some(close.num_seconds_from_midnight() as i64 - naive.num_seconds_from_midnight() as i64)
                } else {
                    None
                }
            }
            (Some(open), Some(close)) => {
                if naive >= open || naive < close {
                    let current_secs = naive.num_seconds_from_midnight() as i64;
                    let close_secs = close.num_seconds_from_midnight() as i64;
                    let until_close = if naive < close {
                        close_secs - current_secs
                    } else {
                        (86_400 - current_secs) + close_secs
                    };
                    Some(until_close)
                } else {
                    None
                }
            }
            (Some(_), None) => None,
            (None, Some(close)) => {
                if naive < close {
                    Some(close.num_seconds_from_midnight() as i64 - naive.num_seconds_from_midnight() as i64)
                } else {
                    None
                }
            }
            (None, None) => None,
        }
    }

    /// The earliest open instant on the same exchange calendar day as
    /// `time`, scanning backward to midnight. Used by `exchange_round_down`
    /// to resolve the "first bar of the day" boundary without crossing into
    /// the previous, possibly-closed, day.
    fn day_open_floor(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        let local = time.with_timezone(&self.timezone);
        let midnight = local.date_naive().and_hms_opt(0, 0, 0).unwrap();
        self.timezone
            .from_local_datetime(&midnight)
            .single()
            .unwrap_or(local)
            .with_timezone(&Utc)
    }
}

/// Rounds `time` down to the nearest `increment` boundary in exchange local
/// time, skipping closed intervals. If the rounded instant would fall before
/// the exchange day's open (the first bar of the day), it clamps forward to
/// that day's open rather than crossing backward into a closed prior day —
/// the resolution documented for the "exchange round down" open question.
pub fn exchange_round_down(
    time: DateTime<Utc>,
    increment: Duration,
    hours: &TradingHours,
    extended_hours: Option<&TradingHours>,
) -> DateTime<Utc> {
    if increment.is_zero() {
        return time;
    }
    let local = time.with_timezone(&hours.timezone);
    let epoch_naive = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let epoch = local.timezone().from_utc_datetime(&epoch_naive);
    let elapsed = local.signed_duration_since(epoch);
    let increment_secs = increment.num_seconds().max(1);
    let floored_secs = (elapsed.num_seconds().div_euclid(increment_secs)) * increment_secs;
    let rounded = epoch + Duration::seconds(floored_secs);
    let rounded_utc = rounded.with_timezone(&Utc);

    let session_open = is_open_at(hours, extended_hours, rounded_utc);
    if session_open {
        return rounded_utc;
    }
    let floor = hours.day_open_floor(time);
    if floor <= time {
        floor
    } else {
        rounded_utc
    }
}

/// Whether `time` falls inside `hours`' regular session or, if supplied,
/// `extended_hours`'. Shared by `exchange_round_down`, the fill-forward
/// stage, and the subscription filter so all three apply one definition of
/// "tradable instant".
pub(crate) fn is_open_at(hours: &TradingHours, extended_hours: Option<&TradingHours>, time: DateTime<Utc>) -> bool {
    hours.is_market_open(time) || extended_hours.map_or(false, |h| h.is_market_open(time))
}

/// A forward-monotone mapping from exchange-local time to UTC, carrying the
/// next DST-discontinuity instant so the synchronizer can fold it into its
/// `early_bird` computation without re-deriving timezone offsets per point.
pub struct OffsetProvider {
    timezone: Tz,
}

impl OffsetProvider {
    pub fn new(timezone: Tz) -> Self {
        OffsetProvider { timezone }
    }

    /// UTC instant corresponding to local wall-clock `naive_local`, resolving
    /// ambiguous/missing local times (DST fold/gap) to the later of the two
    /// candidates so repeated calls with increasing local times never
    /// produce a decreasing UTC result.
    pub fn to_utc(&self, naive_local: chrono::NaiveDateTime) -> DateTime<Utc> {
        use chrono::offset::LocalResult;
        match self.timezone.from_local_datetime(&naive_local) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(_, later) => later.with_timezone(&Utc),
            LocalResult::None => {
                // Spring-forward gap: the wall-clock time never occurred;
                // advance to the first instant after the gap.
                let mut probe = naive_local;
                loop {
                    probe += Duration::minutes(1);
                    if let LocalResult::Single(dt) = self.timezone.from_local_datetime(&probe) {
                        return dt.with_timezone(&Utc);
                    }
                }
            }
        }
    }

    /// The next instant (UTC) at or after `after` where the local UTC offset
    /// changes, scanned in day-sized steps. Used by the synchronizer's
    /// `early_bird` computation so a DST transition is never silently
    /// skipped inside a single subscription's gap.
    pub fn next_discontinuity(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let start_offset = after.with_timezone(&self.timezone).offset().fix();
        let mut probe = after;
        for _ in 0..400 {
            probe += Duration::days(1);
            let offset = probe.with_timezone(&self.timezone).offset().fix();
            if offset != start_offset {
                // Binary-search the hour within the day the offset changed.
                let mut lo = probe - Duration::days(1);
                let mut hi = probe;
                while (hi - lo) > Duration::minutes(1) {
                    let mid = lo + (hi - lo) / 2;
                    let mid_offset = mid.with_timezone(&self.timezone).offset().fix();
                    if mid_offset == start_offset {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                return hi;
            }
        }
        after + Duration::days(400)
    }
}
