use crate::base_data::BaseDataPoint;
use crate::collection::SubscriptionCollection;
use crate::error::FeedError;
use crate::events::TimeSlice;
use crate::market_hours::exchange_round_down;
use crate::security::CashBookSnapshot;
use crate::universe::SecurityChanges;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Produces time-ordered `TimeSlice`s across every active subscription. The
/// only state this type owns is a handle to the registry it walks; frontier
/// tracking (`T_now`) lives with the caller, which drives the loop.
pub struct SubscriptionSynchronizer {
    collection: Arc<SubscriptionCollection>,
}

/// `synchronize`'s verdict: either a slice aligned to `T_now` plus the next
/// frontier to synchronize at, or the sentinel meaning every subscription
/// has reached `end_of_stream` and no more data exists anywhere. Kept
/// distinct from a subscription's own `end_of_stream` — one subscription
/// finishing mid-run is routine; every subscription finishing is what ends
/// the loop.
pub enum SyncResult {
    Slice { slice: TimeSlice, next_frontier: DateTime<Utc> },
    EndOfData,
}

impl SubscriptionSynchronizer {
    pub fn new(collection: Arc<SubscriptionCollection>) -> Self {
        SubscriptionSynchronizer { collection }
    }

    /// Advances every subscription whose current point's `end_time` is at or
    /// before `t_now`, merging their output into one slice. `apply_universe`
    /// is invoked once per universe-bearing packet produced in a pass; its
    /// verdict is folded into the slice's `security_changes`, and — per the
    /// merge algorithm — a pass that produced any changes triggers another
    /// full pass over the (now possibly different) registry before the
    /// slice is considered final, so additions made this instant are not
    /// missed until the next frontier step.
    pub fn synchronize<F>(&self, t_now: DateTime<Utc>, mut apply_universe: F) -> SyncResult
    where
        F: FnMut(&[BaseDataPoint], DateTime<Utc>) -> (SecurityChanges, Vec<FeedError>),
    {
        let mut accumulated_changes = SecurityChanges::default();
        let mut events: Vec<FeedError> = Vec::new();
        // Accumulates across repeat-passes (see below) rather than being
        // rebuilt per pass: a subscription that already contributed its
        // packet in an earlier pass must keep it even if a later pass finds
        // it `end_of_stream` or past `t_now`. Order preserved is first
        // registry order seen, matching `SubscriptionCollection`'s insertion
        // ordering.
        let mut packets: Vec<(crate::subscription::ConfigKey, Vec<BaseDataPoint>)> = Vec::new();
        let mut early_bird = DateTime::<Utc>::MAX_UTC;

        loop {
            let snapshot = self.collection.snapshot();
            early_bird = DateTime::<Utc>::MAX_UTC;
            let mut iteration_changes = SecurityChanges::default();

            for entry in &snapshot {
                let mut sub = entry.lock().unwrap();
                if sub.end_of_stream() {
                    continue;
                }
                if sub.current().is_none() && !sub.move_next() {
                    continue;
                }

                let key = sub.config.registry_key();
                let increment = sub.config.resolution.increment();
                let mut packet = Vec::new();

                while sub.current().is_some_and(|p| p.end_time <= t_now) {
                    let point = sub.current().unwrap().clone();
                    let mut rounded = point.cloned_for_slice();
                    rounded.time = exchange_round_down(point.time, increment, &sub.hours, sub.extended_hours.as_ref());
                    packet.push(rounded);
                    if !sub.move_next() {
                        break;
                    }
                }

                if sub.is_universe_selection && !packet.is_empty() {
                    let (changes, errs) = apply_universe(&packet, t_now);
                    iteration_changes.additions.extend(changes.additions);
                    iteration_changes.removals.extend(changes.removals);
                    iteration_changes.currency_feeds.extend(changes.currency_feeds);
                    events.extend(errs);
                }

                if let Some(current) = sub.current() {
                    early_bird = early_bird.min(current.end_time).min(sub.offset_provider.next_discontinuity(t_now));
                }

                if !packet.is_empty() {
                    match packets.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, existing)) => existing.extend(packet),
                        None => packets.push((key, packet)),
                    }
                }
            }

            let produced_changes = !iteration_changes.is_empty();
            accumulated_changes.additions.extend(iteration_changes.additions);
            accumulated_changes.removals.extend(iteration_changes.removals);
            accumulated_changes.currency_feeds.extend(iteration_changes.currency_feeds);

            if !produced_changes {
                break;
            }
        }

        for event in &events {
            log::warn!("synchronizer observed event: {event}");
        }

        let final_snapshot = self.collection.snapshot();
        let all_finished = final_snapshot.iter().all(|s| s.lock().unwrap().end_of_stream());

        if all_finished {
            return SyncResult::EndOfData;
        }

        let next_frontier = early_bird.max(t_now + Duration::nanoseconds(1));
        let slice = TimeSlice {
            utc_time: t_now,
            packets,
            security_changes: accumulated_changes,
            cash_book_snapshot: CashBookSnapshot::new(),
        };
        SyncResult::Slice { slice, next_frontier }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_data::{BaseDataPoint, DataKind};
    use crate::enumerator::Enumerator;
    use crate::market_hours::{OffsetProvider, TradingHours};
    use crate::subscription::{Subscription, SubscriptionDataConfig, TickType};
    use crate::symbol::{SecurityType, Symbol};
    use chrono::TimeZone;
    use chrono_tz::UTC;
    use rust_decimal::Decimal;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Result<Option<BaseDataPoint>, FeedError>>);
    impl Enumerator for Scripted {
        fn next(&mut self) -> Result<Option<BaseDataPoint>, FeedError> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    fn pt(symbol: &str, t: DateTime<Utc>) -> BaseDataPoint {
        BaseDataPoint::new(Symbol::new(symbol, SecurityType::Equity, "NYSE"), t, t, DataKind::Tick { price: Decimal::ONE, size: Decimal::ONE })
    }

    fn minute_sub(symbol: &str, points: Vec<BaseDataPoint>) -> Subscription {
        let cfg = SubscriptionDataConfig::new("trade_bar", Symbol::new(symbol, SecurityType::Equity, "NYSE"), crate::resolution::Resolution::Minute(1), UTC, UTC, TickType::Trade);
        let scripted: Vec<_> = points.into_iter().map(|p| Ok(Some(p))).chain(std::iter::once(Ok(None))).collect();
        let producer = Scripted(VecDeque::from(scripted));
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Subscription::new(cfg, Box::new(producer), OffsetProvider::new(UTC), t, t + chrono::Duration::days(1), TradingHours::always_open(UTC), None, false)
    }

    #[test]
    fn two_symbols_emit_in_registry_order_for_the_same_frontier() {
        let collection = Arc::new(SubscriptionCollection::new());
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        collection.add(minute_sub("AAPL", vec![pt("AAPL", t)]));
        collection.add(minute_sub("MSFT", vec![pt("MSFT", t)]));
        let sync = SubscriptionSynchronizer::new(collection);

        match sync.synchronize(t, |_, _| (SecurityChanges::default(), Vec::new())) {
            SyncResult::Slice { slice, .. } => {
                assert_eq!(slice.packets.len(), 2);
                assert_eq!(slice.packets[0].0 .0.name, "AAPL");
                assert_eq!(slice.packets[1].0 .0.name, "MSFT");
                assert_eq!(slice.packets[0].1.len(), 1);
            }
            SyncResult::EndOfData => panic!("expected a slice"),
        }
    }

    #[test]
    fn all_subscriptions_finished_yields_end_of_data() {
        let collection = Arc::new(SubscriptionCollection::new());
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        collection.add(minute_sub("AAPL", vec![]));
        let sync = SubscriptionSynchronizer::new(collection);
        match sync.synchronize(t, |_, _| (SecurityChanges::default(), Vec::new())) {
            SyncResult::EndOfData => {}
            SyncResult::Slice { .. } => panic!("expected end of data"),
        }
    }

    fn universe_sub(t: DateTime<Utc>) -> Subscription {
        let cfg = SubscriptionDataConfig::new(
            "universe_selection",
            Symbol::new("UNIVERSE", SecurityType::Equity, "NYSE"),
            crate::resolution::Resolution::Minute(1),
            UTC,
            UTC,
            TickType::Trade,
        );
        let point = pt("UNIVERSE", t);
        let scripted: Vec<_> = vec![Ok(Some(point)), Ok(None)];
        let producer = Scripted(VecDeque::from(scripted));
        Subscription::new(cfg, Box::new(producer), OffsetProvider::new(UTC), t, t + chrono::Duration::days(1), TradingHours::always_open(UTC), None, true)
    }

    #[test]
    fn repeat_pass_triggered_by_universe_changes_does_not_drop_packets_already_collected() {
        let collection = Arc::new(SubscriptionCollection::new());
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        let later = t + chrono::Duration::minutes(1);
        collection.add(minute_sub("AAPL", vec![pt("AAPL", t), pt("AAPL", later)]));
        collection.add(universe_sub(t));
        let sync = SubscriptionSynchronizer::new(collection);

        let mut calls = 0;
        let result = sync.synchronize(t, |_, _| {
            calls += 1;
            (SecurityChanges { additions: vec![Symbol::new("MSFT", SecurityType::Equity, "NYSE")], ..Default::default() }, Vec::new())
        });
        match result {
            SyncResult::Slice { slice, .. } => {
                assert_eq!(calls, 1);
                let aapl_packet = slice.packets.iter().find(|(k, _)| k.0.name == "AAPL").expect("AAPL packet missing");
                assert_eq!(aapl_packet.1.len(), 1);
                assert_eq!(slice.security_changes.additions.len(), 1);
            }
            SyncResult::EndOfData => panic!("expected a slice"),
        }
    }

    #[test]
    fn next_frontier_advances_past_current_when_early_bird_is_equal() {
        let collection = Arc::new(SubscriptionCollection::new());
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        let next_point = t + chrono::Duration::minutes(1);
        collection.add(minute_sub("AAPL", vec![pt("AAPL", t), pt("AAPL", next_point)]));
        let sync = SubscriptionSynchronizer::new(collection);
        match sync.synchronize(t, |_, _| (SecurityChanges::default(), Vec::new())) {
            SyncResult::Slice { next_frontier, .. } => assert_eq!(next_frontier, next_point),
            SyncResult::EndOfData => panic!("expected a slice"),
        }
    }
}
