use crate::enumerator::Enumerator;
use crate::error::FeedError;
use crate::market_hours::{OffsetProvider, TradingHours};
use crate::resolution::Resolution;
use crate::symbol::Symbol;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TickType {
    Trade,
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DataNormalizationMode {
    Raw,
    Adjusted,
    SplitAdjusted,
    TotalReturn,
}

/// The registry key a `SubscriptionCollection` orders and dedups on:
/// `(symbol, data_type, tick_type, resolution, data tz, exchange tz,
/// extended_hours, is_internal_feed)`.
pub type ConfigKey = (Symbol, String, TickType, Resolution, Tz, Tz, bool, bool);

/// Everything that identifies and parameterizes one subscription's data
/// stream. Tick resolution forces `fill_forward` off — there is no boundary
/// to fill forward to between individual prints.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SubscriptionDataConfig {
    pub data_type: String,
    pub symbol: Symbol,
    pub resolution: Resolution,
    pub data_time_zone: Tz,
    pub exchange_time_zone: Tz,
    pub fill_forward: bool,
    pub extended_hours: bool,
    pub is_internal_feed: bool,
    pub is_custom: bool,
    pub tick_type: TickType,
    pub is_filtered: bool,
    pub data_normalization_mode: DataNormalizationMode,
    pub price_scale: Decimal,
    pub sum_of_dividends: Decimal,
    pub mapped_symbol: String,
}

impl SubscriptionDataConfig {
    pub fn new(
        data_type: impl Into<String>,
        symbol: Symbol,
        resolution: Resolution,
        data_time_zone: Tz,
        exchange_time_zone: Tz,
        tick_type: TickType,
    ) -> Self {
        let mapped_symbol = symbol.name.clone();
        SubscriptionDataConfig {
            data_type: data_type.into(),
            fill_forward: resolution.fill_forward_eligible(),
            extended_hours: false,
            is_internal_feed: false,
            is_custom: false,
            is_filtered: true,
            data_normalization_mode: DataNormalizationMode::Raw,
            price_scale: Decimal::ONE,
            sum_of_dividends: Decimal::ZERO,
            mapped_symbol,
            symbol,
            resolution,
            data_time_zone,
            exchange_time_zone,
            tick_type,
        }
    }

    pub fn registry_key(&self) -> ConfigKey {
        (
            self.symbol.clone(),
            self.data_type.clone(),
            self.tick_type,
            self.resolution,
            self.data_time_zone,
            self.exchange_time_zone,
            self.extended_hours,
            self.is_internal_feed,
        )
    }
}

/// The synchronizer's per-symbol cursor: one producer chain, one current
/// point (or none), one forward-monotone offset provider. Transitions are
/// one-way — `unprimed -> producing -> end_of_stream` — `move_next` past
/// end-of-stream is idempotent and always returns `false`.
pub struct Subscription {
    pub config: SubscriptionDataConfig,
    producer: Box<dyn Enumerator>,
    pub offset_provider: OffsetProvider,
    pub utc_start: DateTime<Utc>,
    pub utc_end: DateTime<Utc>,
    pub hours: TradingHours,
    pub extended_hours: Option<TradingHours>,
    current: Option<crate::base_data::BaseDataPoint>,
    end_of_stream: bool,
    pub is_universe_selection: bool,
    events: Vec<FeedError>,
}

impl Subscription {
    pub fn new(
        config: SubscriptionDataConfig,
        producer: Box<dyn Enumerator>,
        offset_provider: OffsetProvider,
        utc_start: DateTime<Utc>,
        utc_end: DateTime<Utc>,
        hours: TradingHours,
        extended_hours: Option<TradingHours>,
        is_universe_selection: bool,
    ) -> Self {
        Subscription {
            config,
            producer,
            offset_provider,
            utc_start,
            utc_end,
            hours,
            extended_hours,
            current: None,
            end_of_stream: false,
            is_universe_selection,
            events: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&crate::base_data::BaseDataPoint> {
        self.current.as_ref()
    }

    pub fn end_of_stream(&self) -> bool {
        self.end_of_stream
    }

    /// The most recent point's value, for consumers tracking the security's
    /// realtime price.
    pub fn realtime_price(&self) -> Option<Decimal> {
        self.current.as_ref().and_then(|p| p.last_value())
    }

    /// Pulls the next point. Any producer failure is logged here (via the
    /// returned event, surfaced through `events()`) and terminates the
    /// subscription rather than propagating — matching the synchronizer
    /// boundary's "catch, log, end this subscription, keep the run going"
    /// policy.
    pub fn move_next(&mut self) -> bool {
        if self.end_of_stream {
            return false;
        }
        match self.producer.next() {
            Ok(Some(point)) => {
                self.current = Some(point);
                true
            }
            Ok(None) => {
                self.current = None;
                self.end_of_stream = true;
                self.producer.dispose();
                false
            }
            Err(e) => {
                log::error!("subscription for {} terminated: {e}", self.config.symbol);
                self.events.push(e);
                self.current = None;
                self.end_of_stream = true;
                self.producer.dispose();
                false
            }
        }
    }

    pub fn events(&self) -> &[FeedError] {
        &self.events
    }
}
