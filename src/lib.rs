//! A time-synchronized, multi-source subscription pipeline for
//! market-data ingestion: per-symbol lazy readers feed a lock-protected
//! registry, a fixed thread pool drains each subscription's enumerator
//! stack into a bounded buffer, and a synchronizer merges every
//! subscription's current point into one ordered stream of `TimeSlice`s.

pub mod base_data;
pub mod collection;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod events;
pub mod limiter;
pub mod market_hours;
pub mod reader;
pub mod resolution;
pub mod runner;
pub mod security;
pub mod source;
pub mod subscription;
pub mod symbol;
pub mod synchronizer;
pub mod transport;
pub mod universe;

pub use base_data::{AuxiliaryEvent, BaseDataPoint, DataKind};
pub use collection::SubscriptionCollection;
pub use config::{EngineConfig, Environment};
pub use enumerator::Enumerator;
pub use error::FeedError;
pub use events::{AlgorithmCallback, DataQueueHandle, TimeSlice};
pub use limiter::SubscriptionLimiter;
pub use market_hours::{DaySession, OffsetProvider, TradingHours};
pub use resolution::Resolution;
pub use runner::{CancellationToken, ParallelRunner};
pub use security::{CashBookSnapshot, Security};
pub use source::{SourceFormat, SubscriptionDataSource, TransportKind};
pub use subscription::{ConfigKey, DataNormalizationMode, Subscription, SubscriptionDataConfig, TickType};
pub use symbol::{SecurityType, Symbol};
pub use synchronizer::{SubscriptionSynchronizer, SyncResult};
pub use universe::{currency_feeds_required, CurrencyPair, SecurityChanges, Selection, Universe};
