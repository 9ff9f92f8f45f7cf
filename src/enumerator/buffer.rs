use crate::base_data::BaseDataPoint;
use crate::resolution::Resolution;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};

/// Lower/upper watermarks for a buffer's backing queue, per resolution class.
/// Soft: exceeding `upper` merely pauses production, it never drops data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferThresholds {
    pub lower: usize,
    pub upper: usize,
}

impl BufferThresholds {
    pub fn for_resolution(resolution: Resolution) -> Self {
        if resolution.is_tick() {
            BufferThresholds { lower: 500, upper: 10_000 }
        } else {
            BufferThresholds { lower: 250, upper: 5_000 }
        }
    }

    pub fn universe_selection() -> Self {
        BufferThresholds { lower: 5, upper: 100_000 }
    }
}

/// Stage 5: adapts the pull-based enumerator stack into a bounded
/// single-producer/single-consumer queue. The producer thread blocks on
/// `push` while the queue is at or above `upper`; the consumer (the
/// synchronizer) blocks on `pop` while it is empty. `stop` poisons the
/// buffer: no further pushes are accepted, but the consumer may still drain
/// whatever remains queued.
pub struct EnqueueableBuffer {
    queue: Mutex<VecDeque<BaseDataPoint>>,
    not_empty: Condvar,
    not_full: Condvar,
    thresholds: BufferThresholds,
    stopped: AtomicBool,
}

impl EnqueueableBuffer {
    pub fn new(thresholds: BufferThresholds) -> Self {
        EnqueueableBuffer {
            queue: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            thresholds,
            stopped: AtomicBool::new(false),
        }
    }

    /// Blocks while the queue is at or above the upper threshold. Returns
    /// immediately, dropping `point`, if the buffer has been stopped.
    pub fn push(&self, point: BaseDataPoint) {
        let mut guard = self.queue.lock().unwrap();
        while guard.len() >= self.thresholds.upper && !self.stopped.load(Ordering::Acquire) {
            guard = self.not_full.wait(guard).unwrap();
        }
        if self.stopped.load(Ordering::Acquire) {
            return;
        }
        guard.push_back(point);
        self.not_empty.notify_one();
    }

    /// Blocks while the queue is empty and the buffer has not been stopped.
    /// Returns `None` only once stopped and drained.
    pub fn pop(&self) -> Option<BaseDataPoint> {
        let mut guard = self.queue.lock().unwrap();
        while guard.is_empty() && !self.stopped.load(Ordering::Acquire) {
            guard = self.not_empty.wait(guard).unwrap();
        }
        let item = guard.pop_front();
        if guard.len() <= self.thresholds.lower {
            self.not_full.notify_one();
        }
        item
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_data::DataKind;
    use crate::symbol::{SecurityType, Symbol};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::thread;

    fn pt() -> BaseDataPoint {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        BaseDataPoint::new(Symbol::new("SPY", SecurityType::Equity, "NYSE"), t, t, DataKind::Tick { price: Decimal::ONE, size: Decimal::ONE })
    }

    #[test]
    fn push_then_pop_round_trips() {
        let buf = EnqueueableBuffer::new(BufferThresholds { lower: 1, upper: 4 });
        buf.push(pt());
        assert_eq!(buf.len(), 1);
        assert!(buf.pop().is_some());
        assert!(buf.is_empty());
    }

    #[test]
    fn stop_unblocks_a_waiting_consumer_with_none() {
        let buf = Arc::new(EnqueueableBuffer::new(BufferThresholds { lower: 1, upper: 4 }));
        let consumer = {
            let buf = buf.clone();
            thread::spawn(move || buf.pop())
        };
        thread::sleep(std::time::Duration::from_millis(20));
        buf.stop();
        assert!(consumer.join().unwrap().is_none());
    }

    #[test]
    fn stopped_buffer_still_drains_queued_items() {
        let buf = EnqueueableBuffer::new(BufferThresholds { lower: 1, upper: 4 });
        buf.push(pt());
        buf.stop();
        assert!(buf.pop().is_some());
        assert!(buf.pop().is_none());
    }
}
