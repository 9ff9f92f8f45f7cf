use crate::resolution::Resolution;

/// Admission control over resolution counts and an estimated memory
/// footprint. Hour and daily resolutions are unlimited; tick/second/minute
/// are bounded by the configured limits, and by a memory estimate derived
/// from all three counts together.
pub struct SubscriptionLimiter {
    tick_limit: usize,
    second_limit: usize,
    minute_limit: usize,
    tick_count: usize,
    second_count: usize,
    minute_count: usize,
}

const MB_PER_MINUTE: f64 = 2.0;
const MB_PER_SECOND: f64 = 10.0;
const MB_PER_TICK: f64 = 34.0;

impl SubscriptionLimiter {
    pub fn new(tick_limit: usize, second_limit: usize, minute_limit: usize) -> Self {
        SubscriptionLimiter { tick_limit, second_limit, minute_limit, tick_count: 0, second_count: 0, minute_count: 0 }
    }

    fn max_estimate_mb(&self) -> f64 {
        MB_PER_MINUTE * self.minute_limit as f64 + MB_PER_SECOND * self.second_limit as f64 + MB_PER_TICK * self.tick_limit as f64
    }

    fn estimate_mb(&self, tick: usize, second: usize, minute: usize) -> f64 {
        MB_PER_MINUTE * minute as f64 + MB_PER_SECOND * second as f64 + MB_PER_TICK * tick as f64
    }

    /// `Ok(())` admits and records the addition; `Err(reason)` leaves the
    /// counts untouched and names the violated rule.
    pub fn can_add(&mut self, resolution: Resolution) -> Result<(), String> {
        let (mut tick, mut second, mut minute) = (self.tick_count, self.second_count, self.minute_count);
        match resolution {
            Resolution::Tick => {
                if self.tick_count + 1 > self.tick_limit {
                    return Err(format!("tick subscription limit of {} reached", self.tick_limit));
                }
                tick += 1;
            }
            Resolution::Second(_) => {
                if self.second_count + 1 > self.second_limit {
                    return Err(format!("second subscription limit of {} reached", self.second_limit));
                }
                second += 1;
            }
            Resolution::Minute(_) => {
                if self.minute_count + 1 > self.minute_limit {
                    return Err(format!("minute subscription limit of {} reached", self.minute_limit));
                }
                minute += 1;
            }
            Resolution::Hour(_) | Resolution::Daily => {
                self.record(resolution);
                return Ok(());
            }
        }
        let estimate = self.estimate_mb(tick, second, minute);
        let max_estimate = self.max_estimate_mb();
        if estimate > max_estimate {
            return Err(format!("estimated memory {estimate:.1}MB exceeds limit {max_estimate:.1}MB"));
        }
        self.tick_count = tick;
        self.second_count = second;
        self.minute_count = minute;
        Ok(())
    }

    fn record(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Tick => self.tick_count += 1,
            Resolution::Second(_) => self.second_count += 1,
            Resolution::Minute(_) => self.minute_count += 1,
            Resolution::Hour(_) | Resolution::Daily => {}
        }
    }

    pub fn release(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Tick => self.tick_count = self.tick_count.saturating_sub(1),
            Resolution::Second(_) => self.second_count = self.second_count.saturating_sub(1),
            Resolution::Minute(_) => self.minute_count = self.minute_count.saturating_sub(1),
            Resolution::Hour(_) | Resolution::Daily => {}
        }
    }
}
