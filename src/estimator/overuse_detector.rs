use crate::util::time::{TimeDelta, Timestamp};
use std::fmt;

const K_UP: f64 = 0.01;
const K_DOWN: f64 = 0.00018;
const THRESHOLD_GAIN: f64 = 4.0;
const MIN_THRESHOLD_MS: f64 = 6.0;
const MAX_THRESHOLD_MS: f64 = 600.0;
const MAX_NUM_DELTAS: usize = 60;
const OVERUSE_TIME_THRESHOLD: TimeDelta = TimeDelta::from_millis(5);
const MAX_ADAPT_INTERVAL: TimeDelta = TimeDelta::from_millis(100);

/// Network usage as classified from the delay trend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Usage {
    Under,
    Normal,
    Over,
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Usage::Under => write!(f, "underuse"),
            Usage::Normal => write!(f, "normal"),
            Usage::Over => write!(f, "overuse"),
        }
    }
}

/// Classifies the delay trend into under/normal/over-use against an adaptive
/// threshold. Overuse is only reported once it has been sustained for
/// [`OVERUSE_TIME_THRESHOLD`]; until then the previous classification holds.
#[derive(Debug)]
pub(super) struct OveruseDetector {
    threshold_ms: f64,
    last_update: Option<Timestamp>,
    first_overuse: Option<Timestamp>,
    last_usage: Usage,
}

impl OveruseDetector {
    pub fn new() -> OveruseDetector {
        OveruseDetector {
            threshold_ms: MIN_THRESHOLD_MS,
            last_update: None,
            first_overuse: None,
            last_usage: Usage::Normal,
        }
    }

    pub fn update(&mut self, ts: Timestamp, trend: f64, num_deltas: usize) -> Usage {
        let last_update = *self.last_update.get_or_insert(ts);
        if num_deltas < 2 {
            return Usage::Normal;
        }

        let modified_trend = num_deltas.min(MAX_NUM_DELTAS) as f64 * trend * THRESHOLD_GAIN;

        if modified_trend > self.threshold_ms {
            if self.first_overuse.is_none() {
                // The overuse started somewhere between the previous update
                // and now; split the difference.
                let delta = ts - last_update;
                self.first_overuse = Some(ts - delta / 2);
            }
            if ts - self.first_overuse.unwrap_or(ts) > OVERUSE_TIME_THRESHOLD {
                self.first_overuse = None;
                self.last_usage = Usage::Over;
            }
        } else if modified_trend < -self.threshold_ms {
            self.first_overuse = None;
            self.last_usage = Usage::Under;
        } else {
            self.first_overuse = None;
            self.last_usage = Usage::Normal;
        }

        self.adapt_threshold(ts, last_update, modified_trend);
        self.last_update = Some(ts);

        self.last_usage
    }

    fn adapt_threshold(&mut self, ts: Timestamp, last_update: Timestamp, modified_trend: f64) {
        // Don't let extreme spikes drag the threshold along.
        if modified_trend.abs() > self.threshold_ms + 15.0 {
            return;
        }
        let k = if modified_trend.abs() < self.threshold_ms {
            K_DOWN
        } else {
            K_UP
        };
        let delta = (ts - last_update).min(MAX_ADAPT_INTERVAL);
        self.threshold_ms += k * (modified_trend.abs() - self.threshold_ms) * delta.as_millis_f64();
        self.threshold_ms = self.threshold_ms.clamp(MIN_THRESHOLD_MS, MAX_THRESHOLD_MS);
    }

    #[cfg(test)]
    fn threshold_ms(&self) -> f64 {
        self.threshold_ms
    }
}
