use crate::util::time::{TimeDelta, Timestamp};
use std::collections::VecDeque;

const SMOOTHING_COEFF: f64 = 0.9;
const WINDOW_SIZE: usize = 20;

#[derive(Debug)]
struct DelaySample {
    // Arrival time relative to the first observed arrival.
    arrival_ms: f64,
    smoothed_delay_ms: f64,
}

/// Fits a linear slope through the smoothed one-way-delay variation of the
/// last [`WINDOW_SIZE`] arrival groups. A positive slope means the queuing
/// delay is growing.
#[derive(Debug)]
pub(super) struct TrendlineEstimator {
    first_arrival: Option<Timestamp>,
    accumulated_delay_ms: f64,
    smoothed_delay_ms: f64,
    history: VecDeque<DelaySample>,
    previous_trend: f64,
}

impl TrendlineEstimator {
    pub fn new() -> TrendlineEstimator {
        TrendlineEstimator {
            first_arrival: None,
            accumulated_delay_ms: 0.0,
            smoothed_delay_ms: 0.0,
            history: VecDeque::with_capacity(WINDOW_SIZE + 1),
            previous_trend: 0.0,
        }
    }

    /// Feeds the delay variation of a newly completed arrival group and
    /// returns the updated trend. `arrival` is the group's last arrival time.
    pub fn update(&mut self, arrival: Timestamp, inter_group_delay: TimeDelta) -> f64 {
        self.accumulated_delay_ms += inter_group_delay.as_millis_f64();
        self.smoothed_delay_ms = SMOOTHING_COEFF * self.smoothed_delay_ms
            + (1.0 - SMOOTHING_COEFF) * self.accumulated_delay_ms;

        let first_arrival = *self.first_arrival.get_or_insert(arrival);
        self.history.push_back(DelaySample {
            arrival_ms: (arrival - first_arrival).as_millis_f64(),
            smoothed_delay_ms: self.smoothed_delay_ms,
        });
        if self.history.len() > WINDOW_SIZE {
            self.history.pop_front();
        }

        if let Some(trend) = fit_slope(&self.history) {
            self.previous_trend = trend;
        }
        self.previous_trend
    }
}

// Ordinary least squares. Returns None for a zero-variance window.
fn fit_slope(samples: &VecDeque<DelaySample>) -> Option<f64> {
    let n = samples.len() as f64;
    let avg_x = samples.iter().map(|s| s.arrival_ms).sum::<f64>() / n;
    let avg_y = samples.iter().map(|s| s.smoothed_delay_ms).sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for sample in samples {
        let x = sample.arrival_ms - avg_x;
        let y = sample.smoothed_delay_ms - avg_y;
        numerator += x * y;
        denominator += x * x;
    }

    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_delay_has_zero_trend() {
        let mut estimator = TrendlineEstimator::new();
        // Identical arrival times keep the window at zero variance, so the
        // trend stays at its initial value.
        let arrival = Timestamp::from_millis(10);
        for _ in 0..5 {
            let trend = estimator.update(arrival, TimeDelta::from_millis(1));
            assert_eq!(trend, 0.0);
        }
    }

    #[test]
    fn growing_delay_has_positive_trend() {
        let mut estimator = TrendlineEstimator::new();
        let mut trend = 0.0;
        for i in 0..20 {
            let arrival = Timestamp::from_millis(20 * i);
            trend = estimator.update(arrival, TimeDelta::from_millis(5));
        }
        assert!(trend > 0.0, "expected positive trend, got {}", trend);
    }

    #[test]
    fn draining_queue_has_negative_trend() {
        let mut estimator = TrendlineEstimator::new();
        let mut trend = 0.0;
        for i in 0..20 {
            let arrival = Timestamp::from_millis(20 * i);
            trend = estimator.update(arrival, TimeDelta::from_millis(-5));
        }
        assert!(trend < 0.0, "expected negative trend, got {}", trend);
    }

    #[test]
    fn window_is_bounded() {
        let mut estimator = TrendlineEstimator::new();
        for i in 0..100 {
            estimator.update(Timestamp::from_millis(10 * i), TimeDelta::from_millis(1));
        }
        assert_eq!(estimator.history.len(), WINDOW_SIZE);
    }

    #[test]
    fn perfect_line_recovers_slope() {
        let mut estimator = TrendlineEstimator::new();
        let mut trend = 0.0;
        // Delay grows by 10 ms for every 10 ms of arrival time; once the
        // smoothing warms up the slope approaches 1.
        for i in 0..200 {
            let arrival = Timestamp::from_millis(10 * i);
            trend = estimator.update(arrival, TimeDelta::from_millis(10));
        }
        assert!((trend - 1.0).abs() < 0.05, "trend={}", trend);
    }
}
