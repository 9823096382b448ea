use super::arrival_group::{ArrivalGroup, ArrivalGroupAccumulator};
use super::ewma::Ewma;
use super::overuse_detector::{OveruseDetector, Usage};
use super::trendline::TrendlineEstimator;
use crate::util::time::Timestamp;
use std::fmt;
use std::time::Duration;

// Decrease rate factor.
const BETA: f64 = 0.85;
const MULTIPLICATIVE_INCREASE_FACTOR: f64 = 1.08;
// Smoothing factor for the average delivery rate near the last peak.
const DELIVERY_EWMA_ALPHA: f64 = 0.05;
const ESTIMATOR_REACTION_TIME_MS: f64 = 100.0;
const DEFAULT_RTT_MS: f64 = 100.0;
const ASSUMED_FRAME_RATE: f64 = 30.0;
const ASSUMED_PACKET_SIZE_BITS: f64 = 1200.0 * 8.0;

/// Rate-control state of the delay-based controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum State {
    Increase,
    Hold,
    Decrease,
}

impl State {
    /// Next state for a usage classification.
    pub fn transition(self, usage: Usage) -> State {
        match (self, usage) {
            (State::Hold, Usage::Under) => State::Hold,
            (State::Hold, Usage::Normal) => State::Increase,
            (State::Hold, Usage::Over) => State::Decrease,
            (State::Increase, Usage::Under) => State::Hold,
            (State::Increase, Usage::Normal) => State::Increase,
            (State::Increase, Usage::Over) => State::Decrease,
            (State::Decrease, Usage::Under) => State::Hold,
            (State::Decrease, Usage::Normal) => State::Hold,
            (State::Decrease, Usage::Over) => State::Decrease,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Increase => write!(f, "increase"),
            State::Hold => write!(f, "hold"),
            State::Decrease => write!(f, "decrease"),
        }
    }
}

/// Delay-based rate controller: turns the usage classification into a rate
/// via a three-state machine. Additive increase near the previous delivery
/// peak, multiplicative increase elsewhere, proportional decrease on overuse.
#[derive(Debug)]
pub(super) struct DelayBasedControl {
    accumulator: ArrivalGroupAccumulator,
    trendline: TrendlineEstimator,
    detector: OveruseDetector,
    last_group: Option<ArrivalGroup>,
    latest_trend: f64,
    num_deltas: usize,

    state: State,
    rate: i64,
    min_rate: i64,
    avg_max_delivery_kbps: Ewma,
    last_update: Option<Timestamp>,
}

impl DelayBasedControl {
    pub fn new(initial_rate: i64, min_rate: i64) -> DelayBasedControl {
        DelayBasedControl {
            accumulator: ArrivalGroupAccumulator::new(),
            trendline: TrendlineEstimator::new(),
            detector: OveruseDetector::new(),
            last_group: None,
            latest_trend: 0.0,
            num_deltas: 0,
            state: State::Increase,
            rate: initial_rate,
            min_rate,
            avg_max_delivery_kbps: Ewma::new(DELIVERY_EWMA_ALPHA),
            last_update: None,
        }
    }

    /// Feeds an acknowledged packet through the grouping and trendline
    /// pipeline.
    pub fn on_packet_acked(
        &mut self,
        seq: u64,
        size: usize,
        departure: Timestamp,
        arrival: Timestamp,
    ) {
        if let Some(group) = self.accumulator.on_packet_acked(seq, size, departure, arrival) {
            if let Some(last) = self.last_group.take() {
                let inter_group_delay = group.inter_group_delay(&last);
                self.latest_trend = self.trendline.update(group.last_arrival(), inter_group_delay);
                self.num_deltas += 1;
            }
            self.last_group = Some(group);
        }
    }

    /// Recomputes the usage from the latest trend and updates the rate.
    /// `ts` is the arrival time of the feedback report.
    pub fn update(&mut self, ts: Timestamp, delivered: i64, rtt: Duration) -> i64 {
        let usage = self.detector.update(ts, self.latest_trend, self.num_deltas);
        let next = self.state.transition(usage);
        if next != self.state {
            log::trace!("delay controller: {} -> {} (usage {})", self.state, next, usage);
        }
        self.state = next;

        match self.state {
            State::Increase => {
                let delivered_kbps = delivered as f64 / 1000.0;
                let near_last_peak = self.avg_max_delivery_kbps.initialized()
                    && (delivered_kbps - self.avg_max_delivery_kbps.average()).abs()
                        <= 3.0 * self.avg_max_delivery_kbps.std_dev();
                if near_last_peak {
                    self.additive_increase(ts, rtt);
                } else {
                    self.multiplicative_increase(ts);
                }
            }
            State::Hold => {
                self.avg_max_delivery_kbps.update(delivered as f64 / 1000.0);
            }
            State::Decrease => {
                self.rate = (delivered as f64 * BETA) as i64;
                self.avg_max_delivery_kbps.reset();
                self.avg_max_delivery_kbps.update(delivered as f64 / 1000.0);
            }
        }

        // Never chase a target far beyond what the path currently delivers;
        // the application may simply have nothing more to send.
        if delivered > 0 {
            let upper = (1.5 * delivered as f64) as i64;
            if self.rate > upper {
                self.rate = upper;
            }
        }
        self.rate = self.rate.max(self.min_rate);

        self.last_update = Some(ts);
        self.rate
    }

    fn multiplicative_increase(&mut self, ts: Timestamp) {
        let elapsed_secs = self
            .last_update
            .map(|t| (ts - t).as_secs_f64().min(1.0))
            .unwrap_or(1.0);
        let eta = MULTIPLICATIVE_INCREASE_FACTOR.powf(elapsed_secs);
        self.rate = (self.rate as f64 * eta) as i64;
    }

    fn additive_increase(&mut self, ts: Timestamp, rtt: Duration) {
        let rtt_ms = if rtt.is_zero() {
            DEFAULT_RTT_MS
        } else {
            rtt.as_secs_f64() * 1000.0
        };
        let response_time_ms = ESTIMATOR_REACTION_TIME_MS + rtt_ms;
        let elapsed_factor = self
            .last_update
            .map(|t| ((ts - t).as_millis_f64() / response_time_ms).min(1.0))
            .unwrap_or(1.0);
        // Roughly half a packet per response interval.
        let alpha = 0.5 * elapsed_factor;
        let bits_per_frame = self.rate as f64 / ASSUMED_FRAME_RATE;
        let packets_per_frame = (bits_per_frame / ASSUMED_PACKET_SIZE_BITS).ceil();
        let expected_packet_size_bits = bits_per_frame / packets_per_frame;
        self.rate += f64::max(1000.0, alpha * expected_packet_size_bits) as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(State::Increase.to_string(), "increase");
        assert_eq!(State::Hold.to_string(), "hold");
        assert_eq!(State::Decrease.to_string(), "decrease");
    }

    #[test]
    fn transitions_from_hold() {
        assert_eq!(State::Hold.transition(Usage::Over), State::Decrease);
        assert_eq!(State::Hold.transition(Usage::Normal), State::Increase);
        assert_eq!(State::Hold.transition(Usage::Under), State::Hold);
    }

    #[test]
    fn transitions_from_increase() {
        assert_eq!(State::Increase.transition(Usage::Over), State::Decrease);
        assert_eq!(State::Increase.transition(Usage::Normal), State::Increase);
        assert_eq!(State::Increase.transition(Usage::Under), State::Hold);
    }

    #[test]
    fn transitions_from_decrease() {
        assert_eq!(State::Decrease.transition(Usage::Over), State::Decrease);
        assert_eq!(State::Decrease.transition(Usage::Normal), State::Hold);
        assert_eq!(State::Decrease.transition(Usage::Under), State::Hold);
    }

    // Packets sent 6 ms apart but arriving 12 ms apart: every packet forms
    // its own arrival group and each group adds 6 ms of queuing delay.
    fn feed_growing_queue(control: &mut DelayBasedControl, packets: i64) {
        for i in 0..packets {
            control.on_packet_acked(
                i as u64,
                1200,
                Timestamp::from_millis(6 * i),
                Timestamp::from_millis(12 * i),
            );
        }
    }

    #[test]
    fn sustained_overuse_decreases_to_delivered() {
        let mut control = DelayBasedControl::new(1_000_000, 100_000);
        feed_growing_queue(&mut control, 30);

        let delivered = 288_000;
        // First report sights the overuse; it is not sustained yet, so the
        // controller keeps increasing (clamped near the delivery rate).
        let rate = control.update(Timestamp::from_secs(1), delivered, Duration::from_millis(50));
        assert_eq!(control.state, State::Increase);
        assert_eq!(rate, 432_000);

        // Ten milliseconds later the overuse is sustained.
        let rate = control.update(
            Timestamp::from_secs(1) + crate::util::time::TimeDelta::from_millis(10),
            delivered,
            Duration::from_millis(50),
        );
        assert_eq!(control.state, State::Decrease);
        assert_eq!(rate, (0.85 * delivered as f64) as i64);
        assert!(rate <= (0.86 * delivered as f64) as i64);
    }

    #[test]
    fn decrease_never_goes_below_min_rate() {
        let mut control = DelayBasedControl::new(1_000_000, 100_000);
        feed_growing_queue(&mut control, 30);
        control.update(Timestamp::from_secs(1), 50_000, Duration::ZERO);
        let rate = control.update(
            Timestamp::from_secs(1) + crate::util::time::TimeDelta::from_millis(10),
            50_000,
            Duration::ZERO,
        );
        assert_eq!(control.state, State::Decrease);
        assert_eq!(rate, 100_000);
    }

    #[test]
    fn multiplicative_increase_without_congestion() {
        let mut control = DelayBasedControl::new(1_000_000, 100_000);
        // No groups, no deltas: usage stays normal, state stays increase.
        let rate = control.update(Timestamp::from_secs(1), 2_000_000, Duration::ZERO);
        assert_eq!(control.state, State::Increase);
        assert_eq!(rate, 1_080_000);

        // Half a second between reports grows by 1.08^0.5.
        let rate = control.update(
            Timestamp::from_millis(1500),
            2_000_000,
            Duration::ZERO,
        );
        let expected = (1_080_000.0 * 1.08_f64.powf(0.5)) as i64;
        assert_eq!(rate, expected);
    }

    #[test]
    fn additive_increase_near_last_peak() {
        let mut control = DelayBasedControl::new(1_000_000, 100_000);
        feed_growing_queue(&mut control, 30);
        let delivered = 288_000;
        let t0 = Timestamp::from_secs(1);
        let ms = crate::util::time::TimeDelta::from_millis;

        // Drive into decrease; this seeds the average-max-delivery tracker.
        control.update(t0, delivered, Duration::from_millis(50));
        control.update(t0 + ms(10), delivered, Duration::from_millis(50));
        assert_eq!(control.state, State::Decrease);

        // Queue drains: underuse holds, then normal resumes increasing. The
        // delivery rate is right at the tracked peak, so the increase is
        // additive rather than multiplicative.
        control.latest_trend = -1.0;
        control.update(t0 + ms(20), delivered, Duration::from_millis(50));
        assert_eq!(control.state, State::Hold);
        let rate_before = control.rate;

        control.latest_trend = 0.0;
        let rate = control.update(t0 + ms(120), delivered, Duration::from_millis(50));
        assert_eq!(control.state, State::Increase);
        let gain = rate - rate_before;
        assert!(gain >= 1000, "gain={}", gain);
        // Far smaller than an 8 % multiplicative step.
        assert!((gain as f64) < 0.08 * rate_before as f64, "gain={}", gain);
    }
}
