mod arrival_group;
mod delay_based;
mod delivery_rate;
mod ewma;
mod loss_based;
mod overuse_detector;
mod trendline;

use crate::error::Error;
use crate::util::time::{TimeDelta, Timestamp};
use delay_based::DelayBasedControl;
use delivery_rate::DeliveryRateEstimator;
use loss_based::LossBasedControl;
use std::time::Duration;

const DELIVERY_RATE_WINDOW: TimeDelta = TimeDelta::from_secs(1);

/// Sender-side congestion controller estimating the available end-to-end
/// bandwidth from per-packet acknowledgments (transport-wide or RFC 8888
/// feedback).
///
/// One estimator per media session, driven from that session's
/// feedback-processing task: deliver the acks of a report in receiver-arrival
/// order through [`on_ack`](Self::on_ack) / [`on_loss`](Self::on_loss), then
/// call [`on_feedback`](Self::on_feedback) exactly once per report. The
/// returned target rate is meant for a pacer and/or encoder.
#[derive(Debug)]
pub struct SendSideBandwidthEstimator {
    delivery_rate: DeliveryRateEstimator,
    loss: LossBasedControl,
    delay: DelayBasedControl,
    target_rate: i64,
}

impl SendSideBandwidthEstimator {
    /// Creates an estimator with initial, minimum and maximum rates in bits
    /// per second.
    pub fn new(
        initial_rate: i64,
        min_rate: i64,
        max_rate: i64,
    ) -> Result<SendSideBandwidthEstimator, Error> {
        if min_rate <= 0 || initial_rate <= 0 {
            return Err(Error::NonPositiveRate);
        }
        if min_rate > max_rate {
            return Err(Error::MinAboveMax);
        }
        if initial_rate < min_rate || initial_rate > max_rate {
            return Err(Error::InitialRateOutOfBounds);
        }
        Ok(SendSideBandwidthEstimator {
            delivery_rate: DeliveryRateEstimator::new(DELIVERY_RATE_WINDOW),
            loss: LossBasedControl::new(initial_rate, min_rate, max_rate),
            delay: DelayBasedControl::new(initial_rate, min_rate),
            target_rate: initial_rate,
        })
    }

    /// Records a packet reported lost by the latest feedback.
    pub fn on_loss(&mut self) {
        self.loss.on_packet_lost();
    }

    /// Records an acknowledged packet. Packets must not be acknowledged more
    /// than once. A zero arrival timestamp still counts as arrived for loss
    /// accounting but skips the delay and delivery-rate pipelines.
    pub fn on_ack(&mut self, seq: u64, size: usize, departure: Timestamp, arrival: Timestamp) {
        self.loss.on_packet_acked();
        if !arrival.is_zero() {
            self.delivery_rate.on_packet_acked(arrival, size);
            self.delay.on_packet_acked(seq, size, departure, arrival);
        }
    }

    /// Processes a feedback report and returns the new target rate in bits
    /// per second. `ts` is the arrival time of the report at the sender and
    /// `rtt` the latest round-trip-time sample (zero if unknown).
    pub fn on_feedback(&mut self, ts: Timestamp, rtt: Duration) -> i64 {
        let delivered = self.delivery_rate.get_rate();
        let loss_target = self.loss.update(delivered);
        let delay_target = self.delay.update(ts, delivered, rtt);
        self.target_rate = loss_target.min(delay_target);
        log::trace!(
            "rtt={:?}, delivered={}, loss_target={}, delay_target={}, target={}",
            rtt,
            delivered,
            loss_target,
            delay_target,
            self.target_rate
        );
        self.target_rate
    }

    /// Latest target rate in bits per second.
    pub fn target_rate(&self) -> i64 {
        self.target_rate
    }
}
