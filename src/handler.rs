use crate::error::Error;
use crate::estimator::SendSideBandwidthEstimator;
use crate::packet::Ack;
use crate::sync::BandwidthEstimate;
use crate::util::data_rate::DataRate;
use crate::util::time::Timestamp;
use std::time::Duration;
use tokio::sync::mpsc;

/// A decoded congestion control feedback report.
pub struct FeedbackReport {
    /// Arrival time of the report at the sender.
    pub arrival: Timestamp,
    /// Latest round-trip-time sample, zero if unknown.
    pub rtt: Duration,
    /// Per-packet records in receiver-arrival order.
    pub acks: Vec<Ack>,
}

/// Owns the bandwidth estimator for one media session and drives it from a
/// channel of decoded feedback reports, publishing every new target rate
/// through a [`BandwidthEstimate`].
pub struct FeedbackHandler {
    estimator: SendSideBandwidthEstimator,
    estimate: BandwidthEstimate,
}

impl FeedbackHandler {
    /// Creates a handler and the estimate handle its consumers read from.
    /// Rates are in bits per second.
    pub fn new(
        initial_rate: i64,
        min_rate: i64,
        max_rate: i64,
    ) -> Result<(FeedbackHandler, BandwidthEstimate), Error> {
        let estimator = SendSideBandwidthEstimator::new(initial_rate, min_rate, max_rate)?;
        let estimate = BandwidthEstimate::new(DataRate::from_bits_per_sec(initial_rate as u64));
        Ok((
            FeedbackHandler {
                estimator,
                estimate: estimate.clone(),
            },
            estimate,
        ))
    }

    /// Consumes feedback reports until the channel closes.
    pub async fn run(mut self, mut feedback: mpsc::Receiver<FeedbackReport>) {
        while let Some(report) = feedback.recv().await {
            self.process(report);
        }
        log::debug!("feedback channel closed, stopping bandwidth estimation");
    }

    fn process(&mut self, report: FeedbackReport) {
        for ack in &report.acks {
            if ack.arrived {
                self.estimator
                    .on_ack(ack.seq, ack.size, ack.departure, ack.arrival);
            } else {
                self.estimator.on_loss();
            }
        }
        let target = self.estimator.on_feedback(report.arrival, report.rtt);
        self.estimate
            .set_estimate(DataRate::from_bits_per_sec(target.max(0) as u64));
    }
}
