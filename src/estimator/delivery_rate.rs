use crate::util::time::{TimeDelta, Timestamp};
use std::collections::VecDeque;

// Safety cap on top of the time window, against pathological bursts.
const MAX_HISTORY: usize = 4096;

/// Measures the rate of recently acknowledged bytes over a sliding window of
/// receiver arrival times.
#[derive(Debug)]
pub(super) struct DeliveryRateEstimator {
    window: TimeDelta,
    history: VecDeque<(Timestamp, usize)>,
    total_bytes: usize,
    latest_arrival: Option<Timestamp>,
}

impl DeliveryRateEstimator {
    pub fn new(window: TimeDelta) -> DeliveryRateEstimator {
        DeliveryRateEstimator {
            window,
            history: VecDeque::new(),
            total_bytes: 0,
            latest_arrival: None,
        }
    }

    pub fn on_packet_acked(&mut self, arrival: Timestamp, size: usize) {
        // Arrivals may come out of order; the window end is the latest
        // arrival seen so far.
        let latest = match self.latest_arrival {
            Some(t) => t.max(arrival),
            None => arrival,
        };
        self.latest_arrival = Some(latest);

        self.history.push_back((arrival, size));
        self.total_bytes += size;

        let horizon = latest - self.window;
        while let Some(&(front_arrival, front_size)) = self.history.front() {
            if front_arrival >= horizon && self.history.len() <= MAX_HISTORY {
                break;
            }
            self.history.pop_front();
            self.total_bytes -= front_size;
        }
    }

    /// Delivery rate in bits per second. Zero before the first ack.
    pub fn get_rate(&self) -> i64 {
        (self.total_bytes as f64 * 8.0 / self.window.as_secs_f64()) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> DeliveryRateEstimator {
        DeliveryRateEstimator::new(TimeDelta::from_secs(1))
    }

    #[test]
    fn no_acks_no_rate() {
        assert_eq!(estimator().get_rate(), 0);
    }

    #[test]
    fn steady_stream() {
        let mut dre = estimator();
        // 1000 packets of 1200 bytes, 1 ms apart, spanning one second.
        for i in 0..1000 {
            dre.on_packet_acked(Timestamp::from_millis(i), 1200);
        }
        assert_eq!(dre.get_rate(), 8 * 1000 * 1200);
    }

    #[test]
    fn old_entries_are_evicted() {
        let mut dre = estimator();
        for i in 0..1000 {
            dre.on_packet_acked(Timestamp::from_millis(i), 1200);
        }
        // Two seconds later only the new packet remains in the window.
        dre.on_packet_acked(Timestamp::from_secs(3), 1200);
        assert_eq!(dre.get_rate(), 8 * 1200);
    }

    #[test]
    fn history_is_capped() {
        let mut dre = estimator();
        let arrival = Timestamp::from_millis(1);
        for _ in 0..(2 * MAX_HISTORY) {
            dre.on_packet_acked(arrival, 10);
        }
        assert_eq!(dre.history.len(), MAX_HISTORY);
        assert_eq!(dre.total_bytes, 10 * MAX_HISTORY);
    }

    #[test]
    fn out_of_order_arrivals() {
        let mut dre = estimator();
        dre.on_packet_acked(Timestamp::from_millis(500), 100);
        dre.on_packet_acked(Timestamp::from_millis(400), 100);
        assert_eq!(dre.get_rate(), 8 * 200);
    }
}
