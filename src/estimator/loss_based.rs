const LOW_LOSS_THRESHOLD: f64 = 0.02;
const HIGH_LOSS_THRESHOLD: f64 = 0.10;
const INCREASE_FACTOR: f64 = 1.05;
const DECREASE_SLOPE: f64 = 0.5;

/// Loss-based rate controller: multiplicative increase while loss stays
/// below 2 %, proportional decrease above 10 %.
#[derive(Debug)]
pub(super) struct LossBasedControl {
    rate: i64,
    min_rate: f64,
    max_rate: f64,

    // Counters since the last update call.
    packets: u64,
    arrived: u64,
    lost: u64,
}

impl LossBasedControl {
    pub fn new(initial_rate: i64, min_rate: i64, max_rate: i64) -> LossBasedControl {
        LossBasedControl {
            rate: initial_rate,
            min_rate: min_rate as f64,
            max_rate: max_rate as f64,
            packets: 0,
            arrived: 0,
            lost: 0,
        }
    }

    pub fn on_packet_acked(&mut self) {
        self.packets += 1;
        self.arrived += 1;
    }

    pub fn on_packet_lost(&mut self) {
        self.packets += 1;
        self.lost += 1;
    }

    /// Recomputes the loss-based target from the packets counted since the
    /// last call and resets the counters. `last_delivery_rate` caps how far
    /// the target may grow while the application is rate-limited.
    pub fn update(&mut self, last_delivery_rate: i64) -> i64 {
        if self.packets > 0 {
            let loss = self.lost as f64 / self.packets as f64;
            log::trace!(
                "loss controller: packets={}, arrived={}, lost={}, loss_ratio={}",
                self.packets,
                self.arrived,
                self.lost,
                loss
            );
            if loss > HIGH_LOSS_THRESHOLD {
                let target = self.rate as f64 * (1.0 - DECREASE_SLOPE * loss);
                self.rate = target.max(self.min_rate) as i64;
            } else if loss < LOW_LOSS_THRESHOLD {
                let mut target = self.rate as f64 * INCREASE_FACTOR;
                // Cap at 1.5 times the previously delivered rate so the
                // target cannot grow indefinitely while application limited.
                target = target.min(1.5 * last_delivery_rate as f64);
                // A delivery rate far below the current target must not drag
                // the target down.
                target = target.max(self.rate as f64);
                target = target.min(self.max_rate);
                self.rate = target as i64;
            }
        }

        self.packets = 0;
        self.arrived = 0;
        self.lost = 0;

        self.rate
    }
}
